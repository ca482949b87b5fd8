use jel::{Dom, EntitySpec, Error, Value};

#[test]
fn widgets_are_registered_by_name() {
    let dom = Dom::default();
    let widgets = jel_widgets::factory(&dom);
    let names: Vec<&str> = widgets.names().collect();
    assert_eq!(names, ["checkbox", "progress", "tab_set"]);
    assert_eq!(
        widgets.create("slider", EntitySpec::new()).map(|_| ()),
        Err(Error::MissingType)
    );
}

#[test]
fn widgets_compose_as_content() {
    let dom = Dom::default();
    let widgets = jel_widgets::factory(&dom);
    let make_checkbox = widgets.get("checkbox").unwrap();

    let form = dom
        .tags()
        .form(vec![
            Value::from(
                make_checkbox(EntitySpec::new().id("terms").prop("caption", "Terms")).unwrap(),
            ),
            Value::from(EntitySpec::of(jel_widgets::progress()).id("bar").prop("position", 1)),
        ])
        .unwrap();

    let bar = form.child("bar").unwrap().unwrap();
    assert_eq!(bar.entity_type(), "progress");
    assert_eq!(bar.get("position").unwrap(), Some(Value::from(1)));
    assert_eq!(dom.entity_of(bar.dom_element()), Some(bar.clone()));

    let terms = form.child("terms").unwrap().unwrap();
    assert_eq!(terms.entity_type(), "checkbox");
    assert_eq!(terms.get("caption").unwrap(), Some(Value::from("Terms")));
    assert_eq!(form.text().unwrap(), "Terms");
}
