use jel::{Constructor, EntitySpec, Error, Handler, Value};

use crate::root_classes;

/// A labelled checkbox.
///
/// Props: `caption` (content of the label text) and `checked` (initial state). Properties:
/// `caption` and `checked`, both writable. Fires `change` with the new checked state when the
/// user toggles it.
pub fn checkbox() -> Constructor {
    Constructor::new("checkbox", |dom, spec, define, trigger| {
        let tags = dom.tags();
        let input = tags.input(EntitySpec::new().id("input").attrib("type", "checkbox"))?;
        let caption = tags.span(
            EntitySpec::new()
                .id("caption")
                .content(spec.get_prop("caption")),
        )?;
        let layout = tags.label(
            EntitySpec::new()
                .classes(root_classes("jel-checkbox", &spec.classes))
                .content(vec![Value::from(&input), Value::from(&caption)]),
        )?;

        if spec.get_prop("checked").is_truthy() {
            input.attribs()?.set("checked", "")?;
        }

        let weak = dom.downgrade();
        let input_id = input.dom_element();
        let caption_id = caption.dom_element();

        input.on("change", {
            let weak = weak.clone();
            let trigger = trigger.clone();
            Handler::new(move |_| {
                let checked = weak.upgrade()?.document().checked(input_id);
                trigger.trigger("change", checked)
            })
        })?;

        let (get_weak, set_weak) = (weak.clone(), weak.clone());
        define.accessor(
            "caption",
            move || {
                let text = get_weak.upgrade()?.document().text_content(caption_id);
                Ok(Value::from(text))
            },
            move |value| set_weak.upgrade()?.wrap(caption_id)?.set_content(value),
        );

        let (get_weak, set_weak) = (weak.clone(), weak);
        define.accessor(
            "checked",
            move || Ok(Value::from(get_weak.upgrade()?.wrap(input_id)?.checked()?)),
            move |value| {
                set_weak
                    .upgrade()?
                    .wrap(input_id)?
                    .set_checked(value.is_truthy())
            },
        );

        define.import_dom(&layout);
        Ok::<_, Error>(Value::from(layout))
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use jel::{Dom, EventData};

    use super::*;

    fn build(dom: &Dom, spec: EntitySpec) -> jel::Entity {
        dom.construct(Some(checkbox()), spec).unwrap()
    }

    #[test]
    fn structure() {
        let dom = Dom::default();
        let entity = build(
            &dom,
            EntitySpec::new().classes("big").prop("caption", "Agree"),
        );
        assert_eq!(
            entity.outer_html().unwrap(),
            r#"<label class="jel-checkbox big"><input type="checkbox"><span>Agree</span></label>"#
        );
        assert_eq!(entity.entity_type(), "checkbox");
        assert_eq!(entity.get("checked").unwrap(), Some(Value::from(false)));
    }

    #[test]
    fn preselected() {
        let dom = Dom::default();
        let entity = build(&dom, EntitySpec::new().prop("checked", true));
        assert_eq!(entity.get("checked").unwrap(), Some(Value::from(true)));
    }

    #[test]
    fn properties_write_through() {
        let dom = Dom::default();
        let entity = build(&dom, EntitySpec::new().prop("caption", "Old"));
        entity.set("caption", "New").unwrap();
        assert_eq!(entity.get("caption").unwrap(), Some(Value::from("New")));

        entity.set("checked", true).unwrap();
        let input = dom.wrap(entity.dom_element()).unwrap().child("input").unwrap();
        assert!(input.unwrap().checked().unwrap());
    }

    #[test]
    fn clicking_fires_change() {
        let dom = Dom::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let entity = build(
            &dom,
            EntitySpec::new().on("change", {
                let seen = seen.clone();
                Handler::new(move |data| {
                    if let EventData::Custom(value) = data {
                        seen.borrow_mut().push(value.clone());
                    }
                    Ok(())
                })
            }),
        );

        let layout = dom.wrap(entity.dom_element()).unwrap();
        let input = layout.child("input").unwrap().unwrap();
        input.click(None).unwrap();
        input.click(None).unwrap();
        assert_eq!(*seen.borrow(), [Value::from(true), Value::from(false)]);
    }

    #[test]
    fn dom_concerns_come_from_the_label() {
        let dom = Dom::default();
        let entity = build(&dom, EntitySpec::new());
        entity.attribs().unwrap().set("title", "tip").unwrap();
        let label = dom.wrap(entity.dom_element()).unwrap();
        assert_eq!(label.attribs().unwrap().get("title").unwrap().as_deref(), Some("tip"));
    }
}
