use jel::{Constructor, ContentNode, Dom, EntitySpec, Error, Value};

fn texts(dom: &Dom, nodes: &[ContentNode]) -> Vec<String> {
    let doc = dom.document();
    nodes
        .iter()
        .map(|node| doc.text_content(node.node_id()))
        .collect()
}

#[test]
fn set_content_flattens_and_skips_falsy_values() {
    let dom = Dom::default();
    let div = dom.tags().div(()).unwrap();
    div.set_content(vec![
        Value::from("a"),
        Value::from(0),
        Value::Null,
        Value::from(false),
        Value::from(""),
        Value::from(EntitySpec::of(Constructor::element()).tag("b").content("x")),
        Value::list([Value::from("y"), Value::from(1.5)]),
    ])
    .unwrap();

    let content = div.content().unwrap();
    assert_eq!(texts(&dom, &content), ["a", "0", "x", "y", "1.5"]);
    assert!(content[0].is_text());
    assert!(content[1].is_text());
    let b = content[2].as_entity().unwrap();
    assert_eq!(b.outer_html().unwrap(), "<b>x</b>");
    assert_eq!(div.text().unwrap(), "a0xy1.5");
}

#[test]
fn set_content_replaces_previous_children() {
    let dom = Dom::default();
    let div = dom.tags().div("old").unwrap();
    div.set_content("new").unwrap();
    assert_eq!(div.text().unwrap(), "new");
    assert_eq!(div.content().unwrap().len(), 1);
}

#[test]
fn invalid_content_is_rejected() {
    let dom = Dom::default();
    let div = dom.tags().div(()).unwrap();
    assert_eq!(div.append(true), Err(Error::InvalidContent("boolean")));
    assert_eq!(
        div.append(Value::map([("a", 1)])),
        Err(Error::InvalidContent("map"))
    );
    assert_eq!(
        div.append(EntitySpec::new().content("no constructor")),
        Err(Error::InvalidContent("spec"))
    );

    let comment = dom.document_mut().create_comment_node();
    assert_eq!(
        div.append(Value::Node(comment)),
        Err(Error::InvalidContent("comment"))
    );
}

#[test]
fn prepend_keeps_batch_order() {
    let dom = Dom::default();
    let tags = dom.tags();
    let list = tags.ul(()).unwrap();
    let items: Vec<Value> = ["A", "B", "C"]
        .into_iter()
        .map(|text| Value::from(tags.li(text).unwrap()))
        .collect();

    list.prepend(items).unwrap();
    assert_eq!(list.text().unwrap(), "ABC");

    list.prepend(vec!["1", "2"]).unwrap();
    assert_eq!(list.text().unwrap(), "12ABC");

    list.append("Z").unwrap();
    assert_eq!(list.text().unwrap(), "12ABCZ");
}

#[test]
fn named_children_follow_attachment() {
    let dom = Dom::default();
    let tags = dom.tags();
    let panel = tags.div(()).unwrap();
    let title = tags.h1(("Title", EntitySpec::new().id("title"))).unwrap();

    panel.append(title.clone()).unwrap();
    assert_eq!(panel.child("title").unwrap(), Some(title.clone()));
    assert_eq!(panel.get("$title").unwrap(), Some(Value::from(&title)));

    panel.remove(title.clone()).unwrap();
    assert_eq!(panel.child("title").unwrap(), None);
    assert_eq!(panel.get("$title").unwrap(), None);
    assert_eq!(title.parent().unwrap(), None);
}

#[test]
fn moved_named_child_is_pruned() {
    let dom = Dom::default();
    let tags = dom.tags();
    let first = tags.div(()).unwrap();
    let second = tags.div(()).unwrap();
    let item = tags.span(("x", EntitySpec::new().id("item"))).unwrap();

    first.append(item.clone()).unwrap();
    second.append(item.clone()).unwrap();

    assert_eq!(first.child("item").unwrap(), None);
    assert_eq!(second.child("item").unwrap(), Some(item.clone()));
    assert_eq!(item.parent().unwrap(), Some(second));
}

#[test]
fn clearing_content_clears_named_children() {
    let dom = Dom::default();
    let panel = dom
        .tags()
        .div(EntitySpec::new().content(EntitySpec::of(Constructor::element()).id("inner")))
        .unwrap();
    assert!(panel.child("inner").unwrap().is_some());

    panel.set_text("plain").unwrap();
    assert_eq!(panel.child("inner").unwrap(), None);
    assert_eq!(panel.text().unwrap(), "plain");
}

#[test]
fn remove_accepts_text_nodes_only_besides_entities() {
    let dom = Dom::default();
    let p = dom.tags().p(vec!["one", "two"]).unwrap();
    let content = p.content().unwrap();

    p.remove(Value::Node(content[0].node_id())).unwrap();
    assert_eq!(p.text().unwrap(), "two");

    assert!(matches!(p.remove("two"), Err(Error::InvalidArgument(_))));

    let stranger = dom.tags().span(()).unwrap();
    assert!(matches!(p.remove(stranger), Err(Error::Dom(_))));
}

#[test]
fn detached_nodes_can_be_reinserted() {
    let dom = Dom::default();
    let tags = dom.tags();
    let list = tags.ul(()).unwrap();
    let item = tags.li("kept").unwrap();

    list.append(item.clone()).unwrap();
    list.set_content(Value::Null).unwrap();
    assert_eq!(list.text().unwrap(), "");

    list.append(item.clone()).unwrap();
    assert_eq!(list.text().unwrap(), "kept");
    assert_eq!(dom.wrap(item.dom_element()).unwrap(), item);
}

#[test]
fn replaced_content_does_not_grow_the_document() {
    let dom = Dom::default();
    let tags = dom.tags();
    let label = tags.span("0").unwrap();
    let panel = tags.div(()).unwrap();
    let replace = |round: i32| {
        label.set_text(round).unwrap();
        let em = tags.em(round.to_string()).unwrap();
        panel
            .set_content(vec![Value::from(em), Value::from("tail")])
            .unwrap();
    };

    replace(1);
    let nodes = dom.document().tree().len();
    let cached = dom.cache_len();
    for round in 2..200 {
        replace(round);
    }
    assert_eq!(dom.document().tree().len(), nodes);
    assert_eq!(dom.cache_len(), cached);
    assert_eq!(label.text().unwrap(), "199");
    assert_eq!(panel.html().unwrap(), "<em>199</em>tail");
}

#[test]
fn replaced_entities_survive_while_held() {
    let dom = Dom::default();
    let card = Constructor::new("card", |dom, _, define, _| {
        let layout = dom.build("section", "body")?;
        define.import_dom(&layout);
        Ok(Value::from(layout))
    });
    let holder = dom.tags().div(()).unwrap();
    let kept = dom
        .construct(Some(card.clone()), EntitySpec::new())
        .unwrap();
    holder
        .append(vec![
            Value::from(&kept),
            Value::from(EntitySpec::of(card).id("dropped")),
        ])
        .unwrap();
    let dropped = holder.child("dropped").unwrap().unwrap().dom_element();

    holder.set_content(Value::Null).unwrap();
    assert!(dom.document().get_node(kept.dom_element()).is_some());
    assert!(dom.document().get_node(dropped).is_none());
    assert_eq!(dom.cached(dropped), None);

    holder.append(&kept).unwrap();
    assert_eq!(holder.html().unwrap(), "<section>body</section>");
    assert_eq!(dom.entity_of(kept.dom_element()), Some(kept));
}
