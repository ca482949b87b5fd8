//! Builds a small settings page out of Jel entities, drives it with simulated input and prints
//! the resulting markup.

use jel::{Dom, EntitySpec, Error, EventData, Handler, Value};
use jel_dom::{DocumentConfig, PointerData, Rect};
use jel_html::document_from_html;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Settings</title></head>
  <body><main id="app"><h1 id="heading">Settings</h1></main></body>
</html>"#;

fn tab(caption: &str, content: Value, data: &str) -> Value {
    Value::map([
        ("caption", Value::from(caption)),
        ("content", content),
        ("data", Value::from(data)),
    ])
}

fn main() -> Result<(), Error> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt::init();

    let dom = Dom::from_document(document_from_html(PAGE, DocumentConfig::default()));
    let widgets = jel_widgets::factory(&dom);
    let tags = dom.tags();

    let app = dom.select("#app")?;
    let heading = app
        .child("heading")?
        .ok_or_else(|| Error::InvalidArgument("page has no heading".into()))?;
    heading.style()?.set("filter_blur", "1px")?;
    heading.style()?.set("filter_brightness", 1.2)?;

    let status = tags.p(EntitySpec::new().id("status").classes("status"))?;

    let notifications = widgets.create(
        "checkbox",
        EntitySpec::new()
            .id("notifications")
            .prop("caption", "Email notifications")
            .prop("checked", true),
    )?;
    notifications.on("change", {
        let weak = dom.downgrade();
        let status_id = status.dom_element();
        Handler::new(move |data| {
            let checked = data.value().is_some_and(Value::is_truthy);
            let text = if checked { "Notifications on" } else { "Notifications off" };
            weak.upgrade()?.wrap(status_id)?.set_text(text)
        })
    })?;

    let upload = widgets.create(
        "progress",
        EntitySpec::new().id("upload").prop("position", 0.2).content("Uploading"),
    )?;

    let sections = widgets.create(
        "tab_set",
        EntitySpec::new().id("sections").prop(
            "tabs",
            vec![
                tab("General", Value::from(notifications.clone()), "general"),
                tab("Transfers", Value::from(upload.clone()), "transfers"),
            ],
        ),
    )?;
    sections.on(
        "change",
        Handler::new(|data| {
            if let EventData::Custom(Value::Map(detail)) = data {
                let index = detail.get("tabIndex").map(Value::to_js_string);
                println!("Switched to tab {}", index.unwrap_or_default());
            }
            Ok(())
        }),
    )?;

    app.append(vec![Value::from(&sections), Value::from(&status)])?;

    // Simulated input
    let checkbox_root = dom.wrap(notifications.dom_element())?;
    if let Some(input) = checkbox_root.child("input")? {
        input.click(None)?;
    }
    upload.set("position", 0.65)?;

    let tab_buttons = sections.qsa(".jel-tabset-tab")?;
    if let Some(transfers) = tab_buttons.get(1) {
        dom.document_mut()
            .set_layout(transfers.dom_element(), Rect::new(100.0, 10.0, 180.0, 40.0))?;
        transfers.on(
            "click",
            Handler::new(|data| {
                if let Some(pointer) = data.dom_event().and_then(|event| event.pointer) {
                    println!(
                        "Tab clicked at ({:?}, {:?}) inside the button",
                        pointer.inner_x, pointer.inner_y
                    );
                }
                Ok(())
            }),
        )?;
        transfers.click(Some(PointerData::new(120.0, 25.0)))?;
    }

    #[cfg(feature = "tracing")]
    {
        tracing::info!("Page holds {} wrapped elements", dom.cache_len());
        tracing::debug!("Tree:\n{}", dom.document().debug_tree(app.dom_element()));
    }

    println!("{}", app.outer_html()?);
    Ok(())
}
