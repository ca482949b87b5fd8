use std::cell::Cell;
use std::rc::Rc;

use jel::{Constructor, EntitySpec, Error, Value};

use crate::root_classes;

fn bar_width(position: f64) -> String {
    format!("{}%", Value::from(position * 100.0).to_js_string())
}

/// A horizontal progress bar.
///
/// Props: `position`, from 0 to 1. `spec.content` is placed after the bar. Property:
/// `position`, writable.
pub fn progress() -> Constructor {
    Constructor::new("progress", |dom, spec, define, _| {
        let position = Rc::new(Cell::new(spec.get_prop("position").to_number()));
        if position.get().is_nan() {
            position.set(0.0);
        }

        let tags = dom.tags();
        let inner = tags.div(
            EntitySpec::new()
                .id("inner")
                .classes("jel-progress-inner")
                .style("width", bar_width(position.get())),
        )?;
        let layout = tags.div(
            EntitySpec::new()
                .classes(root_classes("jel-progress", &spec.classes))
                .content(vec![Value::from(&inner), spec.content.clone()]),
        )?;

        let weak = dom.downgrade();
        let inner_id = inner.dom_element();
        let current = position.clone();
        define.accessor(
            "position",
            move || Ok(Value::from(current.get())),
            move |value| {
                let value = value.to_number();
                position.set(value);

                #[cfg(feature = "tracing")]
                tracing::trace!("Progress bar moved to {value}");

                weak.upgrade()?
                    .wrap(inner_id)?
                    .style()?
                    .set("width", bar_width(value))
            },
        );

        define.import_dom(&layout);
        Ok::<_, Error>(Value::from(layout))
    })
}

#[cfg(test)]
mod tests {
    use jel::Dom;

    use super::*;

    #[test]
    fn width_follows_position() {
        let dom = Dom::default();
        let bar = dom
            .construct(Some(progress()), EntitySpec::new().prop("position", 0.5))
            .unwrap();
        assert_eq!(bar.get("position").unwrap(), Some(Value::from(0.5)));

        let inner = dom.wrap(bar.dom_element()).unwrap().child("inner").unwrap().unwrap();
        assert_eq!(inner.style().unwrap().get("width").unwrap().as_deref(), Some("50%"));

        bar.set("position", 0.75).unwrap();
        assert_eq!(bar.get("position").unwrap(), Some(Value::from(0.75)));
        assert_eq!(inner.style().unwrap().get("width").unwrap().as_deref(), Some("75%"));
    }

    #[test]
    fn missing_position_is_zero() {
        let dom = Dom::default();
        let bar = dom.construct(Some(progress()), EntitySpec::new()).unwrap();
        assert_eq!(bar.get("position").unwrap(), Some(Value::from(0)));
        assert_eq!(bar.style().unwrap().get("width").unwrap(), None);
    }

    #[test]
    fn extra_content_follows_the_bar() {
        let dom = Dom::default();
        let bar = dom
            .construct(
                Some(progress()),
                EntitySpec::new().classes(vec!["slim"]).content(vec!["Loading", "..."]),
            )
            .unwrap();
        assert_eq!(
            bar.outer_html().unwrap(),
            r#"<div class="jel-progress slim"><div class="jel-progress-inner" style="width: 0%;"></div>Loading...</div>"#
        );
    }
}
