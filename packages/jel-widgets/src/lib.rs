//! Ready-made Jel entity types
//!
//! Each widget is an ordinary [`Constructor`]: it composes element entities with the
//! [`jel::DomBuilder`] shortcuts, defines its own properties and fires its own events.
//!
//! ```
//! use jel::{Dom, EntitySpec};
//!
//! let dom = Dom::default();
//! let widgets = jel_widgets::factory(&dom);
//! let bar = widgets
//!     .create("progress", EntitySpec::new().prop("position", 0.25))
//!     .unwrap();
//! assert_eq!(
//!     bar.outer_html().unwrap(),
//!     r#"<div class="jel-progress"><div class="jel-progress-inner" style="width: 25%;"></div></div>"#
//! );
//! ```

mod checkbox;
mod progress;
mod tab_set;

use jel::{Dom, Factory, Value};

pub use checkbox::checkbox;
pub use progress::progress;
pub use tab_set::tab_set;

/// A factory with every widget registered under its constructor's name
pub fn factory(dom: &Dom) -> Factory {
    let mut factory = Factory::new(dom);
    factory
        .register(checkbox())
        .register(progress())
        .register(tab_set());
    factory
}

/// Widget classes followed by whatever the caller asked for
fn root_classes(widget_class: &str, extra: &Value) -> Value {
    Value::List(vec![Value::from(widget_class), extra.clone()])
}
