use std::rc::Rc;

use jel::{Constructor, EntitySpec, Error, Handler, Trigger, Value, WeakDom};

use crate::root_classes;

/// The parts of a tab set that `add_tab` needs to reach
#[derive(Clone)]
struct TabSetParts {
    dom: WeakDom,
    tabs_id: usize,
    content_id: usize,
    trigger: Trigger,
}

impl TabSetParts {
    /// Add a tab described by a record with `caption`, `content` and `data`. Returns the tab's
    /// node id.
    fn add_tab(&self, tab_spec: &Value) -> Result<usize, Error> {
        let field = |name: &str| {
            tab_spec
                .as_map()
                .and_then(|map| map.get(name))
                .cloned()
                .unwrap_or_default()
        };

        let dom = self.dom.upgrade()?;
        let tags = dom.tags();
        let client = tags.div(
            EntitySpec::new()
                .classes("jel-tabset-client")
                .content(field("content"))
                .style("display", "none"),
        )?;
        let tab = tags.button(
            EntitySpec::new()
                .classes("jel-tabset-tab")
                .content(field("caption")),
        )?;

        let parts = self.clone();
        let tab_id = tab.dom_element();
        let client_id = client.dom_element();
        let data = field("data");
        tab.on(
            "click",
            Handler::new(move |_| parts.activate(tab_id, client_id, data.clone())),
        )?;

        dom.wrap(self.tabs_id)?.append(tab)?;
        dom.wrap(self.content_id)?.append(client)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Added tab {tab_id} to tab set");

        Ok(tab_id)
    }

    /// Show the tab's client, mark the tab active and announce the change
    fn activate(&self, tab_id: usize, client_id: usize, data: Value) -> Result<(), Error> {
        let dom = self.dom.upgrade()?;
        let (tab_ids, client_ids) = {
            let doc = dom.document();
            (
                doc.children(self.tabs_id).to_vec(),
                doc.children(self.content_id).to_vec(),
            )
        };

        for id in &client_ids {
            let display = if *id == client_id { "block" } else { "none" };
            dom.wrap(*id)?.style()?.set("display", display)?;
        }
        for id in &tab_ids {
            dom.wrap(*id)?.classes()?.toggle("active", Some(*id == tab_id))?;
        }

        let tab_index = tab_ids.iter().position(|id| *id == tab_id);
        let detail = Value::map([
            ("tabIndex", Value::from(tab_index.map(|i| i as f64))),
            ("data", data),
            ("tab", Value::from(dom.wrap(tab_id)?)),
            ("client", Value::from(dom.wrap(client_id)?)),
        ]);
        self.trigger.trigger("change", detail)
    }
}

/// A row of tab buttons over a stack of panels, one visible at a time.
///
/// Props: `tabs`, a list of `{caption, content, data}` records, and `activeIndex` (default 0).
/// Method: `addTab(record)`. Fires `change` with `{tabIndex, data, tab, client}` whenever a tab
/// is selected.
pub fn tab_set() -> Constructor {
    Constructor::new("tab_set", |dom, spec, define, trigger| {
        let tags = dom.tags();
        let tabs = tags.div(EntitySpec::new().id("tabs").classes("jel-tabset-tabs"))?;
        let content = tags.div(EntitySpec::new().id("content").classes("jel-tabset-content"))?;
        let parts = TabSetParts {
            dom: dom.downgrade(),
            tabs_id: tabs.dom_element(),
            content_id: content.dom_element(),
            trigger: trigger.clone(),
        };
        let layout = tags.div(
            EntitySpec::new()
                .classes(root_classes("jel-tabset", &spec.classes))
                .content(vec![Value::from(tabs), Value::from(content)]),
        )?;

        let mut tab_ids = Vec::new();
        if let Some(tab_specs) = spec.get_prop("tabs").as_list() {
            for tab_spec in tab_specs {
                tab_ids.push(parts.add_tab(tab_spec)?);
            }
        }

        let active = spec.get_prop("activeIndex").to_number();
        let active = if active.is_finite() && active >= 0.0 {
            active as usize
        } else {
            0
        };
        if let Some(tab_id) = tab_ids.get(active) {
            dom.click(*tab_id, None);
        }

        let add = Rc::new(parts);
        define.method("addTab", move |args| {
            let tab_spec = args.first().cloned().unwrap_or_default();
            add.add_tab(&tab_spec).map(Value::Node)
        });

        define.import_dom(&layout);
        Ok::<_, Error>(Value::from(layout))
    })
}
