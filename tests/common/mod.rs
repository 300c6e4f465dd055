#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use serde_json::json;
use tracing_subscriber::EnvFilter;
use trellis::{App, ComponentDefinition, Context, Host, MemoryHost, MemoryNode, Result};

/// Log output for a test run, controlled with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shared record of what ran, in order.
#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

pub fn app() -> App<MemoryHost> {
    init_tracing();
    App::new(MemoryHost::new())
}

/// Attach an element with the given id to the document body.
pub fn container(app: &App<MemoryHost>, id: &str) -> MemoryNode {
    let host = app.host();
    let node = host.create_element("div").unwrap();
    host.set_attribute(&node, "id", id).unwrap();
    host.append_child(host.body(), &node).unwrap();
    node
}

/// Whether `node` is attached, through its ancestors, to the document body.
pub fn in_document(host: &MemoryHost, node: &MemoryNode) -> bool {
    std::iter::successors(Some(node.clone()), |node| host.parent(node))
        .any(|ancestor| &ancestor == host.body())
}

/// A button showing a count, incremented on click.
pub fn counter() -> ComponentDefinition<MemoryHost> {
    ComponentDefinition::<MemoryHost>::new("counter", || {
        r#"<button onclick="increment">{{count}}</button>"#.to_string()
    })
    .with_state(json!({ "count": 0 }))
    .with_method("increment", |ctx| {
        let count = ctx.get("count")?.as_i64().unwrap_or_default();
        ctx.set_state(json!({ "count": count + 1 }))
    })
}

/// Hook that records `<key>:<hook>` into `log`.
pub fn record(log: &Log, hook: &'static str) -> impl Fn(&Context<MemoryHost>) -> Result<()> {
    let log = log.clone();
    move |ctx| {
        log.push(format!("{}:{hook}", ctx.key()));
        Ok(())
    }
}

/// A counter that records its hooks into `log`.
pub fn logged_counter(log: &Log) -> ComponentDefinition<MemoryHost> {
    counter()
        .on_created(record(log, "created"))
        .on_connected(record(log, "connected"))
        .on_updated(record(log, "updated"))
        .on_disconnected(record(log, "disconnected"))
}
