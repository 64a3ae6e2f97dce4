//! Cross-module scene scenarios
//!
//! `properties` covers the observable guarantees of the graph, `reentrancy`
//! covers structural edits made from inside component hooks.


use std::cell::RefCell;
use std::rc::Rc;

use crate::impl_component_any;
use crate::scene::{Component, NodeContext};

/// Shared event log written by [`Script`] components
pub(super) type Log = Rc<RefCell<Vec<String>>>;

type Action = Box<dyn FnMut(&mut NodeContext<'_>)>;

/// Component that records its hooks and optionally runs an action on update
pub(super) struct Script {
    label: String,
    log: Log,
    action: Option<Action>,
}

impl Script {
    pub(super) fn new(label: &str, log: &Log) -> Self {
        Self {
            label: label.to_string(),
            log: Rc::clone(log),
            action: None,
        }
    }

    pub(super) fn on_update(mut self, action: impl FnMut(&mut NodeContext<'_>) + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.label, event));
    }
}

impl Component for Script {
    fn type_name(&self) -> &'static str {
        "script"
    }

    fn on_attach(&mut self, _ctx: &mut NodeContext<'_>) {
        self.record("attach");
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_>) {
        self.record("start");
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_>, _dt: f32) {
        self.record("update");
        if let Some(action) = self.action.as_mut() {
            action(ctx);
        }
    }

    fn on_detach(&mut self, _ctx: &mut NodeContext<'_>) {
        self.record("detach");
    }

    impl_component_any!();
}

/// Events recorded so far, then clear the log
pub(super) fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

/// Recorded events with the given suffix, in order
pub(super) fn filtered(events: &[String], suffix: &str) -> Vec<String> {
    events
        .iter()
        .filter(|event| event.ends_with(suffix))
        .cloned()
        .collect()
}
