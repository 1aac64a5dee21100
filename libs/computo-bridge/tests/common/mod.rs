//! Shared helpers for computo-bridge integration tests.
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
#![allow(dead_code, unused_imports)]

use std::cell::RefCell;
use std::rc::Rc;

pub use computo_api::{CallError, DynamicValue, Engine, EvalError, Function, Key, Table};
pub use computo_bridge::{BridgeOptions, UnsignedOverflow};

/// Install a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Table from explicit key/value pairs, assigned in order.
pub fn table<I>(entries: I) -> DynamicValue
where
    I: IntoIterator<Item = (Key, DynamicValue)>,
{
    DynamicValue::table(entries.into_iter().collect())
}

/// Sequence table with keys `1..=n`.
pub fn seq<I>(items: I) -> DynamicValue
where
    I: IntoIterator<Item = DynamicValue>,
{
    DynamicValue::sequence(items)
}

pub fn key(k: impl Into<Key>) -> Key {
    k.into()
}

pub fn s(text: &str) -> DynamicValue {
    DynamicValue::from(text)
}

pub fn int(i: i64) -> DynamicValue {
    DynamicValue::Integer(i)
}

/// Engine that records each call and replies with a fixed document.
pub struct RecordingEngine {
    calls: RefCell<Vec<(serde_json::Value, Vec<serde_json::Value>)>>,
    reply: serde_json::Value,
}

impl RecordingEngine {
    pub fn new(reply: serde_json::Value) -> Rc<Self> {
        Rc::new(Self {
            calls: RefCell::new(Vec::new()),
            reply,
        })
    }

    pub fn calls(&self) -> Vec<(serde_json::Value, Vec<serde_json::Value>)> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last_inputs(&self) -> Vec<serde_json::Value> {
        self.calls
            .borrow()
            .last()
            .map(|(_, inputs)| inputs.clone())
            .unwrap_or_default()
    }
}

impl Engine for RecordingEngine {
    fn evaluate(
        &self,
        script: &serde_json::Value,
        inputs: &[serde_json::Value],
    ) -> Result<serde_json::Value, EvalError> {
        self.calls
            .borrow_mut()
            .push((script.clone(), inputs.to_vec()));
        Ok(self.reply.clone())
    }
}

/// Engine that always fails at runtime with `message`.
pub fn failing_engine(message: &'static str) -> Rc<dyn Engine> {
    Rc::new(
        move |_: &serde_json::Value,
              _: &[serde_json::Value]|
              -> Result<serde_json::Value, EvalError> { Err(EvalError::runtime(message)) },
    )
}

/// Engine that replies with the script it was given.
pub fn echo_engine() -> Rc<dyn Engine> {
    Rc::new(
        |script: &serde_json::Value,
         _: &[serde_json::Value]|
         -> Result<serde_json::Value, EvalError> { Ok(script.clone()) },
    )
}

/// The `execute` function of a freshly opened module.
pub fn execute_fn(engine: Rc<dyn Engine>, options: BridgeOptions) -> Function {
    let module = computo_bridge::open(engine, options);
    let exports = module.as_table().expect("module is a table").borrow();
    match exports.get(&Key::from("execute")) {
        Some(DynamicValue::Function(f)) => f.clone(),
        other => panic!("module has no execute function: {other:?}"),
    }
}

/// Call `execute` with default options.
pub fn call(engine: Rc<dyn Engine>, args: &[DynamicValue]) -> Result<DynamicValue, CallError> {
    execute_fn(engine, BridgeOptions::default()).call(args)
}

/// Build `t` with `t[field] = t`.
pub fn self_referencing(field: &str) -> DynamicValue {
    let t = DynamicValue::table(Table::new());
    if let Some(handle) = t.as_table() {
        handle.borrow_mut().set(field, t.clone());
    }
    t
}

/// Drop the self reference so the test does not leak the table.
pub fn break_cycle(t: &DynamicValue, field: &str) {
    if let Some(handle) = t.as_table() {
        handle.borrow_mut().set(field, DynamicValue::Nil);
    }
}
