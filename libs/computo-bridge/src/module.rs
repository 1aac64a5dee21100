use std::rc::Rc;

use computo_api::{DynamicValue, Engine, Function, Table};

use crate::error::BridgeError;
use crate::execute::Executor;
use crate::options::BridgeOptions;

/// Name the module is registered under.
pub const MODULE_NAME: &str = "computo";

/// The single exported function.
pub const EXECUTE: &str = "execute";

/// Build the module's capability table: `{ execute = <function> }`.
///
/// The function owns the engine handle; the table holds nothing else.
pub fn open(engine: Rc<dyn Engine>, options: BridgeOptions) -> DynamicValue {
    tracing::debug!(module = MODULE_NAME, max_depth = options.max_depth, "opening module");

    let executor = Executor::new(engine, options);
    let execute = Function::new(EXECUTE, move |args| executor.execute(args));

    let mut exports = Table::with_capacity(1);
    exports.set(EXECUTE, DynamicValue::Function(execute));
    DynamicValue::table(exports)
}

/// Like [`open`], with options parsed from an optional JSON object.
pub fn open_with_config(
    engine: Rc<dyn Engine>,
    config: Option<&serde_json::Value>,
) -> Result<DynamicValue, BridgeError> {
    let options = BridgeOptions::from_config(config)?;
    Ok(open(engine, options))
}
