use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use computo_api::{CallError, DynamicValue, Engine};

use crate::convert::ValueConverter;
use crate::emit::JsonEmitter;
use crate::error::BridgeError;
use crate::options::BridgeOptions;

/// The `execute` entry point bound to one engine.
///
/// Calls are synchronous: arguments are converted, the engine runs on
/// the caller's thread, and the result is converted back. Nothing is
/// kept between calls.
pub struct Executor {
    engine: Rc<dyn Engine>,
    options: BridgeOptions,
}

impl Executor {
    pub fn new(engine: Rc<dyn Engine>, options: BridgeOptions) -> Self {
        Self { engine, options }
    }

    /// `execute(script)` or `execute(script, inputs)`.
    ///
    /// `inputs` may be nil, a sequence table (one input document per
    /// element) or any other table (a single input document). Every
    /// failure is reported as one [`CallError`].
    pub fn execute(&self, args: &[DynamicValue]) -> Result<DynamicValue, CallError> {
        let span = tracing::debug_span!("computo.execute", argc = args.len());
        let _enter = span.enter();

        self.run(args).map_err(|e| {
            tracing::debug!(error = %e, "execute failed");
            CallError::from(e)
        })
    }

    fn run(&self, args: &[DynamicValue]) -> Result<DynamicValue, BridgeError> {
        let (script_arg, inputs_arg) = match args {
            [script] => (script, None),
            [script, inputs] => (script, Some(inputs)),
            _ => return Err(BridgeError::ArgumentCount(args.len())),
        };
        if script_arg.as_table().is_none() {
            tracing::debug!(got = script_arg.type_name(), "script is not a table");
            return Err(BridgeError::script_argument());
        }

        let script = ValueConverter::new(&self.options, "script").convert(script_arg)?;
        let inputs = self.collect_inputs(inputs_arg)?;
        tracing::debug!(inputs = inputs.len(), "invoking engine");

        let result = self.evaluate(&script, &inputs)?;
        JsonEmitter::new(&self.options, "result").emit(&result)
    }

    fn collect_inputs(
        &self,
        arg: Option<&DynamicValue>,
    ) -> Result<Vec<serde_json::Value>, BridgeError> {
        match arg {
            None | Some(DynamicValue::Nil) => Ok(Vec::new()),
            Some(value @ DynamicValue::Table(_)) => {
                match ValueConverter::new(&self.options, "inputs").convert(value)? {
                    serde_json::Value::Array(documents) => Ok(documents),
                    document => Ok(vec![document]),
                }
            }
            Some(other) => {
                tracing::debug!(got = other.type_name(), "inputs are not a table");
                Err(BridgeError::inputs_argument())
            }
        }
    }

    fn evaluate(
        &self,
        script: &serde_json::Value,
        inputs: &[serde_json::Value],
    ) -> Result<serde_json::Value, BridgeError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.engine.evaluate(script, inputs))) {
            Ok(result) => Ok(result?),
            Err(payload) => Err(BridgeError::EnginePanic(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
