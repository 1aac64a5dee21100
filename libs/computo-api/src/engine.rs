use crate::error::EvalError;

/// Document-transformation engine.
///
/// Opaque to the bridge: it receives the converted script and the list
/// of input documents and returns a single result document. The call is
/// synchronous and runs on the caller's thread.
pub trait Engine {
    fn evaluate(
        &self,
        script: &serde_json::Value,
        inputs: &[serde_json::Value],
    ) -> Result<serde_json::Value, EvalError>;
}

impl<F> Engine for F
where
    F: Fn(&serde_json::Value, &[serde_json::Value]) -> Result<serde_json::Value, EvalError>,
{
    fn evaluate(
        &self,
        script: &serde_json::Value,
        inputs: &[serde_json::Value],
    ) -> Result<serde_json::Value, EvalError> {
        self(script, inputs)
    }
}
