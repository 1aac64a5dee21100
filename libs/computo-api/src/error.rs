use std::fmt;

/// Error kind reported by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The script is malformed or refers to unknown operators.
    Script,
    /// An input document does not have the shape the script expects.
    Input,
    /// Evaluation failed (type mismatch, division by zero, ...).
    Runtime,
    /// Engine bug or resource failure.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Script => write!(f, "script"),
            ErrorKind::Input => write!(f, "input"),
            ErrorKind::Runtime => write!(f, "runtime"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

/// Engine error — returned by [`Engine::evaluate`](crate::Engine::evaluate).
///
/// Displays as the bare message so the text reaches the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub kind: ErrorKind,
    pub message: String,
}

impl EvalError {
    pub fn script(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Script, message: msg.into() }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Input, message: msg.into() }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Runtime, message: msg.into() }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Internal, message: msg.into() }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

/// Uniform call-level error raised to the host.
///
/// Carries only a human-readable message: the originating kind is
/// part of the text, never a separate discriminant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallError {
    message: String,
}

impl CallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CallError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_error_displays_bare_message() {
        let err = EvalError::runtime("division by zero");
        assert_eq!(err.kind, ErrorKind::Runtime);
        assert_eq!(err.to_string(), "division by zero");
    }
}
