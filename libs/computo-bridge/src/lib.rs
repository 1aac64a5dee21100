//! Marshalling between host dynamic values and the JSON documents of the
//! Computo transformation engine.
//!
//! ```text
//! args ─▶ ValueConverter ─▶ script + inputs ─▶ Engine ─▶ result ─▶ JsonEmitter ─▶ value
//! ```

pub mod convert;
pub mod emit;
pub mod error;
pub mod execute;
pub mod module;
pub mod options;
mod path;

pub use convert::{ValueConverter, to_json};
pub use emit::{JsonEmitter, to_dynamic};
pub use error::BridgeError;
pub use execute::Executor;
pub use module::{EXECUTE, MODULE_NAME, open, open_with_config};
pub use options::{BridgeOptions, UnsignedOverflow};
