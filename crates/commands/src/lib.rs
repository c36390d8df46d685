//! Command interpretation and dispatch.
//!
//! [`parser`] turns a raw command string into a kind plus extracted
//! arguments; [`dispatcher`] routes it to the browser driver, the meeting
//! join sequences, or the AI backend and always produces a normalized
//! [`meetpilot_core::CommandResult`]; [`service`] wraps dispatch with timing
//! and transcript logging.

pub mod dispatcher;
pub mod parser;
pub mod service;

pub use dispatcher::{CommandDispatcher, SessionContext};
pub use parser::{parse, CommandArgs, CommandKind, ParsedCommand};
pub use service::CommandService;
