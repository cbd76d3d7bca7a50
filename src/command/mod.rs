//! Command execution pipeline
//!
//! Turns the mayor's orders into calls on villagers:
//! ParsedOrder -> OrderResolver -> OrderResolution -> CommandExecutor
//!
//! Console lines that are not orders are parsed by [`console`].

pub mod console;
pub mod executor;
pub mod resolver;

pub use console::{parse_console_command, ConsoleCommand};
pub use executor::{CommandExecutor, ExecutionResult};
pub use resolver::{MatchReason, OrderResolution, OrderResolver, SubjectMatch};
