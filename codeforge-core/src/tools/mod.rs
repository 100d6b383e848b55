//! Tool Runner: subprocess execution for installers, compilers, and test runners (§6).

pub mod runner;

pub use runner::{ToolError, ToolOutput, ToolRunner};
