//! Core functionality for codeforge: an autonomous multi-agent code generation pipeline.
//!
//! From a natural-language requirement and a target language, drives an iterative
//! generate -> build -> test loop across a set of small, strongly-typed agents,
//! carrying structured error context between attempts.

pub mod agents;
pub mod config;
pub mod llm;
pub mod model;
pub mod session;
pub mod templates;
pub mod tools;

// Re-export logging macros at crate level
#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(all(not(feature = "tracing"), feature = "log"))]
pub use log::{debug, error, info, trace, warn};

// Fallback macros when neither tracing nor log is enabled
#[cfg(not(any(feature = "tracing", feature = "log")))]
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("[INFO] {}", format!($($arg)*));
    };
}

#[cfg(not(any(feature = "tracing", feature = "log")))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        println!("[DEBUG] {}", format!($($arg)*));
    };
}

#[cfg(not(any(feature = "tracing", feature = "log")))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        eprintln!("[WARN] {}", format!($($arg)*));
    };
}

#[cfg(not(any(feature = "tracing", feature = "log")))]
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        eprintln!("[ERROR] {}", format!($($arg)*));
    };
}

#[cfg(not(any(feature = "tracing", feature = "log")))]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        println!("[TRACE] {}", format!($($arg)*));
    };
}

// Re-export the macros at crate level for consistent access
#[cfg(not(any(feature = "tracing", feature = "log")))]
pub use {debug, error, info, trace, warn};

pub use agents::orchestrator::Orchestrator;
pub use config::Settings;
pub use model::{ProgrammingLanguage, ProjectSession, Session};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_has_sane_iteration_bound() {
        let settings = Settings::default();
        assert_eq!(settings.max_iterations, 3);
    }
}
