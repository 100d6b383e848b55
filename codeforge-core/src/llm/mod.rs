//! LLM Adapter: the uniform text-in/text-out interface over a remote generative model (§6).
//!
//! The core treats the adapter as an external collaborator and only relies on a single
//! `invoke(prompt) -> String` contract. Model choice, retries, and credentials are the
//! adapter's concern, not the pipeline's.

pub mod errors;
pub mod openai;
pub mod traits;

#[cfg(test)]
pub mod mock;

pub use errors::{LLMError, LLMResult};
pub use traits::LLMProvider;
