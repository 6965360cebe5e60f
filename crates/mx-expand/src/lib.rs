//! Expands short messages into longer ones through a hosted completion model.
//!
//! The crate is split along the only seam the service needs: a
//! [`CompletionProvider`] that turns a [`Prompt`] into text, and an
//! [`Expander`] that owns prompting, response cleaning and the failure policy.
pub mod clean;
pub mod client;
pub mod error;
pub mod expander;
pub mod prompt;
pub mod provider;

pub use clean::{BOILERPLATE_PREFIXES, clean_response};
pub use client::{CompletionConfig, OpenAiClient, SamplingParams};
pub use error::{CompletionError, ExpandError};
pub use expander::{Expander, FailurePolicy};
pub use prompt::{ChatMessage, Prompt, Role};
pub use provider::CompletionProvider;
