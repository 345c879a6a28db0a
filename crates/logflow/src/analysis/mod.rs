//! LLM-backed incident analysis.
//!
//! Builds a prompt from log records, sends it to a [`CompletionProvider`],
//! and recovers a strict JSON incident list from whatever text comes back.

mod extract;
mod extractor;
mod gemini;
mod prompts;
mod provider;

pub use extract::{extract_incidents, extract_values, incidents_from_values};
pub use extractor::IncidentExtractor;
pub use gemini::GeminiProvider;
pub use prompts::{render_records, PromptManager};
pub use provider::CompletionProvider;
