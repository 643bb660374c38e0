//! LLM provider abstraction layer for stockcast
//!
//! This crate provides provider-agnostic abstractions for asking a hosted
//! Large Language Model for a JSON document shaped by a caller-supplied schema.
//! It includes:
//!
//! - Message types for LLM communication
//! - Completion request/response types, including the requested response format
//! - A small schema model that renders to Gemini's and to JSON Schema dialects
//! - Provider trait for LLM implementations
//! - Concrete provider implementations (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod schema;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, ResponseFormat, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;
pub use schema::{Schema, SchemaType};

// Provider implementations (feature-gated)
#[cfg(any(feature = "gemini", feature = "openai"))]
pub mod providers;
