//! Protocol module for completion request/response structures
//!
//! This module defines the canonical data models every provider adapter
//! consumes and produces. These structures are:
//! - Provider-agnostic
//! - Plain text in, plain text out
//! - Serializable for diagnostics

pub mod types;

pub use types::{Completion, CompletionRequest, MessageRole, NormalizedMessage, AUTO_MODEL};
