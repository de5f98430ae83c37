//! Core types and traits for the counsel workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! counsel tool, including the error taxonomy, provider family identifiers,
//! backend preference kinds, and the executor contract that every backend
//! shape implements.

pub mod error;
pub mod exec;
pub mod provider;

pub use error::{CounselError, Result, SNIPPET_MAX};
pub use exec::{Capabilities, ExecutionRequest, ExecutionResult, Executor, TokenUsage};
pub use provider::{BackendKind, ProviderId, ReasoningEffort};
