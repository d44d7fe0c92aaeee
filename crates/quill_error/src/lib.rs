//! Error types for the Quill narrative pipeline.
//!
//! This crate provides the foundation error types used throughout the Quill workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Collaborator failures are not errors in this sense. The generator adapter
//! reports them as [`GenerationFailure`] values, which pipeline nodes match on
//! and replace with a fallback.
//!
//! # Examples
//!
//! ```
//! use quill_error::{QuillResult, StoreError, StoreErrorKind};
//!
//! fn load_chapter() -> QuillResult<String> {
//!     Err(StoreError::new(StoreErrorKind::NotFound("chapter 3".to_string())))?
//! }
//!
//! assert!(load_chapter().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod generator;
mod store;
mod workflow;

pub use config::{ConfigError, ConfigErrorKind};
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{QuillError, QuillErrorKind, QuillResult};
pub use generator::{GenerationFailure, GeneratorError, GeneratorErrorKind, RetryableError};
pub use store::{StoreError, StoreErrorKind};
pub use workflow::{WorkflowError, WorkflowErrorKind};
