//! Use-case layer.
//!
//! # Responsibility
//! - Expose the controller that presentation layers drive.
//! - Keep callers decoupled from store and storage details.

pub mod notebook;
