//! Core portfolio logic for Folio
//!
//! This crate contains the portfolio content model and the pure text
//! formatting and form validation helpers used by the presentation layer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod content;
pub mod formatters;
pub mod validators;

pub use content::{ContactFormData, Section};
pub use validators::FormValidationResult;
