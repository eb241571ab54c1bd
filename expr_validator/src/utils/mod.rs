//! Shared primitive types used across the validation stages

pub mod span;

pub use span::Span;
