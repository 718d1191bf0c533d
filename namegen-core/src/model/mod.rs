//! Variable-order character Markov model.
//!
//! This module provides the two sides of the model:
//! - Training: `ContextModel` accumulating one `Transition` per context
//! - Runtime: `RuntimeModel` holding immutable `Distribution`s, with back-off
//!   lookup and name generation
//!
//! The only way from one side to the other is `ContextModel::build`.

/// Reserved start/end delimiter and order bounds.
pub mod symbols;

/// Per-context accumulator and prior smoothing.
pub mod transition;

/// Immutable, code-point-ordered categorical distribution.
pub mod distribution;

/// Trainable model writing every context suffix.
pub mod context_model;

/// Immutable runtime model: back-off, sampling and generation.
pub mod runtime_model;

/// Registry of runtime models and distinct-name generation.
pub mod generator;
