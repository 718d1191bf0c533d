//! Markov-chain name generation library.
//!
//! This crate learns a variable-order character-level Markov model from a
//! list of example names and samples new, statistically similar names:
//! - Training over every context suffix (implicit back-off chain)
//! - Prior smoothing scoped to a locale's exemplar alphabet
//! - Deterministic sampling from an explicit random source
//! - Persistence of runtime models (postcard or JSON)

/// Core model types: training, runtime and generation.
pub mod model;

/// Locale tokens and exemplar alphabets.
pub mod alphabet;

/// Training and generation settings.
pub mod config;

/// Library error type.
pub mod error;

/// I/O utilities (corpus loading, model persistence, path helpers).
pub mod io;

pub use alphabet::{AlphabetProvider, BuiltinAlphabets, FixedAlphabet, Locale};
pub use config::GenerationConfig;
pub use error::{NameGenError, Result};
pub use model::context_model::ContextModel;
pub use model::distribution::Distribution;
pub use model::generator::{distinct_names, Generator, NameRequest};
pub use model::runtime_model::RuntimeModel;
pub use model::transition::{Smoothing, Transition};
