//! Error type shared by every part of the library.

use thiserror::Error;

/// Errors that can occur while training, loading or sampling a model.
#[derive(Debug, Error)]
pub enum NameGenError {
	/// A parameter or persisted value is outside its valid domain.
	///
	/// Raised before any state is touched: the call that fails leaves the
	/// receiver exactly as it was.
	#[error("Invalid configuration: {message}")]
	Configuration {
		/// What is wrong with the value
		message: String,
	},

	/// Reading or writing a corpus, model or configuration file failed.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Binary (postcard) encoding or decoding failed.
	#[error("Binary model encoding failed: {0}")]
	Binary(#[from] postcard::Error),

	/// JSON encoding or decoding failed.
	#[error("JSON model encoding failed: {0}")]
	Json(#[from] serde_json::Error),

	/// A TOML configuration file could not be parsed.
	#[error("Configuration file could not be parsed: {0}")]
	Toml(#[from] toml::de::Error),

	/// A TOML document could not be written.
	#[error("TOML encoding failed: {0}")]
	TomlWrite(#[from] toml::ser::Error),

	/// Distinct-name generation ran out of retries.
	#[error("Only {produced} of {requested} distinct names could be generated")]
	Exhausted {
		/// Number of names asked for
		requested: usize,
		/// Number of distinct names found before giving up
		produced: usize,
	},

	/// No model is registered under that name.
	#[error("Model {name} not found")]
	UnknownModel {
		/// Requested model name
		name: String,
	},

	/// A model with the same name is already registered.
	#[error("Model {name} already loaded")]
	DuplicateModel {
		/// Conflicting model name
		name: String,
	},
}

impl NameGenError {
	/// Create a Configuration error.
	pub fn configuration(message: impl Into<String>) -> Self {
		Self::Configuration {
			message: message.into(),
		}
	}

	/// Returns true for the Configuration kind.
	pub fn is_configuration(&self) -> bool {
		matches!(self, Self::Configuration { .. })
	}
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NameGenError>;
