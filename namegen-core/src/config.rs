use std::sync::Arc;

use serde::Deserialize;

use crate::alphabet::{AlphabetProvider, Locale};
use crate::error::{NameGenError, Result};
use crate::model::context_model::ContextModel;
use crate::model::symbols::check_order;
use crate::model::transition::check_prior;

/// Training and generation settings, loadable from TOML.
///
/// ```toml
/// order = 3
/// prior = 0.001
/// backoff_threshold = 0.02
/// locale = "fr"
/// count = 10
/// ```
///
/// Every field is optional in the file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
	/// Number of preceding characters used as context.
	pub order: usize,
	/// Prior mass per alphabet letter; derived from the alphabet when absent.
	pub prior: Option<f64>,
	/// Accepted for compatibility; back-off only happens on unseen contexts.
	pub backoff_threshold: f64,
	/// Locale whose exemplar alphabet receives the prior.
	pub locale: Locale,
	/// Number of distinct names to generate.
	pub count: usize,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			order: 3,
			prior: None,
			backoff_threshold: 0.02,
			locale: Locale::default(),
			count: 5,
		}
	}
}

impl GenerationConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks every field against its domain.
	pub fn validate(&self) -> Result<()> {
		check_order(self.order)?;
		if let Some(prior) = self.prior {
			check_prior(prior)?;
		}
		if !self.backoff_threshold.is_finite() || self.backoff_threshold < 0.0 {
			return Err(NameGenError::configuration(format!(
				"Backoff threshold must be finite and >= 0, got {}",
				self.backoff_threshold
			)));
		}
		Ok(())
	}

	/// Prior to train with.
	///
	/// The explicit prior if set, otherwise `1 / (30 * A)` for an alphabet of
	/// `A` letters: about one generated letter in thirty is unseen in the corpus.
	pub fn resolve_prior(&self, alphabets: &dyn AlphabetProvider) -> Result<f64> {
		if let Some(prior) = self.prior {
			return Ok(prior);
		}
		let size = alphabets.exemplar_set(&self.locale)?.len();
		if size == 0 {
			return Ok(0.0);
		}
		Ok(1.0 / (30.0 * size as f64))
	}

	/// Creates an empty trainer for this configuration.
	pub fn trainer(&self, alphabets: Arc<dyn AlphabetProvider + Send + Sync>) -> Result<ContextModel> {
		self.validate()?;
		let prior = self.resolve_prior(alphabets.as_ref())?;
		ContextModel::with_alphabets(self.order, prior, self.locale.clone(), alphabets)
	}
}
