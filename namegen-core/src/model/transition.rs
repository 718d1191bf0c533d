use std::collections::{BTreeMap, HashMap};

use crate::alphabet::{AlphabetProvider, Locale};
use crate::error::{NameGenError, Result};
use super::distribution::Distribution;
use super::symbols::DELIMITER;

/// Train-time accumulator for a single context.
///
/// A `Transition` counts which characters followed its context in the
/// corpus. Once training is over, [`Transition::build`] turns the counts and
/// the prior into an immutable [`Distribution`].
///
/// ## Invariants
/// - `prior` is finite, `>= 0` and never changes
/// - `observations` equals the sum of all counts
#[derive(Clone, Debug)]
pub struct Transition {
	/// Baseline mass given to every alphabet character.
	prior: f64,
	/// Locale whose exemplar alphabet receives the prior.
	locale: Locale,
	/// Example: { 'e' => 42, 'a' => 3 }
	observed: HashMap<char, usize>,
	/// Total number of `update` calls.
	observations: usize,
}

/// How the probability budget is split between prior and observations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoothing {
	/// Mass seeded on each alphabet character.
	pub prior: f64,
	/// Mass shared out among observed characters in proportion to their counts.
	pub observation_range: f64,
	/// The requested prior did not fit in the budget and was clamped.
	pub degraded: bool,
}

impl Transition {
	/// Creates an empty transition.
	///
	/// # Errors
	/// Returns a Configuration error if `prior` is negative or not finite.
	pub fn new(prior: f64, locale: Locale) -> Result<Self> {
		check_prior(prior)?;
		Ok(Self::from_validated(prior, locale))
	}

	/// Creates an empty transition for a prior that was already checked.
	pub(crate) fn from_validated(prior: f64, locale: Locale) -> Self {
		Self {
			prior,
			locale,
			observed: HashMap::new(),
			observations: 0,
		}
	}

	/// Records one occurrence of `c` following this context.
	pub fn update(&mut self, c: char) {
		*self.observed.entry(c).or_insert(0) += 1;
		self.observations += 1;
	}

	/// Number of recorded observations.
	pub fn observations(&self) -> usize {
		self.observations
	}

	/// How often `c` was observed.
	pub fn count(&self, c: char) -> usize {
		self.observed.get(&c).copied().unwrap_or(0)
	}

	/// Splits the probability budget for an alphabet of `alphabet_size` letters.
	///
	/// With a zero prior all of the mass comes from observations. Otherwise
	/// each letter gets `prior` and observations share `1 - prior * size`.
	/// When that would be negative the prior is clamped to `1 / (2 * size)`
	/// and observations get half of the mass.
	pub fn smoothing(&self, alphabet_size: usize) -> Smoothing {
		if self.prior == 0.0 {
			return Smoothing { prior: 0.0, observation_range: 1.0, degraded: false };
		}

		let size = alphabet_size as f64;
		let observation_range = 1.0 - self.prior * size;
		if observation_range < 0.0 {
			Smoothing {
				prior: 1.0 / (2.0 * size),
				observation_range: 0.5,
				degraded: true,
			}
		} else {
			Smoothing { prior: self.prior, observation_range, degraded: false }
		}
	}

	/// Builds the runtime distribution for this context.
	///
	/// The alphabet is only fetched when the prior is positive. Characters
	/// observed outside the alphabet (the end marker, typically) receive
	/// observation mass only.
	///
	/// # Errors
	/// Returns a Configuration error if the provider fails for the locale or
	/// returns an alphabet containing the delimiter.
	pub fn build(&self, alphabets: &dyn AlphabetProvider) -> Result<Distribution> {
		let mut masses: BTreeMap<char, f64> = BTreeMap::new();

		let smoothing = if self.prior > 0.0 {
			let alphabet = alphabets.exemplar_set(&self.locale)?;
			if alphabet.contains(&DELIMITER) {
				return Err(NameGenError::configuration(format!(
					"Alphabet for locale '{}' contains the reserved delimiter '{DELIMITER}'",
					self.locale
				)));
			}

			let smoothing = self.smoothing(alphabet.len());
			if smoothing.degraded {
				log::warn!(
					"A prior of {} over {} letters leaves no room for observations, using {} instead",
					self.prior,
					alphabet.len(),
					smoothing.prior
				);
			}
			for letter in alphabet {
				masses.insert(letter, smoothing.prior);
			}
			smoothing
		} else {
			self.smoothing(0)
		};

		if self.observations > 0 {
			let total = self.observations as f64;
			for (c, count) in &self.observed {
				*masses.entry(*c).or_insert(0.0) += smoothing.observation_range * *count as f64 / total;
			}
		}

		Distribution::new(masses)
	}
}

/// Validates a prior probability.
pub(crate) fn check_prior(prior: f64) -> Result<f64> {
	if !prior.is_finite() || prior < 0.0 {
		return Err(NameGenError::configuration(format!("Prior must be finite and >= 0, got {prior}")));
	}
	Ok(prior)
}
