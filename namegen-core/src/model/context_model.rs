use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::alphabet::{AlphabetProvider, BuiltinAlphabets, Locale};
use crate::error::Result;
use super::distribution::Distribution;
use super::runtime_model::RuntimeModel;
use super::symbols::{check_order, end_symbol, DELIMITER};
use super::transition::{check_prior, Transition};

/// Trainable variable-order Markov model over characters.
///
/// Every training position writes its event under every suffix of its
/// context, from the full `order` characters down to a single character.
/// The shorter suffixes are what [`RuntimeModel::backoff`] falls back to
/// when a long context was never seen.
///
/// # Responsibilities
/// - Pad and window corpus lines
/// - Accumulate one [`Transition`] per distinct context
/// - Produce an independent [`RuntimeModel`] snapshot on [`ContextModel::build`]
///
/// # Invariants
/// - `order` is in `[1, 10]`, `prior` is finite and `>= 0`
/// - every key of `transitions` has 1 to `order` characters
pub struct ContextModel {
	order: usize,
	prior: f64,
	locale: Locale,
	alphabets: Arc<dyn AlphabetProvider + Send + Sync>,
	transitions: HashMap<String, Transition>,
}

impl fmt::Debug for ContextModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContextModel")
			.field("order", &self.order)
			.field("prior", &self.prior)
			.field("locale", &self.locale)
			.field("contexts", &self.transitions.len())
			.finish_non_exhaustive()
	}
}

impl ContextModel {
	/// Creates an empty model using the built-in exemplar alphabets.
	///
	/// # Errors
	/// Returns a Configuration error if `order` is outside `[1, 10]` or
	/// `prior` is negative.
	pub fn new(order: usize, prior: f64, locale: Locale) -> Result<Self> {
		Self::with_alphabets(order, prior, locale, Arc::new(BuiltinAlphabets))
	}

	/// Creates an empty model drawing its prior alphabet from `alphabets`.
	pub fn with_alphabets(
		order: usize,
		prior: f64,
		locale: Locale,
		alphabets: Arc<dyn AlphabetProvider + Send + Sync>,
	) -> Result<Self> {
		check_order(order)?;
		check_prior(prior)?;
		Ok(Self {
			order,
			prior,
			locale,
			alphabets,
			transitions: HashMap::new(),
		})
	}

	/// Maximum context length.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Locale handed to every transition.
	pub fn locale(&self) -> &Locale {
		&self.locale
	}

	/// Number of distinct contexts seen so far.
	pub fn context_count(&self) -> usize {
		self.transitions.len()
	}

	/// Accumulator recorded for `context`, if any.
	pub fn transition(&self, context: &str) -> Option<&Transition> {
		self.transitions.get(context)
	}

	/// Adds one corpus line (a name) to the model.
	///
	/// The line is padded with `order` start markers and one end marker. An
	/// empty line still contributes a start-to-end observation.
	///
	/// # Notes
	/// - UTF-8 safe: windows are taken over characters, not bytes.
	/// - The line is expected to be trimmed, lower-cased and delimiter-free.
	pub fn update(&mut self, line: &str) {
		let padding = std::iter::repeat_n(DELIMITER, self.order);
		let padded: Vec<char> = padding
			.chain(line.chars())
			.chain(std::iter::once(end_symbol()))
			.collect();

		for i in self.order..padded.len() {
			let event = padded[i];
			for start in i - self.order..i {
				let context: String = padded[start..i].iter().collect();
				self.transitions
					.entry(context)
					.or_insert_with(|| Transition::from_validated(self.prior, self.locale.clone()))
					.update(event);
			}
		}
	}

	/// Builds an immutable runtime snapshot of the current statistics.
	///
	/// Later calls to [`ContextModel::update`] do not affect the returned model.
	///
	/// # Errors
	/// Propagates alphabet lookup failures from [`Transition::build`].
	pub fn build(&self) -> Result<RuntimeModel> {
		let mut built = HashMap::with_capacity(self.transitions.len());
		for (context, transition) in &self.transitions {
			built.insert(context.clone(), transition.build(self.alphabets.as_ref())?);
		}
		log::debug!("Built {} contexts of order {} for locale {}", built.len(), self.order, self.locale);
		RuntimeModel::new(self.order, self.locale.clone(), built, Distribution::end_only())
	}
}
