use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::alphabet::Locale;
use crate::error::{NameGenError, Result};
use super::distribution::Distribution;
use super::symbols::{check_order, end_symbol, DELIMITER};

/// Immutable, sampling-only Markov model.
///
/// Produced by [`ContextModel::build`](super::context_model::ContextModel::build)
/// or loaded from storage. It exposes no mutation, so one instance can be
/// shared (`Arc<RuntimeModel>`) by any number of concurrent generators, each
/// bringing its own random source.
///
/// Generation is a pure function of the model and the sequence of uniform
/// draws: the same draws always give the same name.
///
/// ## Invariants
/// - `order` is in `[1, 10]`
/// - every context key has at most `order` characters
/// - `delimiter_transition` is used whenever no suffix of a context was seen
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "PersistedModel")]
pub struct RuntimeModel {
	order: usize,
	locale: Locale,
	transitions: HashMap<String, Distribution>,
	#[serde(rename = "delimiterTransition")]
	delimiter_transition: Distribution,
}

/// Wire shape of a persisted model, validated before it becomes a [`RuntimeModel`].
#[derive(Deserialize)]
struct PersistedModel {
	order: usize,
	locale: Locale,
	transitions: HashMap<String, Distribution>,
	#[serde(rename = "delimiterTransition")]
	delimiter_transition: Distribution,
}

impl TryFrom<PersistedModel> for RuntimeModel {
	type Error = NameGenError;

	fn try_from(persisted: PersistedModel) -> Result<Self> {
		Self::new(
			persisted.order,
			persisted.locale,
			persisted.transitions,
			persisted.delimiter_transition,
		)
	}
}

impl RuntimeModel {
	/// Assembles a runtime model from built distributions.
	///
	/// # Errors
	/// Returns a Configuration error if `order` is outside `[1, 10]` or a
	/// context is longer than `order`.
	pub fn new(
		order: usize,
		locale: Locale,
		transitions: HashMap<String, Distribution>,
		delimiter_transition: Distribution,
	) -> Result<Self> {
		check_order(order)?;
		if let Some(context) = transitions.keys().find(|context| context.chars().count() > order) {
			return Err(NameGenError::configuration(format!(
				"Context '{context}' is longer than the model order {order}"
			)));
		}
		Ok(Self {
			order,
			locale,
			transitions,
			delimiter_transition,
		})
	}

	/// Context length the model was trained with.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Locale whose alphabet scoped the prior.
	pub fn locale(&self) -> &Locale {
		&self.locale
	}

	/// Number of contexts with a distribution.
	pub fn context_count(&self) -> usize {
		self.transitions.len()
	}

	/// Distribution stored for exactly `context`.
	pub fn distribution(&self, context: &str) -> Option<&Distribution> {
		self.transitions.get(context)
	}

	/// Distribution used when no suffix of a context was ever seen.
	pub fn delimiter_transition(&self) -> &Distribution {
		&self.delimiter_transition
	}

	/// Finds the longest known suffix of `context`.
	///
	/// The context is first brought to exactly `order` characters (keeping
	/// its right end, left-padding with start markers), then its leftmost
	/// character is dropped until the model knows the remainder. Returns an
	/// empty string when nothing matched.
	pub fn backoff(&self, context: &str) -> String {
		let chars: Vec<char> = context.chars().collect();
		let mut key: String = if chars.len() >= self.order {
			chars[chars.len() - self.order..].iter().collect()
		} else {
			std::iter::repeat_n(DELIMITER, self.order - chars.len())
				.chain(chars)
				.collect()
		};

		while !key.is_empty() && !self.transitions.contains_key(&key) {
			key.remove(0);
		}
		key
	}

	/// Picks the next character after `context` for a uniform draw `position`.
	///
	/// # Errors
	/// Returns a Configuration error if `position` is outside `[0, 1]`.
	pub fn sample(&self, context: &str, position: f64) -> Result<char> {
		let key = self.backoff(context);
		self.transitions
			.get(&key)
			.unwrap_or(&self.delimiter_transition)
			.pick(position)
	}

	/// Generates one name.
	///
	/// Starts from the start padding and appends sampled characters until the
	/// end marker comes up; padding and end marker are stripped from the
	/// result. Termination is probabilistic: a model without reachable end
	/// marker mass never returns, callers needing a bound must impose it.
	pub fn apply<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
		let mut sequence: Vec<char> = std::iter::repeat_n(DELIMITER, self.order).collect();

		loop {
			let position: f64 = rng.random();
			let context: String = sequence[sequence.len() - self.order..].iter().collect();
			let next = self.sample(&context, position)?;
			sequence.push(next);
			if next == end_symbol() {
				break;
			}
		}

		Ok(sequence[self.order..sequence.len() - 1].iter().collect())
	}
}
