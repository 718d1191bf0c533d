use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{NameGenError, Result};
use super::symbols::end_symbol;

/// Immutable categorical distribution over the next character.
///
/// Masses are kept ordered by code point. Sampling walks that order while
/// accumulating mass, so the order is part of the contract: the same position
/// always yields the same character, in every process.
///
/// ## Invariants
/// - every mass is finite and `>= 0`
/// - masses sum to about 1.0 for distributions built with a positive prior
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(try_from = "BTreeMap<char, f64>")]
pub struct Distribution {
	masses: BTreeMap<char, f64>,
}

impl Distribution {
	/// Creates a distribution from raw masses.
	///
	/// # Errors
	/// Returns a Configuration error if any mass is negative or not finite.
	pub fn new(masses: BTreeMap<char, f64>) -> Result<Self> {
		if let Some((c, mass)) = masses.iter().find(|(_, mass)| !mass.is_finite() || **mass < 0.0) {
			return Err(NameGenError::configuration(format!(
				"Probability mass for '{c}' must be finite and >= 0, got {mass}"
			)));
		}
		Ok(Self { masses })
	}

	/// Distribution putting all of its mass on the end marker.
	pub fn end_only() -> Self {
		Self {
			masses: BTreeMap::from([(end_symbol(), 1.0)]),
		}
	}

	/// Deterministically picks a character for `position` in `[0, 1]`.
	///
	/// Returns the first character, in code point order, whose cumulative mass
	/// exceeds `position`. If rounding leaves the walk short of `position`, the
	/// end marker is returned and the miss is logged.
	///
	/// # Errors
	/// Returns a Configuration error if `position` is outside `[0, 1]` or NaN.
	pub fn pick(&self, position: f64) -> Result<char> {
		if !(0.0..=1.0).contains(&position) {
			return Err(NameGenError::configuration(format!(
				"Sampling position {position} must be between 0 and 1.0"
			)));
		}

		let mut cumulation = 0.0;
		for (c, mass) in &self.masses {
			cumulation += mass;
			if cumulation > position {
				return Ok(*c);
			}
		}

		log::error!(
			"Unable to find a position for {position} in a distribution summing to {cumulation}, falling back to the end marker"
		);
		Ok(end_symbol())
	}

	/// Probability mass assigned to `c` (0 when absent).
	pub fn probability(&self, c: char) -> f64 {
		self.masses.get(&c).copied().unwrap_or(0.0)
	}

	/// Sum of all masses.
	pub fn total(&self) -> f64 {
		self.masses.values().sum()
	}

	/// Number of characters carrying an entry.
	pub fn len(&self) -> usize {
		self.masses.len()
	}

	/// True when no character has an entry.
	pub fn is_empty(&self) -> bool {
		self.masses.is_empty()
	}

	/// Entries in code point order.
	pub fn iter(&self) -> impl Iterator<Item = (char, f64)> + '_ {
		self.masses.iter().map(|(c, mass)| (*c, *mass))
	}
}

impl TryFrom<BTreeMap<char, f64>> for Distribution {
	type Error = NameGenError;

	fn try_from(masses: BTreeMap<char, f64>) -> Result<Self> {
		Self::new(masses)
	}
}

impl Serialize for Distribution {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		self.masses.serialize(serializer)
	}
}
