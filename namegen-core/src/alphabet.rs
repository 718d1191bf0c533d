use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NameGenError, Result};

/// A validated locale token such as `en`, `fr-CA` or `pt_BR`.
///
/// Only the shape is checked: a first subtag of 2 to 8 ASCII letters, then any
/// number of 1 to 8 character alphanumeric subtags separated by `-` or `_`.
/// Whether an alphabet exists for it is the provider's business.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
	tag: String,
}

impl Locale {
	/// Parses a locale token.
	///
	/// # Errors
	/// Returns a Configuration error if the token is malformed.
	pub fn new(tag: &str) -> Result<Self> {
		let mut subtags = tag.split(['-', '_']);
		let language = subtags.next().unwrap_or_default();
		if !(2..=8).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
			return Err(NameGenError::configuration(format!("Malformed locale token '{tag}'")));
		}
		for subtag in subtags {
			if !(1..=8).contains(&subtag.len()) || !subtag.chars().all(|c| c.is_ascii_alphanumeric()) {
				return Err(NameGenError::configuration(format!("Malformed locale token '{tag}'")));
			}
		}
		Ok(Self { tag: tag.to_owned() })
	}

	/// Lower-cased primary language subtag (`"fr"` for `"FR-ca"`).
	pub fn language(&self) -> String {
		self.tag
			.split(['-', '_'])
			.next()
			.unwrap_or_default()
			.to_ascii_lowercase()
	}

	/// The token as given.
	pub fn as_str(&self) -> &str {
		&self.tag
	}
}

impl Default for Locale {
	fn default() -> Self {
		Self { tag: "en".to_owned() }
	}
}

impl fmt::Display for Locale {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.tag)
	}
}

impl TryFrom<String> for Locale {
	type Error = NameGenError;

	fn try_from(value: String) -> Result<Self> {
		Self::new(&value)
	}
}

impl From<Locale> for String {
	fn from(locale: Locale) -> Self {
		locale.tag
	}
}

/// Source of the characters typical for everyday writing in a locale.
///
/// Implementations must be referentially stable (same token, same set) and
/// must never return the reserved delimiter.
pub trait AlphabetProvider {
	/// Ordered exemplar set for `locale`.
	fn exemplar_set(&self, locale: &Locale) -> Result<BTreeSet<char>>;
}

/// Standard exemplar sets for a handful of Latin-script languages.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinAlphabets;

const BASIC_LATIN: &str = "abcdefghijklmnopqrstuvwxyz";

/// (language subtag, letters beyond a-z, letters of a-z not in everyday use)
const EXEMPLARS: &[(&str, &str, &str)] = &[
	("en", "", ""),
	("de", "äöüß", ""),
	("fr", "àâæçéèêëîïôœùûüÿ", ""),
	("es", "áéíñóúü", ""),
	("it", "àèéìòóù", ""),
	("pt", "áàâãçéêíóôõú", ""),
	("nl", "áäéëíïóöúüĳ", ""),
	("sv", "åäö", ""),
	("da", "æøå", ""),
	("nb", "æøå", ""),
	("no", "æøå", ""),
	("fi", "åäöšž", ""),
	("pl", "ąćęłńóśźż", "qvx"),
	("cs", "áčďéěíňóřšťúůýž", ""),
];

impl AlphabetProvider for BuiltinAlphabets {
	fn exemplar_set(&self, locale: &Locale) -> Result<BTreeSet<char>> {
		let language = locale.language();
		let (_, extra, missing) = EXEMPLARS
			.iter()
			.find(|(code, _, _)| *code == language)
			.ok_or_else(|| NameGenError::configuration(format!("No exemplar alphabet for locale '{locale}'")))?;

		Ok(BASIC_LATIN
			.chars()
			.filter(|c| !missing.contains(*c))
			.chain(extra.chars())
			.collect())
	}
}

/// Provider returning the same alphabet whatever the locale.
#[derive(Clone, Debug)]
pub struct FixedAlphabet {
	letters: BTreeSet<char>,
}

impl FixedAlphabet {
	pub fn new(letters: &str) -> Self {
		Self {
			letters: letters.chars().collect(),
		}
	}
}

impl AlphabetProvider for FixedAlphabet {
	fn exemplar_set(&self, _locale: &Locale) -> Result<BTreeSet<char>> {
		Ok(self.letters.clone())
	}
}
