use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use rand::Rng;

use crate::error::{NameGenError, Result};
use crate::io;
use super::runtime_model::RuntimeModel;

/// Upper bound on the capacity reserved up front for a batch.
const RESERVE_LIMIT: usize = 1024;

/// Parameters for drawing a batch of distinct names.
///
/// # Fields
/// - `count`: number of pairwise distinct names to return.
/// - `nb_try`: extra draws allowed per name when a draw repeats an earlier
///   name or hits `exclude`.
/// - `exclude`: names that must not be returned (typically the training corpus).
#[derive(Clone, Debug)]
pub struct NameRequest {
	pub count: usize,
	pub nb_try: usize,
	pub exclude: HashSet<String>,
}

impl NameRequest {
	/// Request for `count` names with the default retry budget and no exclusions.
	pub fn new(count: usize) -> Self {
		Self {
			count,
			nb_try: 100,
			exclude: HashSet::new(),
		}
	}
}

/// Draws `request.count` distinct names from `model`.
///
/// Each name is an independent [`RuntimeModel::apply`] draw. Names come back
/// in the order they were first drawn.
///
/// # Errors
/// - `Exhausted` if a name could not be found within `nb_try` retries.
/// - Any sampling error from the model.
pub fn distinct_names<R: Rng + ?Sized>(model: &RuntimeModel, request: &NameRequest, rng: &mut R) -> Result<Vec<String>> {
	let reserve = request.count.min(RESERVE_LIMIT);
	let mut names: Vec<String> = Vec::with_capacity(reserve);
	let mut seen: HashSet<String> = HashSet::with_capacity(reserve);

	while names.len() < request.count {
		let mut found = None;
		for _ in 0..=request.nb_try {
			let name = model.apply(rng)?;
			if !seen.contains(&name) && !request.exclude.contains(&name) {
				found = Some(name);
				break;
			}
		}

		match found {
			Some(name) => {
				seen.insert(name.clone());
				names.push(name);
			}
			None => {
				return Err(NameGenError::Exhausted {
					requested: request.count,
					produced: names.len(),
				});
			}
		}
	}

	Ok(names)
}

/// Registry of named runtime models.
///
/// # Responsibilities
/// - Load every persisted model found in a directory
/// - Hand out shared, read-only handles to the models
/// - Generate batches of distinct names from a model chosen by name
#[derive(Debug, Default)]
pub struct Generator {
	models: HashMap<String, Arc<RuntimeModel>>,
}

impl Generator {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a generator by loading all `.bin` and `.json` models from a directory.
	///
	/// # Parameters
	/// - `folder`: Path to a directory containing model files.
	///
	/// # Behavior
	/// - The model name is derived from the file name (without extension).
	/// - Only files directly contained in the directory are loaded
	///   (subdirectories are ignored).
	///
	/// # Errors
	/// - Returns an error if the path is not a directory.
	/// - Returns an error if a model fails to load or two files share a stem.
	pub fn from_dir<P: AsRef<Path>>(folder: P) -> Result<Self> {
		let folder = folder.as_ref();
		if !folder.is_dir() {
			return Err(NameGenError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Expected a directory, got: {}", folder.display()),
			)));
		}

		let mut generator = Self::new();
		for path in io::list_models(folder)? {
			generator.load_model(path)?;
		}
		log::info!("Loaded {} models from {}", generator.models.len(), folder.display());
		Ok(generator)
	}

	/// Loads a persisted model and registers it under its file stem.
	pub fn load_model<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let name = io::model_name(&path)?;
		if self.models.contains_key(&name) {
			return Err(NameGenError::DuplicateModel { name });
		}
		let model = io::load_model(&path)?;
		self.insert(name, model)
	}

	/// Registers `model` under `name`.
	///
	/// # Errors
	/// Returns `DuplicateModel` if the name is taken.
	pub fn insert(&mut self, name: impl Into<String>, model: RuntimeModel) -> Result<()> {
		let name = name.into();
		if self.models.contains_key(&name) {
			return Err(NameGenError::DuplicateModel { name });
		}
		self.models.insert(name, Arc::new(model));
		Ok(())
	}

	/// Returns the list of loaded model names, sorted.
	pub fn model_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.models.keys().cloned().collect();
		names.sort();
		names
	}

	/// Shared handle on a loaded model.
	pub fn get(&self, name: &str) -> Option<Arc<RuntimeModel>> {
		self.models.get(name).cloned()
	}

	/// Draws distinct names from the model registered under `name`.
	///
	/// # Errors
	/// Returns `UnknownModel` if no model has that name, otherwise see
	/// [`distinct_names`].
	pub fn generate<R: Rng + ?Sized>(&self, name: &str, request: &NameRequest, rng: &mut R) -> Result<Vec<String>> {
		let model = self
			.models
			.get(name)
			.ok_or_else(|| NameGenError::UnknownModel { name: name.to_owned() })?;
		distinct_names(model, request, rng)
	}
}

#[cfg(test)]
mod tests {
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	use super::*;
	use crate::alphabet::{FixedAlphabet, Locale};
	use crate::model::context_model::ContextModel;

	fn model(prior: f64, names: &[&str]) -> RuntimeModel {
		let alphabet = Arc::new(FixedAlphabet::new("abcdefghijklmnopqrstuvwxyz"));
		let mut m = ContextModel::with_alphabets(2, prior, Locale::default(), alphabet).unwrap();
		for name in names {
			m.update(name);
		}
		m.build().unwrap()
	}

	#[test]
	fn names_are_distinct() {
		let m = model(0.0, &["anna", "bert", "carl", "dora", "emil"]);
		let mut rng = StdRng::seed_from_u64(7);
		let names = distinct_names(&m, &NameRequest::new(3), &mut rng).unwrap();
		assert_eq!(names.len(), 3);
		let unique: HashSet<&String> = names.iter().collect();
		assert_eq!(unique.len(), 3);
	}

	#[test]
	fn single_name_model_is_exhausted() {
		let m = model(0.0, &["thomas"]);
		let mut rng = StdRng::seed_from_u64(1);
		let mut request = NameRequest::new(2);
		request.nb_try = 5;
		match distinct_names(&m, &request, &mut rng) {
			Err(NameGenError::Exhausted { requested, produced }) => {
				assert_eq!(requested, 2);
				assert_eq!(produced, 1);
			}
			other => panic!("expected exhaustion, got {other:?}"),
		}
	}

	#[test]
	fn huge_count_is_not_preallocated() {
		let m = model(0.0, &["thomas"]);
		let mut rng = StdRng::seed_from_u64(1);
		let mut request = NameRequest::new(usize::MAX);
		request.nb_try = 2;
		match distinct_names(&m, &request, &mut rng) {
			Err(NameGenError::Exhausted { requested, produced }) => {
				assert_eq!(requested, usize::MAX);
				assert_eq!(produced, 1);
			}
			other => panic!("expected exhaustion, got {other:?}"),
		}
	}

	#[test]
	fn excluded_names_are_never_returned() {
		let m = model(0.0, &["thomas"]);
		let mut rng = StdRng::seed_from_u64(1);
		let mut request = NameRequest::new(1);
		request.nb_try = 3;
		request.exclude.insert("thomas".to_owned());
		assert!(matches!(distinct_names(&m, &request, &mut rng), Err(NameGenError::Exhausted { .. })));
	}

	#[test]
	fn zero_count_draws_nothing() {
		let m = model(0.0, &["thomas"]);
		let mut rng = StdRng::seed_from_u64(1);
		assert!(distinct_names(&m, &NameRequest::new(0), &mut rng).unwrap().is_empty());
	}

	#[test]
	fn registry_rejects_duplicates_and_unknown_names() {
		let mut generator = Generator::new();
		generator.insert("german", model(0.0, &["otto"])).unwrap();
		assert!(matches!(
			generator.insert("german", model(0.0, &["anna"])),
			Err(NameGenError::DuplicateModel { .. })
		));
		assert_eq!(generator.model_names(), vec!["german".to_owned()]);

		let mut rng = StdRng::seed_from_u64(3);
		let names = generator.generate("german", &NameRequest::new(1), &mut rng).unwrap();
		assert_eq!(names, vec!["otto".to_owned()]);
		assert!(matches!(
			generator.generate("french", &NameRequest::new(1), &mut rng),
			Err(NameGenError::UnknownModel { .. })
		));
	}

	#[test]
	fn shared_model_serves_concurrent_callers() {
		let mut generator = Generator::new();
		generator.insert("one", model(0.0, &["thomas"])).unwrap();
		let shared = generator.get("one").unwrap();

		let handles: Vec<_> = (0..4)
			.map(|seed| {
				let model = shared.clone();
				std::thread::spawn(move || {
					let mut rng = StdRng::seed_from_u64(seed);
					model.apply(&mut rng).unwrap()
				})
			})
			.collect();
		for handle in handles {
			assert_eq!(handle.join().unwrap(), "thomas");
		}
	}
}
