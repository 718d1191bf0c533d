use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use std::{fs, io};

use serde::{Deserialize, Serialize};

use crate::alphabet::{AlphabetProvider, Locale};
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::model::runtime_model::RuntimeModel;
use crate::model::symbols::DELIMITER;

/// Extensions recognised as persisted runtime models.
pub const MODEL_EXTENSIONS: [&str; 2] = ["bin", "json"];

/// Reads a training corpus, one name per line.
///
/// - Lines are trimmed and lower-cased
/// - Blank lines are kept (they train a start-to-end observation)
/// - Lines containing the reserved delimiter are skipped with a warning
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let contents = fs::read_to_string(&filename)?;
	let mut lines = Vec::new();
	for (number, line) in contents.lines().enumerate() {
		let line = line.trim().to_lowercase();
		if line.contains(DELIMITER) {
			log::warn!(
				"Skipping line {} of {}: contains the reserved delimiter '{DELIMITER}'",
				number + 1,
				filename.as_ref().display()
			);
			continue;
		}
		lines.push(line);
	}
	Ok(lines)
}

/// Path next to `input` with its extension replaced.
///
/// `corpora/elves.txt` + `"bin"` gives `corpora/elves.bin`, the file
/// [`load_or_train`] caches the trained model in.
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut file_name = file_stem.to_os_string();
	file_name.push(".");
	file_name.push(output_extension);
	Ok(input_path.with_file_name(file_name))
}

/// Name a persisted model is registered under: its file stem.
///
/// `data/elves.bin` and `elves.json` are both the model `elves`.
pub fn model_name<P: AsRef<Path>>(path: P) -> io::Result<String> {
	let stem = path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Model path has no filename"))?;
	Ok(stem.to_string_lossy().into_owned())
}

fn is_model_file(path: &Path) -> bool {
	path.is_file()
		&& path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| MODEL_EXTENSIONS.contains(&ext))
}

/// Persisted models directly inside `dir`, sorted by path.
///
/// Every extension of [`MODEL_EXTENSIONS`] is accepted; subdirectories are
/// not searched.
pub fn list_models<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
	let mut models = Vec::new();
	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if is_model_file(&path) {
			models.push(path);
		}
	}
	models.sort();
	Ok(models)
}

/// File holding the model `name` in `dir`, trying each of [`MODEL_EXTENSIONS`] in turn.
pub fn find_model<P: AsRef<Path>>(dir: P, name: &str) -> Option<PathBuf> {
	MODEL_EXTENSIONS
		.iter()
		.map(|ext| dir.as_ref().join(format!("{name}.{ext}")))
		.find(|path| is_model_file(path))
}

fn is_json<P: AsRef<Path>>(path: P) -> bool {
	path.as_ref().extension() == Some(std::ffi::OsStr::new("json"))
}

/// Writes a runtime model: JSON for `.json` paths, postcard otherwise.
pub fn save_model<P: AsRef<Path>>(path: P, model: &RuntimeModel) -> Result<()> {
	let bytes = if is_json(&path) {
		serde_json::to_vec_pretty(model)?
	} else {
		postcard::to_stdvec(model)?
	};
	fs::write(&path, bytes)?;
	log::info!("Model written to {}", path.as_ref().display());
	Ok(())
}

/// Reads a runtime model written by [`save_model`].
///
/// Every distribution is validated while decoding; a corrupt file yields an
/// error, never a partially initialised model.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<RuntimeModel> {
	let bytes = fs::read(&path)?;
	let model: RuntimeModel = if is_json(&path) {
		serde_json::from_slice(&bytes)?
	} else {
		postcard::from_bytes(&bytes)?
	};
	log::debug!("Model loaded from {}", path.as_ref().display());
	Ok(model)
}

/// Reads a TOML generation configuration.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GenerationConfig> {
	let text = fs::read_to_string(path)?;
	GenerationConfig::from_toml_str(&text)
}

/// Trains a model from corpus lines.
pub fn train<I, S>(lines: I, config: &GenerationConfig, alphabets: Arc<dyn AlphabetProvider + Send + Sync>) -> Result<RuntimeModel>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut model = config.trainer(alphabets)?;
	for line in lines {
		model.update(line.as_ref());
	}
	model.build()
}

/// Settings a cached model was trained with, stored beside the cache.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CacheKey {
	order: usize,
	locale: Locale,
	prior: f64,
}

fn read_cache_key(path: &Path) -> Option<CacheKey> {
	let text = fs::read_to_string(path).ok()?;
	toml::from_str(&text).ok()
}

/// Loads the runtime model cached next to a corpus, or trains and caches it.
///
/// - `corpus` is the input text file; the cache is the same path with a `.bin`
///   extension, and `<stem>.cache.toml` records the order, locale and resolved
///   prior it was trained with.
/// - A cache trained with other settings, or without a readable record, is
///   ignored and overwritten.
pub fn load_or_train<P: AsRef<Path>>(
	corpus: P,
	config: &GenerationConfig,
	alphabets: Arc<dyn AlphabetProvider + Send + Sync>,
) -> Result<RuntimeModel> {
	config.validate()?;
	let key = CacheKey {
		order: config.order,
		locale: config.locale.clone(),
		prior: config.resolve_prior(alphabets.as_ref())?,
	};
	let binary_data_path = build_output_path(&corpus, "bin")?;
	let key_path = build_output_path(&corpus, "cache.toml")?;

	if binary_data_path.exists() {
		if read_cache_key(&key_path).as_ref() == Some(&key) {
			let cached = load_model(&binary_data_path)?;
			if cached.order() == key.order && cached.locale() == &key.locale {
				log::info!("Using cached model {}", binary_data_path.display());
				return Ok(cached);
			}
		}
		log::info!("Cached model {} does not match the configuration, retraining", binary_data_path.display());
	}

	let start = Instant::now();
	let lines = read_corpus(&corpus)?;
	let model = train(&lines, config, alphabets)?;
	log::info!(
		"File {} analyzed in {} ms ({} lines)",
		corpus.as_ref().display(),
		start.elapsed().as_millis(),
		lines.len()
	);

	save_model(&binary_data_path, &model)?;
	fs::write(&key_path, toml::to_string(&key)?)?;
	Ok(model)
}
