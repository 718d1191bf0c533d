use std::fs;
use std::sync::Arc;

use namegen_core::io::{load_model, load_or_train, read_corpus, save_model, train};
use namegen_core::{
	BuiltinAlphabets, FixedAlphabet, GenerationConfig, Generator, Locale, NameGenError, NameRequest, RuntimeModel,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

const NAMES: &[&str] = &["aldric", "brenna", "cedric", "daria", "elowen", "fenwick", "garrick", "halden"];

fn model(prior: Option<f64>) -> RuntimeModel {
	let config = GenerationConfig { prior, ..GenerationConfig::default() };
	train(NAMES, &config, Arc::new(BuiltinAlphabets)).unwrap()
}

fn names(model: &RuntimeModel, seed: u64) -> Vec<String> {
	let mut rng = StdRng::seed_from_u64(seed);
	(0..20).map(|_| model.apply(&mut rng).unwrap()).collect()
}

#[test]
fn binary_round_trip_generates_identically() {
	let dir = tempdir().unwrap();
	let path = dir.path().join("fantasy.bin");
	let original = model(None);

	save_model(&path, &original).unwrap();
	let loaded = load_model(&path).unwrap();

	assert_eq!(loaded, original);
	assert_eq!(names(&loaded, 9), names(&original, 9));
}

#[test]
fn json_round_trip_generates_identically() {
	let dir = tempdir().unwrap();
	let path = dir.path().join("fantasy.json");
	let original = model(Some(0.005));

	save_model(&path, &original).unwrap();
	let text = fs::read_to_string(&path).unwrap();
	assert!(text.contains("\"delimiterTransition\""));
	assert!(text.contains("\"locale\": \"en\""));

	let loaded = load_model(&path).unwrap();
	assert_eq!(names(&loaded, 11), names(&original, 11));
}

#[test]
fn corrupt_json_model_is_rejected() {
	let dir = tempdir().unwrap();
	let path = dir.path().join("broken.json");
	fs::write(
		&path,
		r###"{"order": 2, "locale": "en", "transitions": {"##": {"a": 1e400}}, "delimiterTransition": {"#": 1.0}}"###,
	)
	.unwrap();
	assert!(load_model(&path).is_err());

	fs::write(
		&path,
		r###"{"order": 2, "locale": "en", "transitions": {"##": {"a": -1.0}}, "delimiterTransition": {"#": 1.0}}"###,
	)
	.unwrap();
	assert!(matches!(load_model(&path), Err(NameGenError::Json(_))));
}

#[test]
fn truncated_binary_model_is_rejected() {
	let dir = tempdir().unwrap();
	let path = dir.path().join("short.bin");
	save_model(&path, &model(None)).unwrap();

	let bytes = fs::read(&path).unwrap();
	fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
	assert!(matches!(load_model(&path), Err(NameGenError::Binary(_))));
}

#[test]
fn corpus_lines_are_normalized() {
	let dir = tempdir().unwrap();
	let path = dir.path().join("names.txt");
	fs::write(&path, "  Aldric \nBRENNA\n\nbad#line\nÉlodie\n").unwrap();

	let lines = read_corpus(&path).unwrap();
	assert_eq!(lines, vec!["aldric", "brenna", "", "élodie"]);
}

#[test]
fn load_or_train_writes_and_reuses_the_cache() {
	let dir = tempdir().unwrap();
	let corpus = dir.path().join("elves.txt");
	fs::write(&corpus, NAMES.join("\n")).unwrap();
	let config = GenerationConfig::default();

	let trained = load_or_train(&corpus, &config, Arc::new(BuiltinAlphabets)).unwrap();
	let cache = dir.path().join("elves.bin");
	assert!(cache.exists());

	// A cache hit must not need the corpus any more
	fs::remove_file(&corpus).unwrap();
	let cached = load_or_train(&corpus, &config, Arc::new(BuiltinAlphabets)).unwrap();
	assert_eq!(cached, trained);
}

#[test]
fn load_or_train_retrains_on_order_change() {
	let dir = tempdir().unwrap();
	let corpus = dir.path().join("elves.txt");
	fs::write(&corpus, NAMES.join("\n")).unwrap();

	let first = load_or_train(&corpus, &GenerationConfig::default(), Arc::new(BuiltinAlphabets)).unwrap();
	let config = GenerationConfig { order: 2, ..GenerationConfig::default() };
	let second = load_or_train(&corpus, &config, Arc::new(BuiltinAlphabets)).unwrap();

	assert_eq!(first.order(), 3);
	assert_eq!(second.order(), 2);
	assert_eq!(load_model(dir.path().join("elves.bin")).unwrap().order(), 2);
}

#[test]
fn load_or_train_retrains_on_prior_change() {
	let dir = tempdir().unwrap();
	let corpus = dir.path().join("elves.txt");
	fs::write(&corpus, NAMES.join("\n")).unwrap();

	let plain = GenerationConfig { prior: Some(0.0), ..GenerationConfig::default() };
	let first = load_or_train(&corpus, &plain, Arc::new(BuiltinAlphabets)).unwrap();
	assert_eq!(first.distribution("###").unwrap().probability('z'), 0.0);

	let smoothed = GenerationConfig { prior: Some(0.01), ..GenerationConfig::default() };
	let second = load_or_train(&corpus, &smoothed, Arc::new(BuiltinAlphabets)).unwrap();
	assert!((second.distribution("###").unwrap().probability('z') - 0.01).abs() < 1e-12);

	// The retrained model replaced the cache, so the same settings now hit it
	fs::remove_file(&corpus).unwrap();
	let cached = load_or_train(&corpus, &smoothed, Arc::new(BuiltinAlphabets)).unwrap();
	assert_eq!(cached, second);
}

#[test]
fn cache_without_its_settings_is_retrained() {
	let dir = tempdir().unwrap();
	let corpus = dir.path().join("elves.txt");
	fs::write(&corpus, NAMES.join("\n")).unwrap();
	save_model(dir.path().join("elves.bin"), &model(Some(0.0))).unwrap();

	let config = GenerationConfig { prior: Some(0.01), ..GenerationConfig::default() };
	let trained = load_or_train(&corpus, &config, Arc::new(BuiltinAlphabets)).unwrap();
	assert!(trained.distribution("###").unwrap().probability('z') > 0.0);
	assert!(dir.path().join("elves.cache.toml").exists());
}

#[test]
fn generator_loads_a_directory() {
	let dir = tempdir().unwrap();
	save_model(dir.path().join("fantasy.bin"), &model(None)).unwrap();
	save_model(dir.path().join("plain.json"), &model(Some(0.0))).unwrap();
	fs::write(dir.path().join("notes.txt"), "not a model").unwrap();

	let generator = Generator::from_dir(dir.path()).unwrap();
	assert_eq!(generator.model_names(), vec!["fantasy".to_owned(), "plain".to_owned()]);

	let mut request = NameRequest::new(3);
	request.exclude = NAMES.iter().map(|name| name.to_string()).collect();
	let mut rng = StdRng::seed_from_u64(5);
	let generated = generator.generate("fantasy", &request, &mut rng).unwrap();
	assert_eq!(generated.len(), 3);
	assert!(generated.iter().all(|name| !NAMES.contains(&name.as_str())));
}

#[test]
fn generator_rejects_clashing_stems() {
	let dir = tempdir().unwrap();
	save_model(dir.path().join("same.bin"), &model(None)).unwrap();
	save_model(dir.path().join("same.json"), &model(None)).unwrap();
	assert!(matches!(Generator::from_dir(dir.path()), Err(NameGenError::DuplicateModel { .. })));
}

#[test]
fn fake_alphabet_scopes_the_prior() {
	let config = GenerationConfig { prior: Some(0.05), order: 1, ..GenerationConfig::default() };
	let model = train(["ab"], &config, Arc::new(FixedAlphabet::new("xyz"))).unwrap();

	let start = model.distribution("#").unwrap();
	assert!((start.probability('x') - 0.05).abs() < 1e-12);
	assert_eq!(start.probability('q'), 0.0);
	assert!((start.total() - 1.0).abs() < 1e-9);
	assert_eq!(model.locale(), &Locale::default());
}
