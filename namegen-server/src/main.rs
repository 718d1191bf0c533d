use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use namegen_core::io::{find_model, list_models, model_name};
use namegen_core::{Generator, NameGenError, NameRequest};

const DATA_DIR: &str = "./data";

/// Largest batch a single request may ask for.
const MAX_COUNT: usize = 1000;

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	model: Option<String>,
	count: Option<usize>,
	nb_try: Option<usize>,
}

#[derive(Deserialize)]
struct ModelQuery {
	names: Option<String>
}

struct SharedData {
	generator: Generator
}

impl GenerateParams {
	/// Builds the name request, applying defaults.
	///
	/// Fails with a message when `count` exceeds [`MAX_COUNT`].
	fn request(&self) -> Result<NameRequest, String> {
		let count = self.count.unwrap_or(1);
		if count > MAX_COUNT {
			return Err(format!("Parameter 'count' must be at most {MAX_COUNT}, got {count}"));
		}
		let mut request = NameRequest::new(count);
		if let Some(nb_try) = self.nb_try {
			request.nb_try = nb_try;
		}
		Ok(request)
	}
}

/// Names of the models stored in [`DATA_DIR`], sorted and deduplicated.
fn available_models() -> std::io::Result<Vec<String>> {
	let mut names = list_models(DATA_DIR)?
		.iter()
		.map(model_name)
		.collect::<std::io::Result<Vec<_>>>()?;
	names.sort();
	names.dedup();
	Ok(names)
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates distinct names from a loaded model. When `model` is omitted
/// and exactly one model is loaded, that one is used.
/// Returns the names, one per line.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<RwLock<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let request = match query.request() {
		Ok(request) => request,
		Err(message) => return HttpResponse::BadRequest().body(message),
	};

	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let name = match &query.model {
		Some(name) => name.clone(),
		None => match shared_data.generator.model_names().as_slice() {
			[only] => only.clone(),
			_ => return HttpResponse::BadRequest().body("Parameter 'model' is required when several or no models are loaded"),
		},
	};

	match shared_data.generator.generate(&name, &request, &mut rand::rng()) {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(e @ NameGenError::UnknownModel { .. }) => HttpResponse::NotFound().body(e.to_string()),
		Err(e @ NameGenError::Exhausted { .. }) => HttpResponse::UnprocessableEntity().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

#[get("/v1/models")]
async fn get_models() -> impl Responder {
	match available_models() {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models")
	}
}

#[get("/v1/loaded_models")]
async fn get_loaded_models(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.generator.model_names().join("\n"))
}

#[put("/v1/load_models")]
async fn put_model(data: web::Data<RwLock<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};

	let model_names: Vec<&str> = query_names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.collect();

	// Load outside the lock, swap once everything succeeded
	let mut generator = Generator::new();
	for name in model_names {
		let Some(path) = find_model(DATA_DIR, name) else {
			return HttpResponse::NotFound().body(format!("Model {name} not found"));
		};
		if let Err(e) = generator.load_model(path) {
			log::warn!("Failed to load model {name}: {e}");
			return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}"));
		}
	}

	let mut shared_data = match data.write() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.generator = generator;
	log::info!("Loaded models: {}", shared_data.generator.model_names().join(", "));

	HttpResponse::Ok().body("Models loaded successfully")
}

/// Main entry point for the server.
///
/// Loads every model found in `./data`, wraps the registry in a `RwLock`
/// (generation only takes the read side) and starts an Actix-web HTTP server.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - A missing or unreadable `./data` directory starts the server empty.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let generator = Generator::from_dir(DATA_DIR).unwrap_or_else(|e| {
		log::warn!("Starting without models: {e}");
		Generator::new()
	});
	let shared_model = web::Data::new(RwLock::new(SharedData { generator }));

	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(get_models)
			.service(put_model)
			.service(get_loaded_models)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
