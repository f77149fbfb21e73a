#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime atlas.
//!
//! Serves the crime-incident dataset as JSON for the map frontend, accepts
//! CSV re-uploads that replace the in-memory dataset, and proxies analysis
//! prompts to the completion API. The landing page and its assets are
//! served as static files from `static/`.

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use crime_atlas_ai::CompletionClient;
use crime_atlas_dataset::{Dataset, DatasetStore};

/// Dataset file loaded at startup when `CRIME_DATA_PATH` is unset.
pub const DEFAULT_DATA_PATH: &str = "data/tamil_nadu_crime_data.csv";

/// Shared application state.
pub struct AppState {
    /// Swappable handle to the live dataset.
    pub store: Arc<DatasetStore>,
    /// Completion-API client for the analyze endpoint.
    pub ai: Arc<CompletionClient>,
    /// Directory where uploaded CSV files are persisted.
    pub upload_dir: PathBuf,
}

/// Registers the JSON API routes.
///
/// Split out from [`run_server`] so handler tests can mount the same
/// routing table without binding a listener or serving static files.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/crime-data", web::get().to(handlers::crime_data))
        .route("/crime-summary", web::get().to(handlers::crime_summary))
        .route("/crime-counts", web::get().to(handlers::crime_counts))
        .route("/crime-details", web::get().to(handlers::crime_data))
        .route("/upload-data", web::post().to(handlers::upload_data))
        .route("/analyze", web::post().to(handlers::analyze));
}

/// Starts the crime atlas API server.
///
/// Loads the dataset from `CRIME_DATA_PATH`, builds the completion client
/// from the environment, and binds to `BIND_ADDR:PORT` (default
/// `127.0.0.1:8080`). This is a regular async function — the caller
/// provides the runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the upload directory cannot be
/// created, or the HTTP server fails to bind or encounters a runtime
/// error.
///
/// # Panics
///
/// Panics if the startup dataset is missing or malformed.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let data_path =
        std::env::var("CRIME_DATA_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_owned());
    log::info!("Loading crime dataset from {data_path}...");
    let dataset = Dataset::load(&data_path).expect("Failed to load crime dataset");
    log::info!("Loaded {} records", dataset.len());

    let upload_dir = PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "data".to_owned()));
    std::fs::create_dir_all(&upload_dir)?;

    let state = web::Data::new(AppState {
        store: Arc::new(DatasetStore::new(dataset)),
        ai: Arc::new(CompletionClient::from_env()),
        upload_dir,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            // Serve the landing page and map assets
            .service(Files::new("/", "static").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
