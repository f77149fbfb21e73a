//! HTTP handler functions for the crime atlas API.

use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_web::{HttpResponse, web};
use crime_atlas_dataset::Dataset;
use serde::Deserialize;

use crate::AppState;

/// `GET /crime-data` and `GET /crime-details`
///
/// Returns every record of the live dataset as a JSON array.
pub async fn crime_data(state: web::Data<AppState>) -> HttpResponse {
    let dataset = state.store.current();
    HttpResponse::Ok().json(dataset.records())
}

/// `GET /crime-summary`
///
/// Returns incident counts grouped by `(city, crime_type)`.
pub async fn crime_summary(state: web::Data<AppState>) -> HttpResponse {
    let dataset = state.store.current();
    HttpResponse::Ok().json(crime_atlas_analytics::summarize(&dataset))
}

/// `GET /crime-counts`
///
/// Returns incident counts grouped by `(city, latitude, longitude)` for
/// map count markers.
pub async fn crime_counts(state: web::Data<AppState>) -> HttpResponse {
    let dataset = state.store.current();
    HttpResponse::Ok().json(crime_atlas_analytics::count_by_location(&dataset))
}

/// Multipart payload for `POST /upload-data`.
#[derive(MultipartForm)]
pub struct UploadForm {
    /// The replacement CSV file.
    pub file: Option<TempFile>,
}

/// `POST /upload-data`
///
/// Persists the uploaded CSV under the upload directory, reparses it, and
/// swaps it in as the live dataset.
pub async fn upload_data(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> HttpResponse {
    let Some(file) = form.file else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "File not uploaded."
        }));
    };

    // Filename comes from the client verbatim.
    let file_name = file
        .file_name
        .clone()
        .unwrap_or_else(|| "upload.csv".to_owned());
    let dest = state.upload_dir.join(&file_name);

    if let Err(e) = std::fs::copy(file.file.path(), &dest) {
        log::error!("Failed to persist uploaded file to {}: {e}", dest.display());
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Failed to save uploaded file"
        }));
    }

    match Dataset::load(&dest) {
        Ok(dataset) => {
            log::info!(
                "Replaced dataset with {} records from {}",
                dataset.len(),
                dest.display()
            );
            state.store.replace(dataset);
            HttpResponse::Ok().json(serde_json::json!({
                "message": "File uploaded successfully."
            }))
        }
        Err(e) => {
            log::error!("Uploaded file {} did not parse: {e}", dest.display());
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to parse uploaded file"
            }))
        }
    }
}

/// JSON body for `POST /analyze`.
#[derive(Deserialize)]
pub struct AnalyzeBody {
    /// Free-text prompt to forward to the completion API.
    pub text: Option<String>,
}

/// `POST /analyze`
///
/// Forwards the prompt to the completion API and returns the provider's
/// JSON response verbatim.
pub async fn analyze(state: web::Data<AppState>, body: web::Json<AnalyzeBody>) -> HttpResponse {
    let Some(text) = body.text.as_deref().filter(|t| !t.is_empty()) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "No text provided"
        }));
    };

    match state.ai.analyze(text).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            log::error!("Completion API call failed: {e}");
            HttpResponse::BadGateway().json(serde_json::json!({
                "error": "Completion API request failed"
            }))
        }
    }
}
