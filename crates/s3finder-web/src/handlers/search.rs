//! Search form handlers.
//!
//! `GET /` renders the empty form. `POST /` looks the file up and renders
//! either the download link or the form again. Every outcome other than
//! "found" looks the same to the user.

use axum::extract::State;
use axum::response::Html;
use axum::Form;
use serde::Deserialize;
use tracing::{debug, info};

use s3finder_storage::SearchOutcome;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Submitted search form.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Render the empty search form.
pub async fn search_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    state.views.search_form(None)
}

/// Look up the submitted file name.
pub async fn search_file(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> ApiResult<Html<String>> {
    let file_name = form
        .file_name
        .ok_or_else(|| ApiError::bad_request("Missing form field: file_name"))?;

    info!(file_name = %file_name, "Searching for file");

    let outcome = state.finder.search(&file_name).await;
    metrics::record_search(outcome.label());

    match outcome {
        SearchOutcome::Found(url) => state.views.result(&file_name, &url),
        other => {
            debug!(file_name = %file_name, outcome = other.label(), "No download link produced");
            state.views.search_form(Some(&file_name))
        }
    }
}
