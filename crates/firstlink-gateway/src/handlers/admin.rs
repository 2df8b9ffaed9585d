use crate::error::{AppError, Result};
use crate::model::{CreateRedirectResponse, DeleteRedirectResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use firstlink_core::{CreateRedirect, RedirectId, RedirectRecord, RedirectSummary};

const DEFAULT_PROTO: &str = "http";
const DEFAULT_HOST: &str = "localhost:3000";

pub async fn create_redirect_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<CreateRedirect>, JsonRejection>,
) -> Result<Json<CreateRedirectResponse>> {
    let Json(params) = payload?;
    let record = state.admin().create(params).await?;

    let base_url = match state.public_base_url() {
        Some(base_url) => base_url.to_string(),
        None => base_url_from_headers(&headers),
    };

    Ok(Json(CreateRedirectResponse {
        link: record.slug.to_url(&base_url),
        slug: record.slug.to_string(),
    }))
}

pub async fn list_redirects_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<RedirectSummary>>> {
    Ok(Json(state.admin().list().await?))
}

pub async fn get_redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RedirectRecord>> {
    let record = state.admin().get(parse_id(&id)?).await?;
    Ok(Json(record))
}

pub async fn delete_redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteRedirectResponse>> {
    let record = state.admin().delete(parse_id(&id)?).await?;
    Ok(Json(DeleteRedirectResponse::deleted(record.slug.as_str())))
}

fn parse_id(id: &str) -> Result<RedirectId> {
    id.parse().map_err(|_| AppError::RedirectNotFound)
}

/// `{proto}://{host}` from `x-forwarded-proto` and `host`.
fn base_url_from_headers(headers: &HeaderMap) -> String {
    let header = |name: &str, default: &'static str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    format!(
        "{}://{}",
        header("x-forwarded-proto", DEFAULT_PROTO),
        header("host", DEFAULT_HOST)
    )
}
