use crate::error::{AppError, Result};
use crate::identity::extract_identity;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use firstlink_core::Slug;
use tracing::{debug, trace};
use url::Url;

/// `GET /{slug}`: answers with a `302 Found` to the chosen destination.
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    // A malformed slug can never have been stored.
    let slug = Slug::new(slug).map_err(|err| {
        trace!(error = %err, "rejected malformed slug");
        AppError::RedirectNotFound
    })?;
    let visitor = extract_identity(&headers);

    let resolution = state.redirector().resolve(&slug, Some(&visitor)).await?;
    debug!(
        slug = %slug,
        visitor = %visitor,
        first_visit = resolution.first_visit,
        "redirecting"
    );

    Ok((
        StatusCode::FOUND,
        [
            (LOCATION, location(&resolution.destination)?),
            (CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
    )
        .into_response())
}

/// Builds the `Location` value, percent-encoding destinations that are not
/// valid header text.
fn location(destination: &str) -> Result<HeaderValue> {
    if let Ok(value) = HeaderValue::from_str(destination) {
        return Ok(value);
    }

    Url::parse(destination)
        .ok()
        .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
        .ok_or_else(|| AppError::Internal(format!("unusable destination: {destination}")))
}
