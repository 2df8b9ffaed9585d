use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRedirectResponse {
    pub slug: String,
    /// Full short link, e.g. `https://go.example/launch`.
    pub link: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteRedirectResponse {
    pub message: String,
    pub slug: String,
}

impl DeleteRedirectResponse {
    pub fn deleted(slug: impl Into<String>) -> Self {
        Self {
            message: "Redirect deleted successfully".to_string(),
            slug: slug.into(),
        }
    }
}

/// Body of every non-2xx JSON response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
