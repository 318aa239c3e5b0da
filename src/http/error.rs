use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::http::handlers::ErrorResponse;
use crate::{ErrorKind, RecapError};

/// Client input errors are 400; everything else, a missing summary included,
/// is reported as a server error.
pub fn status_for(error: &RecapError) -> StatusCode {
    match error.kind() {
        ErrorKind::ClientInput => StatusCode::BAD_REQUEST,
        ErrorKind::Upstream | ErrorKind::NotFound => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for RecapError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error_message: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        let errors = [
            RecapError::UnsupportedLanguagePair {
                original: "xx-XX".to_string(),
                translation: "yy".to_string(),
            },
            RecapError::InvalidAudioType("podcast".to_string()),
            RecapError::InvalidRequest("missing field".to_string()),
        ];
        for e in &errors {
            assert_eq!(status_for(e), StatusCode::BAD_REQUEST, "{e}");
        }
    }

    #[test]
    fn upstream_and_missing_summary_map_to_server_error() {
        let errors = [
            RecapError::Inference("timeout".to_string()),
            RecapError::Translation("down".to_string()),
            RecapError::Storage("disk".to_string()),
            RecapError::ModelCatalog("region".to_string()),
            RecapError::SummaryNotFound("a1".to_string()),
        ];
        for e in &errors {
            assert_eq!(status_for(e), StatusCode::INTERNAL_SERVER_ERROR, "{e}");
        }
    }
}
