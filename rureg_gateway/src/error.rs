use ::core::fmt::Display;

use ::axum::{
    response::{IntoResponse, Response},
    Json,
};
use ::http::StatusCode;
use ::rureg_common::error::{ErrorBody, ErrorType::*, RuregError};

/// [GatewayError] is a wrapper for [RuregError] to convert it into Axum response
#[derive(Debug)]
pub struct GatewayError(RuregError);

impl GatewayError {
    fn get_status_code(&self) -> StatusCode {
        match self.0.get_error_type() {
            ParseError => StatusCode::BAD_REQUEST,
            UpstreamConnectionError => StatusCode::BAD_GATEWAY,
            MalformedFrame => StatusCode::BAD_GATEWAY,
            ModelNotTrained => StatusCode::SERVICE_UNAVAILABLE,
            ConfigurationError => StatusCode::INTERNAL_SERVER_ERROR,
            ModelAlreadyTrained => StatusCode::INTERNAL_SERVER_ERROR,
            DegenerateTrainingData => StatusCode::INTERNAL_SERVER_ERROR,
            FailToLoadDataset => StatusCode::INTERNAL_SERVER_ERROR,
            FailToLoadConfig => StatusCode::INTERNAL_SERVER_ERROR,
            FailToStartServer => StatusCode::INTERNAL_SERVER_ERROR,
            TerminalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RuregError> for GatewayError {
    fn from(error: RuregError) -> Self {
        Self(error)
    }
}

/// [GatewayError] displays in the same way as [RuregError]
impl Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.get_status_code();
        (status, Json(ErrorBody::from(&self.0))).into_response()
    }
}
