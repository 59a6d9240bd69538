use ::std::fmt::{Display, Formatter};

use ::anyhow::anyhow;
use ::serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, RuregError>;

/// Kinds of failure shared by every rureg service.
/// The variant name is what travels on the wire, both in error frames and in
/// the gateway's HTTP error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorType {
    /// The service cannot start with the given configuration, e.g. an empty node pool.
    ConfigurationError,
    /// A client supplied vector could not be parsed.
    ParseError,
    /// Dialing, writing to or reading from a node failed.
    UpstreamConnectionError,
    /// The node has not finished training yet.
    ModelNotTrained,
    /// A trained model is published only once.
    ModelAlreadyTrained,
    /// The training pairs cannot determine a slope, e.g. all x values are identical.
    DegenerateTrainingData,
    /// A frame is not valid JSON of the expected shape.
    MalformedFrame,
    /// The training dataset could not be fetched or one of its rows is not numeric.
    FailToLoadDataset,
    /// The config file is missing or does not match the expected shape.
    FailToLoadConfig,
    /// Binding the listener or running a background task failed.
    FailToStartServer,
    /// Reading from or writing to the local terminal failed.
    TerminalError,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let description = match self {
            Self::ConfigurationError => "Configuration error",
            Self::ParseError => "Parse error",
            Self::UpstreamConnectionError => "Upstream connection error",
            Self::ModelNotTrained => "Model not trained",
            Self::ModelAlreadyTrained => "Model already trained",
            Self::DegenerateTrainingData => "Degenerate training data",
            Self::MalformedFrame => "Malformed frame",
            Self::FailToLoadDataset => "Fail to load dataset",
            Self::FailToLoadConfig => "Fail to load config",
            Self::FailToStartServer => "Fail to start server",
            Self::TerminalError => "Terminal error",
        };
        write!(f, "{}", description)
    }
}

#[derive(Debug)]
pub struct RuregError {
    error_type: ErrorType,
    error: anyhow::Error,
}

macro_rules! error_constructor {
    ($name: ident, $error_type: expr) => {
        pub fn $name<E: Into<anyhow::Error>>(error: E) -> Self {
            Self::new($error_type, error)
        }
    };
}

impl RuregError {
    pub fn new<E: Into<anyhow::Error>>(error_type: ErrorType, error: E) -> Self {
        Self {
            error_type,
            error: error.into(),
        }
    }

    pub fn get_error_type(&self) -> ErrorType {
        self.error_type
    }

    /// The message without the kind prefix.
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    error_constructor!(configuration_error, ErrorType::ConfigurationError);
    error_constructor!(parse_error, ErrorType::ParseError);
    error_constructor!(upstream_connection_error, ErrorType::UpstreamConnectionError);
    error_constructor!(model_not_trained, ErrorType::ModelNotTrained);
    error_constructor!(model_already_trained, ErrorType::ModelAlreadyTrained);
    error_constructor!(degenerate_training_data, ErrorType::DegenerateTrainingData);
    error_constructor!(malformed_frame, ErrorType::MalformedFrame);
    error_constructor!(fail_to_load_dataset, ErrorType::FailToLoadDataset);
    error_constructor!(fail_to_load_config, ErrorType::FailToLoadConfig);
    error_constructor!(fail_to_start_server, ErrorType::FailToStartServer);
    error_constructor!(terminal_error, ErrorType::TerminalError);
}

impl Display for RuregError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_type, self.error)
    }
}

impl std::error::Error for RuregError {}

impl<T> From<RuregError> for Result<T> {
    fn from(val: RuregError) -> Self {
        Result::Err(val)
    }
}

macro_rules! convert_to_rureg_error {
    ($err_ty: ty, $constructor: expr) => {
        impl From<$err_ty> for RuregError {
            fn from(value: $err_ty) -> Self {
                $constructor(value)
            }
        }
    };
}

convert_to_rureg_error!(std::io::Error, RuregError::upstream_connection_error);
convert_to_rureg_error!(serde_json::Error, RuregError::malformed_frame);

/// Body of every non-success HTTP response of the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorBody {
    pub error: ErrorType,
    pub message: String,
}

impl From<&RuregError> for ErrorBody {
    fn from(value: &RuregError) -> Self {
        Self {
            error: value.get_error_type(),
            message: value.message(),
        }
    }
}

impl From<ErrorBody> for RuregError {
    fn from(value: ErrorBody) -> Self {
        RuregError::new(value.error, anyhow!(value.message))
    }
}
