use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Network failure (`status` is `None`) or non-2xx HTTP response.
    Transport {
        status: Option<u16>,
        message: String,
    },
    /// Response body is not JSON or lacks the expected fields.
    Protocol(String),
    /// Credentials rejected by the vendor.
    Authentication(String),
    /// Plant index cannot be resolved, or the client cannot be built.
    Configuration(String),
}

impl Error {
    /// Errors that will not go away until the user changes the settings.
    pub fn requires_reconfiguration(&self) -> bool {
        matches!(self, Error::Authentication(_) | Error::Configuration(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport {
                status: Some(status),
                message,
            } => write!(f, "Growatt API responded {}: {}", status, message),
            Error::Transport {
                status: None,
                message,
            } => write!(f, "Growatt API not reachable: {}", message),
            Error::Protocol(message) => write!(f, "Unexpected Growatt API response: {}", message),
            Error::Authentication(message) => {
                write!(f, "Could not login to Growatt API: {}", message)
            }
            Error::Configuration(message) => write!(f, "Invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for Error {}

/// Map failure to reach the API or read its body to Error
impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Transport {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}
