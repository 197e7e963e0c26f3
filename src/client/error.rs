use crate::auth::dto::ErrorBody;

pub const NETWORK_MESSAGE: &str =
    "Unable to connect to server. Please check your internet connection.";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (refused, reset, timed out).
    #[error("{}", NETWORK_MESSAGE)]
    Network(#[source] reqwest::Error),

    /// The server answered with a failure envelope.
    #[error("{}", join_errors(.message, .errors))]
    Server {
        status: u16,
        message: String,
        errors: Vec<String>,
    },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Could not store session token: {0}")]
    Storage(#[source] anyhow::Error),

    #[error("Unexpected response from server: {0}")]
    Unexpected(String),
}

fn join_errors(message: &str, errors: &[String]) -> String {
    if errors.is_empty() {
        message.to_string()
    } else {
        format!("{message}: {}", errors.join(", "))
    }
}

impl ClientError {
    /// Builds the error for a non-2xx response from its status and raw body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(b) => ClientError::Server {
                status,
                message: b.message,
                errors: b.errors,
            },
            Err(_) if status == 400 => ClientError::Server {
                status,
                message: "Bad Request: Please check your input data.".into(),
                errors: Vec::new(),
            },
            Err(_) => ClientError::Server {
                status,
                message: format!("Error Code: {status}"),
                errors: Vec::new(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
