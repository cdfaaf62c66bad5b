use std::string::FromUtf8Error;

use crate::state_model::ValidationError;

/// Broad classification of an [`Error`], used when reporting failures to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied something malformed (address, payload, scene name).
    InvalidInput,
    /// The bulb could not be reached or replied with garbage.
    DeviceUnreachable,
    /// A scene id or name has no entry in the catalog.
    NotFound,
}

/// All error types that can occur when validating requests or talking to bulbs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0}")]
    JsonLoad(serde_json::Error),

    /// A network socket operation failed while communicating with a bulb.
    #[error("socket {action} error: {err}")]
    Socket { action: String, err: std::io::Error },

    /// The UDP response from a bulb contained invalid UTF-8.
    #[error("utf8 decoding error: {0}")]
    Utf8Decode(FromUtf8Error),

    /// The bulb answered with an `error` object instead of a result.
    #[error("bulb rejected {method}: {message} (code {code})")]
    DeviceReply {
        method: String,
        code: i64,
        message: String,
    },

    /// Attempted to send a [`crate::Payload`] with no attributes set.
    #[error("invalid payload; no attributes set")]
    NoAttribute,

    /// The bulb address is not a dotted-quad IPv4 address.
    #[error("Invalid IP address. Please provide a valid IP address.")]
    InvalidAddress(String),

    /// The discovery broadcast address is not a dotted-quad IPv4 address.
    #[error("Invalid broadcast space. Please provide a valid IP address.")]
    InvalidBroadcast(String),

    /// The requested light state failed validation.
    #[error("Invalid state structure: {0}")]
    InvalidState(#[from] ValidationError),

    #[error("Scene name is required.")]
    SceneNameRequired,

    #[error("Invalid scene name")]
    UnknownSceneName(String),

    /// The address given when asking for a bulb's scene is not usable.
    #[error("Invalid IP address or bulb not found.")]
    UnknownBulb(String),

    /// The bulb could not be read while looking up its scene.
    #[error("Bulb was either not found or is not connected.")]
    NotConnected(#[source] Box<Error>),

    /// The bulb reports a scene id the catalog does not know (including 0, no scene).
    #[error("No scene with id {0}")]
    SceneNotFound(i64),

    /// A host call was missing a required argument.
    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::JsonDump(_)
            | Error::JsonLoad(_)
            | Error::Socket { .. }
            | Error::Utf8Decode(_)
            | Error::DeviceReply { .. }
            | Error::NotConnected(_) => ErrorKind::DeviceUnreachable,
            Error::NoAttribute
            | Error::InvalidAddress(_)
            | Error::InvalidBroadcast(_)
            | Error::UnknownBulb(_)
            | Error::InvalidState(_)
            | Error::SceneNameRequired
            | Error::UnknownSceneName(_)
            | Error::MissingArgument(_) => ErrorKind::InvalidInput,
            Error::SceneNotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
