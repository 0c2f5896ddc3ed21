//! Unified error type.

/// The error type returned by kiln's fallible operations.
///
/// Application-level failures (401, 403, 404, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// programming and infrastructure failures: a bad route table, an unknown
/// route name, a token that cannot be minted, a socket that cannot be bound.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Reverse-resolving a name that was never registered.
    #[error("route `{0}` not found")]
    RouteNotFound(String),

    #[error("route name `{0}` is already registered")]
    DuplicateRouteName(String),

    #[error("invalid route `{path}`: {source}")]
    InvalidRoute {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("missing path parameter `{0}`")]
    MissingParam(String),

    #[error("path parameter `{name}` has invalid value `{value}`")]
    InvalidParam { name: String, value: String },

    #[error("token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// A middleware policy failed to evaluate (as opposed to rejecting).
    #[error("middleware `{name}` failed: {message}")]
    Middleware { name: String, message: String },

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),
}

impl Error {
    /// Shorthand for policies reporting an evaluation failure.
    pub fn middleware(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Middleware { name: name.into(), message: message.into() }
    }
}
