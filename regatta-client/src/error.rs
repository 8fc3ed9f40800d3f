use thiserror::Error;

/// Every way a call into the API or the session store can fail.
///
/// Screens treat all variants the same way: report once, keep prior state.
#[derive(Error, Debug)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("malformed response: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("{0}")]
    Api(String),

    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("user data not found in storage")]
    NotLoggedIn,

    #[error("session storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("session encoding error: {0}")]
    SessionEncoding(#[source] serde_json::Error),
}

impl Error {
    pub fn api(message: impl Into<String>) -> Self {
        Error::Api(message.into())
    }

    /// Short label for the user-facing alert title.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Network(_) => "Network error",
            Error::Parse(_) => "Unexpected response",
            Error::Api(_) => "Error",
            Error::MissingParameter(_) => "Missing information",
            Error::NotLoggedIn => "Not signed in",
            Error::Storage(_) | Error::SessionEncoding(_) => "Storage error",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with [`Error::MissingParameter`] when `value` is blank.
pub(crate) fn require(name: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::MissingParameter(name))
    } else {
        Ok(())
    }
}
