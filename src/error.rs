use std::path::PathBuf;

use http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Crate-level error.
///
/// Authorization rejections and transport faults are separate variants so a
/// caller can tell "restart the flow" apart from "the network is down".
#[derive(Error, Debug)]
pub enum Error {
    /// The provider rejected a token request or exchange.
    #[error("authorization denied : token request failed with code {status}, response was '{body}'")]
    AuthorizationDenied { status: StatusCode, body: String },
    /// A 2xx token response that could not be parsed.
    #[error("malformed token response : {0}")]
    MalformedTokenResponse(#[from] TokenReaderError),
    /// An authenticated call was attempted while `is_authorized()` is false.
    #[error("not authorized : request authorization and complete the flow first")]
    NotAuthorized,
    /// An authenticated API call came back with an error status.
    #[error("api request failed with code {status} : {body}")]
    Api { status: StatusCode, body: String },
    /// A 2xx API response whose body was not decodable JSON.
    #[error("undecodable response from {url} : {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("token store failed : {0}")]
    Store(#[from] StoreError),
    #[error("invalid url : {0}")]
    Url(#[from] url::ParseError),
    /// Network-level failure, surfaced as-is from the HTTP layer.
    #[error("request failed : {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Error, Debug, Clone)]
pub enum TokenReaderError {
    #[error("response has malformed format: not found {0} in '{1}'")]
    TokenKeyNotFound(&'static str, String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not read or write {path} : {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path} : {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
