use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{TokenReaderError, TokenReaderResult};
use crate::{OAUTH_TOKEN_KEY, OAUTH_TOKEN_SECRET_KEY};

/// A parsed token-endpoint response.
///
/// The OAuth endpoints answer with `application/x-www-form-urlencoded`
/// bodies, not JSON.
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents, e.g. `oauth_callback_confirmed`.
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

/// Destructures a form-encoded token body, percent-decoding the values.
///
/// A 2xx body missing either token key indicates a provider contract
/// change and is a hard failure; the body is carried verbatim for
/// diagnosis.
pub(crate) fn read_oauth_token(text: &str) -> TokenReaderResult<TokenResponse> {
    let mut fields: HashMap<String, String> = url::form_urlencoded::parse(text.trim().as_bytes())
        .into_owned()
        .collect();
    let oauth_token = fields.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = fields.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(token), Some(secret)) => Ok(TokenResponse {
            oauth_token: token,
            oauth_token_secret: secret,
            remain: fields,
        }),
        (None, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_KEY,
            text.to_string(),
        )),
        (_, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text.to_string(),
        )),
    }
}
