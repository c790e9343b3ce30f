use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::secrets::{Credentials, TokenPair};

/// Realm literal the provider expects on every request.
pub const REALM: &str = "Schoology API";

const NONCE_DIGITS: usize = 8;

/// Overrides for the request-scoped header fields.
///
/// Nonce and timestamp are generated fresh for every header unless pinned
/// here; pinning keeps the output deterministic in tests.
#[derive(Debug, Clone, Default)]
pub struct HeaderParameters<'a> {
    nonce: Option<Cow<'a, str>>,
    timestamp: Option<u64>,
    realm: Option<Cow<'a, str>>,
}

impl<'a> HeaderParameters<'a> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Pin the oauth_nonce value.
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        HeaderParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// Pin the oauth_timestamp value.
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        HeaderParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// Replace the realm literal.
    pub fn realm<T>(self, realm: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        HeaderParameters {
            realm: Some(realm.into()),
            ..self
        }
    }
}

/// Builds the `Authorization` header for one outgoing request.
///
/// The provider uses the PLAINTEXT method: no digest is computed, the
/// "signature" is the two secrets joined by an encoded ampersand, and
/// confidentiality rides entirely on HTTPS.
#[derive(Debug, Clone)]
pub struct Signer<'a> {
    credentials: &'a Credentials,
    token: Option<&'a TokenPair>,
    parameters: HeaderParameters<'a>,
}

impl<'a> Signer<'a> {
    pub fn new(credentials: &'a Credentials, token: Option<&'a TokenPair>) -> Self {
        Signer {
            credentials,
            token,
            parameters: HeaderParameters::new(),
        }
    }

    pub fn with_parameters(
        credentials: &'a Credentials,
        token: Option<&'a TokenPair>,
        parameters: HeaderParameters<'a>,
    ) -> Self {
        Signer {
            credentials,
            token,
            parameters,
        }
    }

    /// The PLAINTEXT signature: a pure function of the secrets, independent
    /// of nonce and timestamp. The `%26` separator is part of the literal
    /// header value.
    pub fn signature(&self) -> String {
        format!(
            "{}%26{}",
            self.credentials.consumer_secret(),
            self.token.map(TokenPair::secret).unwrap_or_default()
        )
    }

    /// Renders the full header. Field order is fixed; the provider's parser
    /// is strict about it.
    pub fn authorization_header(&self) -> String {
        let nonce = match self.parameters.nonce.as_deref() {
            Some(nonce) => nonce.to_string(),
            None => generate_nonce(),
        };
        let timestamp = self.parameters.timestamp.unwrap_or_else(unix_timestamp);
        let realm = self.parameters.realm.as_deref().unwrap_or(REALM);
        let token = self.token.map(TokenPair::token).unwrap_or_default();
        format!(
            "OAuth realm=\"{realm}\",\
             oauth_consumer_key=\"{key}\",\
             oauth_token=\"{token}\",\
             oauth_nonce=\"{nonce}\",\
             oauth_timestamp=\"{timestamp}\",\
             oauth_signature_method=\"PLAINTEXT\",\
             oauth_version=\"1.0\",\
             oauth_signature=\"{signature}\"",
            realm = realm,
            key = self.credentials.consumer_key(),
            token = token,
            nonce = nonce,
            timestamp = timestamp,
            signature = self.signature(),
        )
    }
}

fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..NONCE_DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0u8..10)))
        .collect()
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44")
    }

    #[test]
    fn signature_joins_secrets_with_encoded_ampersand() {
        let credentials = credentials();
        let token = TokenPair::new("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let signer = Signer::new(&credentials, Some(&token));
        assert_eq!(signer.signature(), "kd94hf93k423kf44%26pfkkdhi9sl3r4s00");
    }

    #[test]
    fn signature_without_token_keeps_empty_second_half() {
        let credentials = credentials();
        let signer = Signer::new(&credentials, None);
        assert_eq!(signer.signature(), "kd94hf93k423kf44%26");
    }

    #[test]
    fn signature_ignores_nonce_and_timestamp() {
        let credentials = credentials();
        let pinned = Signer::with_parameters(
            &credentials,
            None,
            HeaderParameters::new().nonce("00000000").timestamp(1u64),
        );
        let fresh = Signer::new(&credentials, None);
        assert_eq!(pinned.signature(), fresh.signature());
    }

    #[test]
    fn header_renders_every_field_in_fixed_order() {
        let credentials = credentials();
        let token = TokenPair::new("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let signer = Signer::with_parameters(
            &credentials,
            Some(&token),
            HeaderParameters::new()
                .nonce("65039213")
                .timestamp(137_131_200u64),
        );
        assert_eq!(
            signer.authorization_header(),
            "OAuth realm=\"Schoology API\",\
             oauth_consumer_key=\"dpf43f3p2l4k3l03\",\
             oauth_token=\"nnch734d00sl2jdk\",\
             oauth_nonce=\"65039213\",\
             oauth_timestamp=\"137131200\",\
             oauth_signature_method=\"PLAINTEXT\",\
             oauth_version=\"1.0\",\
             oauth_signature=\"kd94hf93k423kf44%26pfkkdhi9sl3r4s00\""
        );
    }

    #[test]
    fn header_without_token_leaves_token_fields_empty() {
        let credentials = credentials();
        let signer = Signer::with_parameters(
            &credentials,
            None,
            HeaderParameters::new().nonce("12345678").timestamp(2u64),
        );
        let header = signer.authorization_header();
        assert!(header.contains("oauth_token=\"\""));
        assert!(header.contains("oauth_signature=\"kd94hf93k423kf44%26\""));
    }

    #[test]
    fn generated_nonce_is_eight_decimal_digits() {
        for _ in 0..32 {
            let nonce = generate_nonce();
            assert_eq!(nonce.len(), NONCE_DIGITS);
            assert!(nonce.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
