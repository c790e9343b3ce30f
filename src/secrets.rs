/// Application-level consumer credentials, supplied once at construction
/// and immutable for the lifetime of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    consumer_key: String,
    consumer_secret: String,
}

impl Credentials {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Credentials {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.consumer_key.is_empty() && !self.consumer_secret.is_empty()
    }
}

/// An OAuth token and its paired secret.
///
/// The same shape serves both roles in the three-legged flow: the
/// short-lived request token and the long-lived access token. A request
/// pair must not be reused once an exchange succeeded; the flow consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    token: String,
    secret: String,
}

impl TokenPair {
    pub fn new<TKey, TSecret>(token: TKey, secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        TokenPair {
            token: token.into(),
            secret: secret.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.token.is_empty() && !self.secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_complete_only_when_both_fields_set() {
        assert!(Credentials::new("key", "secret").is_complete());
        assert!(!Credentials::new("", "secret").is_complete());
        assert!(!Credentials::new("key", "").is_complete());
        assert!(!Credentials::new("", "").is_complete());
    }

    #[test]
    fn token_pair_complete_only_when_both_fields_set() {
        assert!(TokenPair::new("tok", "sec").is_complete());
        assert!(!TokenPair::new("tok", "").is_complete());
        assert!(!TokenPair::new("", "sec").is_complete());
        assert!(!TokenPair::new("", "").is_complete());
    }
}
