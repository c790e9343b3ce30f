use http::header::{ACCEPT, AUTHORIZATION};
use reqwest::blocking::Client as HttpClient;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};
use crate::secrets::{Credentials, TokenPair};
use crate::signer::Signer;
use crate::store::TokenStore;
use crate::token_reader::{read_oauth_token, TokenResponse};
use crate::{OAUTH_CALLBACK_KEY, REQUEST_TOKEN_KEY};

/// Default API root.
pub const DEFAULT_API_ROOT: &str = "https://api.schoology.com/v1";
/// Default domain root; hosts the consent page and doubles as the callback.
pub const DEFAULT_DOMAIN_ROOT: &str = "https://www.schoology.com";

/// Where a three-legged authorization attempt currently stands.
///
/// The flow is linear and not re-entrant: request-token acquisition, then
/// browser-based consent (the one suspension point, owned by the caller),
/// then the access-token exchange. `AccessTokenIssued` and `Denied` are
/// terminal; a denied flow restarts from `Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationState {
    Unauthenticated,
    RequestTokenIssued,
    AwaitingUserConsent,
    AccessTokenIssued,
    Denied,
}

/// Credential and token manager.
///
/// Owns the consumer credentials and whatever token pairs exist, signs
/// every outgoing request, and drives the three-legged flow. Two-legged
/// clients (the default) skip the flow entirely: non-empty consumer
/// credentials count as authorized, and a bad pair only surfaces on the
/// first real API call.
#[derive(Debug)]
pub struct Auth {
    credentials: Credentials,
    api_root: String,
    domain_root: String,
    three_legged: bool,
    request_token: Option<TokenPair>,
    access_token: Option<TokenPair>,
    state: AuthorizationState,
    store: Option<TokenStore>,
    user: Option<String>,
    http: HttpClient,
}

impl Auth {
    /// Constructs a two-legged `Auth` against the default endpoints.
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Auth {
            credentials: Credentials::new(consumer_key, consumer_secret),
            api_root: DEFAULT_API_ROOT.to_string(),
            domain_root: DEFAULT_DOMAIN_ROOT.to_string(),
            three_legged: false,
            request_token: None,
            access_token: None,
            state: AuthorizationState::Unauthenticated,
            store: None,
            user: None,
            http: HttpClient::new(),
        }
    }

    /// Switch to the three-legged flow: per-user consent and tokens.
    pub fn three_legged(mut self) -> Self {
        self.three_legged = true;
        self
    }

    /// Replace the consent/callback domain, e.g. a district's own domain.
    pub fn domain<T>(mut self, domain: T) -> Self
    where
        T: Into<String>,
    {
        self.domain_root = domain.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the API root.
    pub fn api_root<T>(mut self, api_root: T) -> Self
    where
        T: Into<String>,
    {
        self.api_root = api_root.into().trim_end_matches('/').to_string();
        self
    }

    /// Seed an existing request pair, e.g. to resume a flow started in a
    /// previous run.
    pub fn request_token(mut self, pair: TokenPair) -> Self {
        self.request_token = Some(pair);
        self.state = AuthorizationState::RequestTokenIssued;
        self
    }

    /// Seed an existing access pair.
    pub fn access_token(mut self, pair: TokenPair) -> Self {
        self.access_token = Some(pair);
        self.state = AuthorizationState::AccessTokenIssued;
        self
    }

    /// Attach a token store keyed by `user`; pairs persisted in earlier
    /// runs are loaded immediately.
    pub fn with_store<T>(mut self, store: TokenStore, user: T) -> Result<Self>
    where
        T: Into<String>,
    {
        let user = user.into();
        if self.access_token.is_none() {
            if let Some(pair) = store.access_token(&user)? {
                trace!(user = %user, "loaded persisted access token");
                self.access_token = Some(pair);
                self.state = AuthorizationState::AccessTokenIssued;
            }
        }
        if self.access_token.is_none() && self.request_token.is_none() {
            if let Some(pair) = store.request_token()? {
                trace!("loaded persisted request token");
                self.request_token = Some(pair);
                self.state = AuthorizationState::RequestTokenIssued;
            }
        }
        self.store = Some(store);
        self.user = Some(user);
        Ok(self)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn access_token_pair(&self) -> Option<&TokenPair> {
        self.access_token.as_ref()
    }

    pub fn request_token_pair(&self) -> Option<&TokenPair> {
        self.request_token.as_ref()
    }

    pub fn is_three_legged(&self) -> bool {
        self.three_legged
    }

    /// Two-legged clients report `AccessTokenIssued` as soon as credentials
    /// are complete; they never enter the state machine.
    pub fn state(&self) -> AuthorizationState {
        if self.three_legged {
            self.state
        } else if self.credentials.is_complete() {
            AuthorizationState::AccessTokenIssued
        } else {
            AuthorizationState::Unauthenticated
        }
    }

    /// Whether authenticated calls may be signed and sent.
    ///
    /// Two-legged: both consumer fields non-empty. Three-legged: a complete
    /// access pair is held.
    pub fn is_authorized(&self) -> bool {
        if self.three_legged {
            self.access_token
                .as_ref()
                .map(|pair| pair.is_complete())
                .unwrap_or(false)
        } else {
            self.credentials.is_complete()
        }
    }

    /// The `Authorization` header for the current token state. A fresh
    /// nonce and timestamp go into every call; the signature itself only
    /// depends on the secrets.
    pub fn authorization_header(&self) -> String {
        Signer::new(&self.credentials, self.access_token.as_ref()).authorization_header()
    }

    /// Issues a lightweight signed GET against the current-user endpoint to
    /// check that the provider still accepts the held token.
    ///
    /// A client-error status means the token was revoked: the access pair
    /// is dropped, erased from the store, and `Ok(false)` says the caller
    /// must re-run the flow. Transport failures propagate untouched.
    pub fn probe_and_refresh(&mut self) -> Result<bool> {
        if !self.is_authorized() {
            return Err(Error::NotAuthorized);
        }
        let url = format!("{}/users/me", self.api_root);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.authorization_header())
            .header(ACCEPT, "application/json")
            .send()?;
        let status = response.status();
        if status.as_u16() >= 400 {
            debug!(status = status.as_u16(), "access token rejected by provider");
            self.clear_access_token()?;
            return Ok(false);
        }
        trace!("access token accepted by provider");
        Ok(true)
    }

    /// Drops the held access pair and erases any persisted copy.
    fn clear_access_token(&mut self) -> Result<()> {
        self.access_token = None;
        if let (Some(store), Some(user)) = (&self.store, &self.user) {
            store.clear_access_token(user)?;
        }
        Ok(())
    }

    /// Starts (or short-circuits) the three-legged flow.
    ///
    /// Returns `Ok(None)` when no consent step is needed: always for
    /// two-legged clients, and for three-legged clients whose held token
    /// still probes as valid. A revoked token is cleared and the flow
    /// restarts from scratch within this same call; there is no further
    /// automatic retry beyond that single restart.
    ///
    /// Otherwise fetches a request token (consumer-signed only) and returns
    /// the consent-page URL to put in front of the user. Waiting for the
    /// user is entirely the caller's job; resume with
    /// [`complete_authorization`](Auth::complete_authorization).
    pub fn request_authorization(&mut self, callback: Option<&str>) -> Result<Option<String>> {
        let callback = callback.unwrap_or(&self.domain_root).to_string();
        if self.is_authorized() {
            if !self.three_legged {
                return Ok(None);
            }
            if self.probe_and_refresh()? {
                return Ok(None);
            }
        }
        if self.request_token.is_none() {
            let url = format!("{}/oauth/request_token", self.api_root);
            let fetched = match self.fetch_token(&url, None) {
                Ok(fetched) => fetched,
                Err(err) => {
                    if let Error::AuthorizationDenied { .. } = err {
                        self.state = AuthorizationState::Denied;
                    }
                    return Err(err);
                }
            };
            let pair = TokenPair::new(fetched.oauth_token, fetched.oauth_token_secret);
            if let Some(store) = &self.store {
                store.put_request_token(&pair)?;
            }
            debug!("request token issued");
            self.request_token = Some(pair);
            self.state = AuthorizationState::RequestTokenIssued;
        }
        let url = self.authorize_url(&callback)?;
        self.state = AuthorizationState::AwaitingUserConsent;
        Ok(Some(url))
    }

    /// Exchanges the request pair for an access pair once the user has
    /// responded to the consent page.
    ///
    /// The request pair is consumed whatever the outcome. Provider
    /// rejection ends the flow in `Denied` and returns `Ok(false)`;
    /// transport faults and malformed 2xx bodies are errors.
    pub fn complete_authorization(&mut self) -> Result<bool> {
        if !self.three_legged || self.is_authorized() {
            return Ok(true);
        }
        let request_pair = self.request_token.take().ok_or(Error::NotAuthorized)?;
        if let Some(store) = &self.store {
            store.clear_request_token()?;
        }
        let url = format!("{}/oauth/access_token", self.api_root);
        let fetched = match self.fetch_token(&url, Some(&request_pair)) {
            Ok(fetched) => fetched,
            Err(Error::AuthorizationDenied { status, .. }) => {
                debug!(status = status.as_u16(), "access token exchange denied");
                self.state = AuthorizationState::Denied;
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        let pair = TokenPair::new(fetched.oauth_token, fetched.oauth_token_secret);
        if !pair.is_complete() {
            self.state = AuthorizationState::Denied;
            return Ok(false);
        }
        if let (Some(store), Some(user)) = (&self.store, &self.user) {
            store.put_access_token(user, &pair)?;
        }
        debug!("access token issued");
        self.access_token = Some(pair);
        self.state = AuthorizationState::AccessTokenIssued;
        Ok(true)
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path)
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Consent-page URL for the held request token. The callback lands in
    /// the query string fully percent-encoded.
    fn authorize_url(&self, callback: &str) -> Result<String> {
        let pair = self.request_token.as_ref().ok_or(Error::NotAuthorized)?;
        let mut url = Url::parse(&format!("{}/oauth/authorize", self.domain_root))?;
        url.query_pairs_mut()
            .append_pair(REQUEST_TOKEN_KEY, pair.token())
            .append_pair(OAUTH_CALLBACK_KEY, callback);
        Ok(url.to_string())
    }

    /// GET a token endpoint and destructure the form-encoded pair from it.
    /// Request-token calls sign with consumer credentials alone; the
    /// access-token exchange passes the request pair as resource owner.
    fn fetch_token(&self, url: &str, token: Option<&TokenPair>) -> Result<TokenResponse> {
        let header = Signer::new(&self.credentials, token).authorization_header();
        let response = self.http.get(url).header(AUTHORIZATION, header).send()?;
        let status = response.status();
        let body = response.text()?;
        if status.as_u16() >= 400 {
            return Err(Error::AuthorizationDenied { status, body });
        }
        Ok(read_oauth_token(&body)?)
    }
}
