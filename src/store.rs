use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::secrets::TokenPair;

/// On-disk layout: top-level request-token fields record an exchange in
/// flight, per-user entries hold the long-lived access pairs.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_token_secret: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    users: BTreeMap<String, StoredAccess>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredAccess {
    access_token: String,
    access_token_secret: String,
}

/// File-backed token persistence for three-legged mode.
///
/// The whole file is read and rewritten on every change. One writer at a
/// time: concurrent processes sharing a store file will race on the
/// read-modify-write cycle, the same limitation the system it mirrors has.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        TokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The access pair persisted for `user`, if any.
    pub fn access_token(&self, user: &str) -> StoreResult<Option<TokenPair>> {
        let mut file = self.load()?;
        Ok(file
            .users
            .remove(user)
            .map(|access| TokenPair::new(access.access_token, access.access_token_secret)))
    }

    /// Persists the access pair for `user`, replacing whatever the user had.
    /// A user holds at most one pair.
    pub fn put_access_token(&self, user: &str, pair: &TokenPair) -> StoreResult<()> {
        let mut file = self.load()?;
        file.users.insert(
            user.to_string(),
            StoredAccess {
                access_token: pair.token().to_string(),
                access_token_secret: pair.secret().to_string(),
            },
        );
        self.save(&file)?;
        debug!(user = %user, "persisted access token");
        Ok(())
    }

    /// Erases the access pair for `user`. Writes only when an entry existed.
    pub fn clear_access_token(&self, user: &str) -> StoreResult<()> {
        let mut file = self.load()?;
        if file.users.remove(user).is_some() {
            self.save(&file)?;
            debug!(user = %user, "cleared persisted access token");
        }
        Ok(())
    }

    pub fn request_token(&self) -> StoreResult<Option<TokenPair>> {
        let file = self.load()?;
        match (file.request_token, file.request_token_secret) {
            (Some(token), Some(secret)) => Ok(Some(TokenPair::new(token, secret))),
            _ => Ok(None),
        }
    }

    pub fn put_request_token(&self, pair: &TokenPair) -> StoreResult<()> {
        let mut file = self.load()?;
        file.request_token = Some(pair.token().to_string());
        file.request_token_secret = Some(pair.secret().to_string());
        self.save(&file)
    }

    pub fn clear_request_token(&self) -> StoreResult<()> {
        let mut file = self.load()?;
        let had_token = file.request_token.take().is_some();
        let had_secret = file.request_token_secret.take().is_some();
        if had_token || had_secret {
            self.save(&file)?;
        }
        Ok(())
    }

    /// A missing file reads as an empty store.
    fn load(&self) -> StoreResult<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let text = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| StoreError::Yaml {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, file: &StoreFile) -> StoreResult<()> {
        let text = serde_yaml::to_string(file).map_err(|source| StoreError::Yaml {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
