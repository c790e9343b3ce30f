use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use serde_json::Value;
use tracing::trace;

use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::resource::Resource;

const JSON: &str = "application/json";

/// Thin signed resource client over the REST endpoints.
///
/// Every method is a one-to-one mapping from a call to a URL template and
/// an HTTP verb; the interesting work happens in [`Auth`]. Construction
/// refuses an unauthorized `Auth` outright so a misconfigured client fails
/// before any request leaves the process.
#[derive(Debug)]
pub struct Schoology {
    auth: Auth,
    /// Page size sent with collection requests.
    pub limit: u32,
}

impl Schoology {
    pub fn new(auth: Auth) -> Result<Self> {
        if !auth.is_authorized() {
            return Err(Error::NotAuthorized);
        }
        Ok(Schoology { auth, limit: 20 })
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Mutable access, e.g. to re-run the flow after a token revocation.
    pub fn auth_mut(&mut self) -> &mut Auth {
        &mut self.auth
    }

    // ------------------------------------------------------------------------
    // Generic signed verbs against paths under the API root

    /// GET a path and decode the JSON body.
    pub fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None)
    }

    /// POST a JSON body to a path.
    pub fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body))
    }

    /// PUT a JSON body to a path.
    pub fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(body))
    }

    /// DELETE a path. No body comes back on success.
    pub fn delete(&self, path: &str) -> Result<()> {
        if !self.auth.is_authorized() {
            return Err(Error::NotAuthorized);
        }
        let url = self.auth.api_url(path);
        let response = self
            .auth
            .http()
            .delete(&url)
            .header(AUTHORIZATION, self.auth.authorization_header())
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text()?;
            return Err(Error::Api { status, body });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Representative resource endpoints

    /// Data on the requesting user.
    pub fn me(&self) -> Result<Resource> {
        self.record("users/me")
    }

    pub fn user(&self, user_id: u64) -> Result<Resource> {
        self.record(&format!("users/{}", user_id))
    }

    pub fn users(&self) -> Result<Vec<Resource>> {
        self.collection("users", "user")
    }

    pub fn school(&self, school_id: u64) -> Result<Resource> {
        self.record(&format!("schools/{}", school_id))
    }

    pub fn schools(&self) -> Result<Vec<Resource>> {
        self.collection("schools", "school")
    }

    /// The requesting user's home feed.
    pub fn feed(&self) -> Result<Vec<Resource>> {
        self.collection("recent", "update")
    }

    pub fn inbox_messages(&self) -> Result<Vec<Resource>> {
        self.collection("messages/inbox", "message")
    }

    pub fn sent_messages(&self) -> Result<Vec<Resource>> {
        self.collection("messages/sent", "message")
    }

    /// Sends a private message. Recipients go over the wire as the
    /// comma-separated string the API expects;
    /// [`Resource::recipient_ids`] parses it back.
    pub fn send_message(
        &self,
        subject: &str,
        message: &str,
        recipient_ids: &[i64],
    ) -> Result<Resource> {
        let recipients = recipient_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let body = serde_json::json!({
            "subject": subject,
            "message": message,
            "recipient_ids": recipients,
        });
        let value = self.post("messages", &body)?;
        serde_json::from_value(value).map_err(|source| Error::Decode {
            url: self.auth.api_url("messages"),
            source,
        })
    }

    // ------------------------------------------------------------------------

    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        if !self.auth.is_authorized() {
            return Err(Error::NotAuthorized);
        }
        let url = self.auth.api_url(path);
        let mut builder = self
            .auth
            .http()
            .request(method, &url)
            .query(&[("limit", self.limit)])
            .header(AUTHORIZATION, self.auth.authorization_header())
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send()?;
        let status = response.status();
        let final_url = response.url().to_string();
        let text = response.text()?;
        if !status.is_success() {
            return Err(Error::Api { status, body: text });
        }
        trace!(status = status.as_u16(), url = %final_url, "api request completed");
        serde_json::from_str(&text).map_err(|source| Error::Decode {
            url: final_url,
            source,
        })
    }

    /// Single-record endpoints answer with a bare object.
    fn record(&self, path: &str) -> Result<Resource> {
        let value = self.get(path)?;
        serde_json::from_value(value).map_err(|source| Error::Decode {
            url: self.auth.api_url(path),
            source,
        })
    }

    /// Collection endpoints wrap their list in a singular envelope key,
    /// e.g. `{"user": [...]}` on `/users`.
    fn collection(&self, path: &str, envelope: &str) -> Result<Vec<Resource>> {
        let mut value = self.get(path)?;
        let items = value
            .get_mut(envelope)
            .map(Value::take)
            .unwrap_or(Value::Null);
        serde_json::from_value(items).map_err(|source| Error::Decode {
            url: self.auth.api_url(path),
            source,
        })
    }
}
