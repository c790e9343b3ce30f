/*!
schoology: Schoology REST API client for Rust.

# Overview

This library binds the Schoology REST API: it constructs OAuth 1.0
PLAINTEXT authorization headers, drives the three-legged consent flow when
per-user access is needed, and performs signed JSON requests against the
fixed endpoint paths through [reqwest](https://crates.io/crates/reqwest).

# How to use

## Basic usecase 1 - two-legged (application credentials only)

```no_run
use schoology::{Auth, Schoology};

# fn main() -> schoology::Result<()> {
// any non-empty key/secret pair counts as authorized; a bad pair only
// surfaces on the first real call
let auth = Auth::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]");

let api = Schoology::new(auth)?;
let me = api.me()?;
println!("your name is {}", me.str_field("name_display").unwrap_or("?"));
# Ok(())
# }
```

## Basic usecase 2 - three-legged (per-user consent)

```no_run
use std::io;

use schoology::{Auth, Schoology, TokenStore};

# fn main() -> schoology::Result<()> {
// step 0: tokens persisted in earlier runs are picked up from the store
let store = TokenStore::new("schoology_tokens.yml");
let mut auth = Auth::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")
    .three_legged()
    .domain("https://district.example.com")
    .with_store(store, "[USER_ID]")?;

// step 1: acquire a request token and the consent-page URL
if let Some(url) = auth.request_authorization(None)? {
    // step 2: the user grants or denies access in their browser
    println!("please access to: {}", url);
    println!("press enter when ready.");
    let mut line = String::new();
    io::stdin().read_line(&mut line).ok();

    // step 3: exchange the request token for an access token
    if !auth.complete_authorization()? {
        eprintln!("account was not authorized.");
        return Ok(());
    }
}

let api = Schoology::new(auth)?;
for update in api.feed()? {
    println!("{}", update.str_field("body").unwrap_or(""));
}
# Ok(())
# }
```

A revoked token is detected by [`Auth::probe_and_refresh`] (also run
internally when [`Auth::request_authorization`] finds a stored token):
the pair is cleared from memory and store, and the flow restarts.
*/
mod auth;
mod client;
mod error;
mod resource;
mod secrets;
mod signer;
mod store;
mod token_reader;

// exposed to external program
pub use auth::{Auth, AuthorizationState, DEFAULT_API_ROOT, DEFAULT_DOMAIN_ROOT};
pub use client::Schoology;
pub use error::{Error, Result, StoreError, StoreResult, TokenReaderError, TokenReaderResult};
pub use resource::Resource;
pub use secrets::{Credentials, TokenPair};
pub use signer::{HeaderParameters, Signer, REALM};
pub use store::TokenStore;
pub use token_reader::TokenResponse;

// exposed constant variables
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `oauth_token_secret`.
pub const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `request_token`, the consent-page query parameter.
pub const REQUEST_TOKEN_KEY: &str = "request_token";
