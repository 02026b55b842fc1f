//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! use common::{GatedFetcher, test_credentials};
//!
//! let fetcher = GatedFetcher::<String, String>::new();
//! let provider = DataProvider::new(fetcher.clone(), auth, false);
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::time::Duration;

use sila::auth::{AuthController, Credentials, TokenIdentity};

/// How long a test waits on an async condition before failing.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Credentials with a token that won't expire during test execution.
pub fn test_credentials() -> Credentials {
    Credentials {
        access_token: Some("test-access-token-12345".to_string()),
        expires_at: Some(i64::MAX),
        user_id: Some("test-user-id".to_string()),
    }
}

/// Credentials whose token has already expired.
pub fn expired_credentials() -> Credentials {
    Credentials {
        access_token: Some("expired-access-token".to_string()),
        expires_at: Some(0),
        user_id: Some("test-user-id".to_string()),
    }
}

/// Auth controller signed in with `token`.
pub fn signed_in(token: &str) -> AuthController {
    let auth = AuthController::default();
    auth.sign_in(TokenIdentity::new(token));
    auth
}

/// Sample 7TV global emote set body with the given emote names.
pub fn emote_set_json(names: &[&str]) -> String {
    let emotes: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                r#"{{"id":"e{i}","name":"{name}","flags":0,"timestamp":1700000000000,
                "data":{{"id":"e{i}","name":"{name}","flags":0,"lifecycle":3,
                "host":{{"url":"//cdn.7tv.app/emote/e{i}","files":[
                    {{"name":"1x.webp","static_name":"1x_static.webp","width":32,"height":32,"frame_count":1,"size":512,"format":"WEBP"}},
                    {{"name":"2x.webp","static_name":"2x_static.webp","width":64,"height":64,"frame_count":1,"size":1024,"format":"WEBP"}}
                ]}}}}}}"#
            )
        })
        .collect();
    format!(r#"{{"id":"global","name":"Global","emotes":[{}]}}"#, emotes.join(","))
}
