//! Error handling.
//!
//! - **Error Categories**: high-level classification for retry and messaging
//! - **API Errors**: [`ApiError`], the failure type of emote fetches
//!
//! Credential storage errors live with the store in
//! [`crate::auth::CredentialsError`].
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, DNS, timeout | Yes |
//! | Auth | Credentials missing or rejected | No |
//! | Server | 5xx, rate limiting | Yes |
//! | Client | Bad request or undecodable response | No |

mod api;
mod category;

pub use api::ApiError;
pub use category::ErrorCategory;
