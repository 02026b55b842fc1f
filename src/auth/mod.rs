//! Authentication state for Sila.
//!
//! This module provides:
//! - Credentials storage on disk
//! - The observable [`AuthController`] that data providers read and
//!   subscribe to

pub mod controller;
pub mod credentials;

pub use controller::{AuthController, AuthSnapshot, TokenIdentity};
pub use credentials::{Credentials, CredentialsError, CredentialsManager};
