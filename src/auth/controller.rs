//! Observable authentication state.
//!
//! [`AuthController`] is the one writer of [`AuthSnapshot`]. Data providers
//! hold a clone of it, read the snapshot when they start a fetch, and
//! subscribe to change notifications.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use super::Credentials;

/// Opaque identity of an authentication session.
///
/// Only compared for equality by the data layer. The raw token is reachable
/// through [`TokenIdentity::as_str`] for the network client that has to send
/// it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenIdentity(Arc<str>);

impl TokenIdentity {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(Arc::from(token.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens end up in log lines; only the tail is printed.
impl fmt::Debug for TokenIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        write!(f, "TokenIdentity(…{})", tail)
    }
}

/// Point-in-time view of the authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthSnapshot {
    pub is_authorized: bool,
    pub current_token: Option<TokenIdentity>,
}

impl AuthSnapshot {
    /// Signed out.
    pub fn unauthorized() -> Self {
        Self::default()
    }

    /// Signed in with `token`.
    pub fn authorized(token: TokenIdentity) -> Self {
        Self {
            is_authorized: true,
            current_token: Some(token),
        }
    }
}

/// Process-wide auth state holder with change notifications.
///
/// Cloning is cheap and every clone observes the same state.
#[derive(Debug, Clone)]
pub struct AuthController {
    tx: Arc<watch::Sender<AuthSnapshot>>,
}

impl AuthController {
    pub fn new(initial: AuthSnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Seed the controller from stored credentials.
    ///
    /// Expired or missing tokens start out unauthorized.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        let snapshot = match credentials.token_identity() {
            Some(token) if credentials.is_valid() => AuthSnapshot::authorized(token),
            _ => AuthSnapshot::unauthorized(),
        };
        Self::new(snapshot)
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    pub fn is_authorized(&self) -> bool {
        self.tx.borrow().is_authorized
    }

    pub fn current_token(&self) -> Option<TokenIdentity> {
        self.tx.borrow().current_token.clone()
    }

    /// Receiver that is woken on every change after this call.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Replace the snapshot. Returns `false` (and notifies nobody) if it
    /// was already equal.
    pub fn set_snapshot(&self, next: AuthSnapshot) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        if changed {
            tracing::info!(
                authorized = self.is_authorized(),
                "Authentication state changed"
            );
        }
        changed
    }

    pub fn sign_in(&self, token: TokenIdentity) -> bool {
        self.set_snapshot(AuthSnapshot::authorized(token))
    }

    pub fn sign_out(&self) -> bool {
        self.set_snapshot(AuthSnapshot::unauthorized())
    }
}

impl Default for AuthController {
    fn default() -> Self {
        Self::new(AuthSnapshot::unauthorized())
    }
}
