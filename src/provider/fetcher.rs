//! The fetch operation a provider runs.

use std::future::Future;

use async_trait::async_trait;

use crate::auth::AuthSnapshot;

/// Auth state handed to a fetch at the moment it starts.
pub type AuthContext = AuthSnapshot;

/// An async operation producing `T` or failing with `E`.
///
/// Implemented by network clients (see [`crate::emotes::EmoteClient`]) and,
/// through [`from_fn`], by plain closures. A fetch is cancelled by aborting
/// the task it runs on, so implementations only need to be cancel-safe at
/// their await points.
#[async_trait]
pub trait Fetcher<T, E>: Send + Sync {
    async fn fetch(&self, auth: AuthContext) -> Result<T, E>;
}

/// Adapter that turns an async closure into a [`Fetcher`].
pub struct FnFetcher<F>(F);

/// Wrap `f` as a [`Fetcher`].
///
/// ```ignore
/// let fetcher = from_fn(|auth: AuthContext| async move {
///     client.followed_streams(auth.current_token).await
/// });
/// ```
pub fn from_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher(f)
}

#[async_trait]
impl<T, E, F, Fut> Fetcher<T, E> for FnFetcher<F>
where
    F: Fn(AuthContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: Send,
{
    async fn fetch(&self, auth: AuthContext) -> Result<T, E> {
        (self.0)(auth).await
    }
}
