//! Test doubles for fetch operations.
//!
//! A fetcher whose calls the test completes by hand. HTTP doubles live in
//! `sila::adapters::mock`.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use sila::provider::{AuthContext, Fetcher};
use tokio::sync::oneshot;

use super::TEST_TIMEOUT;

struct Call<T, E> {
    auth: AuthContext,
    reply: Option<oneshot::Sender<Result<T, E>>>,
}

/// A fetcher that parks every call until the test resolves it.
///
/// Calls are numbered in the order they start running. A call whose task
/// was aborted can no longer be resolved.
pub struct GatedFetcher<T, E> {
    calls: Arc<Mutex<Vec<Call<T, E>>>>,
}

impl<T, E> Clone for GatedFetcher<T, E> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T, E> GatedFetcher<T, E> {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> MutexGuard<'_, Vec<Call<T, E>>> {
        self.calls.lock().unwrap()
    }

    /// Number of calls that have started.
    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// Auth context the `index`th call received.
    pub fn auth_of(&self, index: usize) -> AuthContext {
        self.calls()[index].auth.clone()
    }

    /// Wait until at least `count` calls have started.
    pub async fn wait_for_calls(&self, count: usize) {
        tokio::time::timeout(TEST_TIMEOUT, async {
            while self.call_count() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("fetch was never called");
    }

    /// Whether the `index`th call can no longer be completed.
    pub fn is_abandoned(&self, index: usize) -> bool {
        self.calls()[index]
            .reply
            .as_ref()
            .map_or(true, |reply| reply.is_closed())
    }

    /// Wait until the task running the `index`th call has been dropped.
    pub async fn wait_abandoned(&self, index: usize) {
        tokio::time::timeout(TEST_TIMEOUT, async {
            while !self.is_abandoned(index) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("fetch task was never dropped");
    }

    /// Complete the `index`th call. Returns false if its task is gone.
    pub fn resolve(&self, index: usize, result: Result<T, E>) -> bool {
        let reply = self.calls()[index].reply.take();
        match reply {
            Some(reply) => reply.send(result).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl<T, E> Fetcher<T, E> for GatedFetcher<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn fetch(&self, auth: AuthContext) -> Result<T, E> {
        let (tx, rx) = oneshot::channel();
        self.calls().push(Call {
            auth,
            reply: Some(tx),
        });
        match rx.await {
            Ok(result) => result,
            Err(_) => std::future::pending().await,
        }
    }
}
