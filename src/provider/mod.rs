//! Generic auth-aware data provider.
//!
//! A [`DataProvider`] owns the fetch state of one screen: the current
//! [`FetchState`], the token it last fetched with, the single in-flight
//! fetch, and a subscription to [`AuthController`] changes.
//!
//! # Event flow
//!
//! ```text
//!  reload() ──spawn──▶ fetch task ──┐
//!                                   ├──▶ mpsc ──▶ pump()/next_event() ──▶ state
//!  AuthController ──▶ auth task ────┘
//! ```
//!
//! Fetch tasks never touch `state` directly. They send their result, tagged
//! with the generation they were started under, and the owner applies it on
//! its own thread of control. A completion whose generation is not the live
//! one is dropped.

mod fetcher;
mod handle;

pub use fetcher::{from_fn, AuthContext, Fetcher, FnFetcher};
pub use handle::FetchHandle;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::auth::{AuthController, AuthSnapshot, TokenIdentity};
use crate::fetch_state::FetchState;

/// Message from a provider's background tasks to its owner.
#[derive(Debug)]
pub enum ProviderMessage<T, E> {
    /// A fetch finished.
    Completed { generation: u64, result: Result<T, E> },
    /// A fetch panicked before producing a result.
    Panicked { generation: u64 },
    /// The auth controller published a new snapshot.
    AuthChanged(AuthSnapshot),
}

/// What applying a [`ProviderMessage`] did, reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// `state` moved to `Success` or `Failure`.
    StateChanged,
    /// Auth changed. `token_changed` is true when the new token differs
    /// from the one the last fetch used.
    AuthChanged {
        snapshot: AuthSnapshot,
        token_changed: bool,
    },
}

/// Fetch-state controller for one screen.
///
/// All methods that start tasks (`reload`, `register`) must be called from
/// within a Tokio runtime.
pub struct DataProvider<T, E> {
    name: String,
    fetcher: Arc<dyn Fetcher<T, E>>,
    auth: AuthController,
    requires_auth: bool,
    state: FetchState<T, E>,
    last_fetch_token: Option<TokenIdentity>,
    generation: u64,
    in_flight: Option<FetchHandle>,
    subscription: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<ProviderMessage<T, E>>,
    rx: mpsc::UnboundedReceiver<ProviderMessage<T, E>>,
    wake: Arc<Notify>,
}

impl<T, E> DataProvider<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new(
        fetcher: impl Fetcher<T, E> + 'static,
        auth: AuthController,
        requires_auth: bool,
    ) -> Self {
        Self::from_shared_fetcher(Arc::new(fetcher), auth, requires_auth)
    }

    /// Build a provider around a fetcher that other providers also use.
    pub fn from_shared_fetcher(
        fetcher: Arc<dyn Fetcher<T, E>>,
        auth: AuthController,
        requires_auth: bool,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            name: "provider".to_string(),
            fetcher,
            auth,
            requires_auth,
            state: FetchState::NoData,
            last_fetch_token: None,
            generation: 0,
            in_flight: None,
            subscription: None,
            tx,
            rx,
            wake: Arc::new(Notify::new()),
        }
    }

    /// Name used in log lines.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &FetchState<T, E> {
        &self.state
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    pub fn auth(&self) -> &AuthController {
        &self.auth
    }

    /// Token observed when the most recent fetch started.
    pub fn last_fetch_token(&self) -> Option<&TokenIdentity> {
        self.last_fetch_token.as_ref()
    }

    /// Number of fetches started over this provider's lifetime.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A fetch counts as in flight until its result is applied or it is
    /// cancelled, so a finished task with a queued result still reports true.
    pub fn is_fetching(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_cancelled())
    }

    /// `Loading` with nothing left in flight to finish it: the fetch was
    /// cancelled (teardown, handle) or panicked.
    pub fn is_interrupted(&self) -> bool {
        self.state.is_loading() && self.in_flight.as_ref().map_or(true, |h| h.is_cancelled())
    }

    pub fn is_registered(&self) -> bool {
        self.subscription.is_some()
    }

    /// Whether the current token differs from the one the last fetch used.
    pub fn is_token_stale(&self) -> bool {
        self.last_fetch_token != self.auth.current_token()
    }

    /// Whether a fetch may start right now.
    pub fn can_fetch(&self) -> bool {
        !self.requires_auth || self.auth.is_authorized()
    }

    /// Signalled whenever a message is queued for this provider.
    ///
    /// Lets an owner that cannot hold the provider across an await (for
    /// example behind a mutex) wait for work and then call [`pump`].
    ///
    /// [`pump`]: DataProvider::pump
    pub fn waker(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }

    /// Start a new fetch, superseding any in-flight one.
    ///
    /// Returns `None` without touching state when the provider requires
    /// auth and the user is signed out.
    pub fn reload(&mut self) -> Option<FetchHandle> {
        let auth = self.auth.snapshot();
        if self.requires_auth && !auth.is_authorized {
            tracing::debug!(provider = %self.name, "Fetch suppressed: not authorized");
            return None;
        }

        self.cancel();

        self.generation += 1;
        let generation = self.generation;
        self.state = std::mem::take(&mut self.state).into_loading();
        self.last_fetch_token = auth.current_token.clone();

        tracing::debug!(
            provider = %self.name,
            generation,
            stale_payload = self.state.payload().is_some(),
            "Starting fetch"
        );

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let wake = Arc::clone(&self.wake);
        let task = tokio::spawn(async move {
            let message = match AssertUnwindSafe(fetcher.fetch(auth)).catch_unwind().await {
                Ok(result) => ProviderMessage::Completed { generation, result },
                Err(_) => ProviderMessage::Panicked { generation },
            };
            if tx.send(message).is_ok() {
                wake.notify_one();
            }
        });

        let handle = FetchHandle::new(generation, task.abort_handle());
        self.in_flight = Some(handle.clone());
        Some(handle)
    }

    /// Cancel the in-flight fetch, if any. Never changes `state`.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.cancel();
        }
    }

    /// Subscribe to auth changes. Only the first call subscribes.
    ///
    /// Returns `true` if this call created the subscription.
    pub fn register(&mut self) -> bool {
        if self.subscription.is_some() {
            return false;
        }

        let mut auth_rx = self.auth.subscribe();
        let tx = self.tx.clone();
        let wake = Arc::clone(&self.wake);
        self.subscription = Some(tokio::spawn(async move {
            while auth_rx.changed().await.is_ok() {
                let snapshot = auth_rx.borrow_and_update().clone();
                if tx.send(ProviderMessage::AuthChanged(snapshot)).is_err() {
                    break;
                }
                wake.notify_one();
            }
        }));

        tracing::debug!(provider = %self.name, "Subscribed to auth changes");
        true
    }

    /// Drop the auth subscription. Returns `true` if one was active.
    ///
    /// Auth messages already queued are still delivered. A later
    /// [`register`](DataProvider::register) subscribes afresh.
    pub fn unregister(&mut self) -> bool {
        match self.subscription.take() {
            Some(subscription) => {
                subscription.abort();
                tracing::debug!(provider = %self.name, "Unsubscribed from auth changes");
                true
            }
            None => false,
        }
    }

    fn is_live(&self, generation: u64) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|h| h.generation() == generation && !h.is_cancelled())
    }

    /// Apply one message. Returns `None` when the message was stale or
    /// changed nothing the host renders.
    pub fn apply(&mut self, message: ProviderMessage<T, E>) -> Option<ProviderEvent> {
        match message {
            ProviderMessage::Completed { generation, result } => {
                if !self.is_live(generation) {
                    tracing::debug!(
                        provider = %self.name,
                        generation,
                        current = self.generation,
                        "Discarding stale fetch result"
                    );
                    return None;
                }

                self.in_flight = None;
                self.state = result.into();
                match self.state {
                    FetchState::Failure(_) => {
                        tracing::warn!(provider = %self.name, generation, "Fetch failed")
                    }
                    _ => tracing::debug!(provider = %self.name, generation, "Fetch succeeded"),
                }
                Some(ProviderEvent::StateChanged)
            }
            ProviderMessage::Panicked { generation } => {
                if self.is_live(generation) {
                    // No `E` to report. State stays `Loading` until the next reload.
                    tracing::error!(provider = %self.name, generation, "Fetch panicked");
                    self.in_flight = None;
                }
                None
            }
            ProviderMessage::AuthChanged(snapshot) => {
                let token_changed = snapshot.current_token != self.last_fetch_token;
                tracing::debug!(
                    provider = %self.name,
                    authorized = snapshot.is_authorized,
                    token_changed,
                    "Observed auth change"
                );
                Some(ProviderEvent::AuthChanged {
                    snapshot,
                    token_changed,
                })
            }
        }
    }

    /// Apply every queued message without waiting.
    pub fn pump(&mut self) -> Vec<ProviderEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            if let Some(event) = self.apply(message) {
                events.push(event);
            }
        }
        events
    }

    /// Wait for the next message that produces an event and apply it.
    ///
    /// Cancel-safe: a message is only removed from the queue once it is
    /// about to be applied.
    pub async fn next_event(&mut self) -> ProviderEvent {
        loop {
            // The provider holds a sender, so the channel never closes.
            let Some(message) = self.rx.recv().await else {
                std::future::pending::<()>().await;
                continue;
            };
            if let Some(event) = self.apply(message) {
                return event;
            }
        }
    }

    /// Wait until the in-flight fetch settles, applying events on the way.
    ///
    /// Returns immediately when nothing is in flight.
    pub async fn settle(&mut self) {
        while self.in_flight.as_ref().is_some_and(|h| !h.is_cancelled()) {
            let Some(message) = self.rx.recv().await else {
                break;
            };
            self.apply(message);
        }
    }
}

impl<T, E> Drop for DataProvider<T, E> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.cancel();
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
        }
    }
}

impl<T, E> std::fmt::Debug for DataProvider<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProvider")
            .field("name", &self.name)
            .field("requires_auth", &self.requires_auth)
            .field("state", &self.state.label())
            .field("generation", &self.generation)
            .field("last_fetch_token", &self.last_fetch_token)
            .field("registered", &self.subscription.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_fetcher(
        calls: Arc<AtomicUsize>,
    ) -> impl Fetcher<usize, String> + 'static {
        from_fn(move |_auth: AuthContext| {
            let calls = Arc::clone(&calls);
            async move { Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst) + 1) }
        })
    }

    #[tokio::test]
    async fn test_reload_moves_to_loading_then_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider =
            DataProvider::new(counting_fetcher(calls.clone()), AuthController::default(), false);

        let handle = provider.reload().expect("fetch should start");
        assert_eq!(handle.generation(), 1);
        assert_eq!(provider.state(), &FetchState::Loading(None));

        assert_eq!(provider.next_event().await, ProviderEvent::StateChanged);
        assert_eq!(provider.state(), &FetchState::Success(1));
        assert!(!provider.is_fetching());
    }

    #[tokio::test]
    async fn test_fetching_until_result_is_applied() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider =
            DataProvider::new(counting_fetcher(calls.clone()), AuthController::default(), false);

        let handle = provider.reload().expect("fetch should start");
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }

        // Task is done but its result is still queued
        assert!(provider.is_fetching());
        assert_eq!(provider.state(), &FetchState::Loading(None));

        assert_eq!(provider.pump(), vec![ProviderEvent::StateChanged]);
        assert!(!provider.is_fetching());
        assert_eq!(provider.state(), &FetchState::Success(1));
    }

    #[tokio::test]
    async fn test_reload_gated_on_auth() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider =
            DataProvider::new(counting_fetcher(calls.clone()), AuthController::default(), true);

        assert!(!provider.can_fetch());
        assert!(provider.reload().is_none());
        assert!(provider.state().is_no_data());
        assert_eq!(provider.generation(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_generation_is_discarded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider =
            DataProvider::new(counting_fetcher(calls), AuthController::default(), false);

        provider.reload();
        provider.reload();
        assert_eq!(provider.generation(), 2);

        let stale = provider.apply(ProviderMessage::Completed {
            generation: 1,
            result: Ok(100),
        });
        assert!(stale.is_none());
        assert_eq!(provider.state(), &FetchState::Loading(None));

        let live = provider.apply(ProviderMessage::Completed {
            generation: 2,
            result: Ok(200),
        });
        assert_eq!(live, Some(ProviderEvent::StateChanged));
        assert_eq!(provider.state(), &FetchState::Success(200));
    }

    #[tokio::test]
    async fn test_cancel_keeps_state_and_drops_queued_result() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider =
            DataProvider::new(counting_fetcher(calls), AuthController::default(), false);

        provider.reload();
        provider.cancel();
        assert_eq!(provider.state(), &FetchState::Loading(None));

        // Even if the task got its result out before the abort landed
        let applied = provider.apply(ProviderMessage::Completed {
            generation: 1,
            result: Ok(1),
        });
        assert!(applied.is_none());
        assert_eq!(provider.state(), &FetchState::Loading(None));

        // Idle cancel is a no-op
        provider.cancel();
        assert_eq!(provider.state(), &FetchState::Loading(None));
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let auth = AuthController::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider = DataProvider::new(counting_fetcher(calls), auth.clone(), false);

        assert!(provider.register());
        assert!(!provider.register());
        assert!(!provider.register());
        assert!(provider.is_registered());

        // One receiver from the provider's subscription only
        tokio::task::yield_now().await;
        assert_eq!(auth.receiver_count(), 1);
    }

    #[tokio::test]
    async fn test_auth_change_reaches_owner() {
        let auth = AuthController::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider = DataProvider::new(counting_fetcher(calls), auth.clone(), true);
        provider.register();

        auth.sign_in(TokenIdentity::new("t1"));

        match provider.next_event().await {
            ProviderEvent::AuthChanged {
                snapshot,
                token_changed,
            } => {
                assert!(snapshot.is_authorized);
                assert!(token_changed);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(provider.is_token_stale());
    }

    #[tokio::test]
    async fn test_unregister_releases_subscription() {
        let auth = AuthController::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider = DataProvider::new(counting_fetcher(calls), auth.clone(), false);

        assert!(!provider.unregister());
        provider.register();
        assert!(provider.unregister());
        assert!(!provider.is_registered());

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(auth.receiver_count(), 0);

        auth.sign_in(TokenIdentity::new("ignored"));
        tokio::task::yield_now().await;
        assert!(provider.pump().is_empty());

        assert!(provider.register());
        assert_eq!(auth.receiver_count(), 1);
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let auth = AuthController::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider = DataProvider::new(counting_fetcher(calls), auth.clone(), false);
        provider.register();
        tokio::task::yield_now().await;
        assert_eq!(auth.receiver_count(), 1);

        drop(provider);
        // Let the aborted task unwind
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(auth.receiver_count(), 0);
    }
}
