//! Mount/unmount protocol between a view and its data provider.
//!
//! A [`ProviderHost`] is what a screen holds. It decides, each time the
//! screen appears, whether the provider has to fetch:
//!
//! | Situation                               | Action            |
//! |-----------------------------------------|-------------------|
//! | First appearance                        | fetch (auth gate) |
//! | Reappear, token changed since last fetch| fetch             |
//! | Reappear, state `NoData` or `Failure`   | fetch             |
//! | Reappear, `Loading` but cancelled       | fetch             |
//! | Reappear, state `Success` or `Loading`  | reuse             |
//!
//! Disappearing cancels the in-flight fetch but keeps the provider and its
//! state. The provider is destroyed when the host is dropped (host-owned)
//! or when its external owner drops it (shared).

pub mod render;

pub use render::{render, StateView, ViewKind};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::fetch_state::FetchState;
use crate::provider::{DataProvider, FetchHandle, ProviderEvent};

/// A provider owned outside the host and handed to it.
pub type SharedProvider<T, E> = Arc<Mutex<DataProvider<T, E>>>;

type ProviderFactory<T, E> = Box<dyn Fn() -> DataProvider<T, E> + Send>;

/// Where the host gets its provider from.
enum ProviderSource<T, E> {
    /// Host-owned, not built yet. Replaced by `Owned` on first use.
    Pending(ProviderFactory<T, E>),
    /// Host-owned and built.
    Owned(DataProvider<T, E>),
    /// Supplied by the caller, who keeps it alive across hosts.
    Shared(SharedProvider<T, E>),
}

/// Mount state of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPhase {
    Unmounted,
    /// Mounted and rendering for the first time.
    MountedFresh,
    /// Mounted again after having rendered before.
    MountedSeen,
}

/// Why a host asked its provider to reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    FirstAppearance,
    TokenChanged,
    /// Previous attempt produced nothing, failed, or was cut off.
    Retry,
    AuthChanged,
}

/// Outcome of [`ProviderHost::appear`].
#[derive(Debug, Clone)]
pub enum MountAction {
    Reloaded {
        reason: ReloadReason,
        handle: FetchHandle,
    },
    /// A fetch was due but the provider requires auth and the user is
    /// signed out.
    Suppressed,
    /// Existing state was reused.
    Reused,
}

impl MountAction {
    pub fn reloaded(&self) -> bool {
        matches!(self, MountAction::Reloaded { .. })
    }

    pub fn reason(&self) -> Option<ReloadReason> {
        match self {
            MountAction::Reloaded { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Host behavior knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostOptions {
    /// Reload immediately when the auth token changes while mounted,
    /// instead of waiting for the next appearance.
    pub reload_on_auth_change: bool,
}

/// Binding between one screen and its [`DataProvider`].
pub struct ProviderHost<T, E> {
    source: ProviderSource<T, E>,
    phase: MountPhase,
    has_rendered: bool,
    options: HostOptions,
}

fn lock<T, E>(shared: &SharedProvider<T, E>) -> MutexGuard<'_, DataProvider<T, E>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T, E> ProviderHost<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Host that builds its own provider the first time it appears.
    ///
    /// `factory` is called at most once; it is dropped after the build.
    pub fn owned<F>(factory: F) -> Self
    where
        F: Fn() -> DataProvider<T, E> + Send + 'static,
    {
        Self::with_source(ProviderSource::Pending(Box::new(factory)))
    }

    /// Host over a provider owned elsewhere.
    pub fn shared(provider: SharedProvider<T, E>) -> Self {
        Self::with_source(ProviderSource::Shared(provider))
    }

    fn with_source(source: ProviderSource<T, E>) -> Self {
        Self {
            source,
            phase: MountPhase::Unmounted,
            has_rendered: false,
            options: HostOptions::default(),
        }
    }

    pub fn with_options(mut self, options: HostOptions) -> Self {
        self.options = options;
        self
    }

    pub fn phase(&self) -> MountPhase {
        self.phase
    }

    pub fn is_mounted(&self) -> bool {
        self.phase != MountPhase::Unmounted
    }

    pub fn has_rendered(&self) -> bool {
        self.has_rendered
    }

    /// Run `f` against the provider, creating an owned one if needed.
    pub fn with_provider<R>(&mut self, f: impl FnOnce(&mut DataProvider<T, E>) -> R) -> R {
        match &mut self.source {
            ProviderSource::Pending(factory) => {
                let provider = factory();
                self.source = ProviderSource::Owned(provider);
                self.with_provider(f)
            }
            ProviderSource::Owned(provider) => f(provider),
            ProviderSource::Shared(shared) => f(&mut lock(shared)),
        }
    }

    /// Run `f` against the provider if one exists yet.
    fn with_existing<R>(&mut self, f: impl FnOnce(&mut DataProvider<T, E>) -> R) -> Option<R> {
        match &mut self.source {
            ProviderSource::Pending(_) => None,
            ProviderSource::Owned(provider) => Some(f(provider)),
            ProviderSource::Shared(shared) => Some(f(&mut lock(shared))),
        }
    }

    /// Read the current state. An owned host that never appeared reads as
    /// `NoData`.
    pub fn with_state<R>(&self, f: impl FnOnce(&FetchState<T, E>) -> R) -> R {
        match &self.source {
            ProviderSource::Pending(_) => f(&FetchState::NoData),
            ProviderSource::Owned(provider) => f(provider.state()),
            ProviderSource::Shared(shared) => f(lock(shared).state()),
        }
    }

    /// Render the current state through `view`.
    pub fn render<V>(&self, view: &V) -> V::Output
    where
        V: StateView<T, E> + ?Sized,
    {
        self.with_state(|state| render::render(state, view))
    }

    pub fn view_kind(&self) -> ViewKind {
        self.with_state(ViewKind::of)
    }

    /// The screen appeared.
    ///
    /// Follows the table in the module docs. One row goes beyond a plain
    /// "`Loading` means reuse": a `Loading` state whose fetch was cancelled
    /// (the screen disappeared mid-fetch) or panicked has nothing left to
    /// finish it, so it is retried like `NoData` or `Failure`.
    pub fn appear(&mut self) -> MountAction {
        if !self.has_rendered {
            self.has_rendered = true;
            self.phase = MountPhase::MountedFresh;
            return self.with_provider(|provider| {
                provider.register();
                if !provider.can_fetch() {
                    tracing::debug!(provider = %provider.name(), "Mounted without auth, fetch deferred");
                    return MountAction::Suppressed;
                }
                reload(provider, ReloadReason::FirstAppearance)
            });
        }

        self.phase = MountPhase::MountedSeen;
        self.with_provider(|provider| {
            provider.register();
            if provider.is_token_stale() {
                reload(provider, ReloadReason::TokenChanged)
            } else if provider.state().needs_retry() || provider.is_interrupted() {
                reload(provider, ReloadReason::Retry)
            } else {
                tracing::debug!(provider = %provider.name(), "Reusing rendered state");
                MountAction::Reused
            }
        })
    }

    /// The screen disappeared. Cancels the in-flight fetch only.
    pub fn disappear(&mut self) {
        self.phase = MountPhase::Unmounted;
        self.with_existing(|provider| provider.cancel());
    }

    /// Apply queued provider messages and react to them.
    ///
    /// Returns the events that were applied; a non-empty result means the
    /// host should re-render.
    pub fn pump(&mut self) -> Vec<ProviderEvent> {
        let mounted = self.is_mounted();
        let options = self.options;
        self.with_existing(|provider| {
            let events = provider.pump();
            let token_changed = events.iter().any(|event| {
                matches!(event, ProviderEvent::AuthChanged { token_changed: true, .. })
            });
            if mounted && options.reload_on_auth_change && token_changed {
                reload(provider, ReloadReason::AuthChanged);
            }
            events
        })
        .unwrap_or_default()
    }

    /// Wait until at least one provider event has been applied.
    ///
    /// Returns `None` if there is no provider yet.
    pub async fn changed(&mut self) -> Option<Vec<ProviderEvent>> {
        let waker: Arc<Notify> = self.with_existing(|provider| provider.waker())?;
        loop {
            let events = self.pump();
            if !events.is_empty() {
                return Some(events);
            }
            waker.notified().await;
        }
    }

    /// Whether a fetch is currently in flight.
    pub fn is_fetching(&mut self) -> bool {
        self.with_existing(|provider| provider.is_fetching())
            .unwrap_or(false)
    }
}

fn reload<T, E>(provider: &mut DataProvider<T, E>, reason: ReloadReason) -> MountAction
where
    T: Send + 'static,
    E: Send + 'static,
{
    match provider.reload() {
        Some(handle) => {
            tracing::debug!(provider = %provider.name(), ?reason, "Host triggered reload");
            MountAction::Reloaded { reason, handle }
        }
        None => MountAction::Suppressed,
    }
}
