//! Rendering projection from [`FetchState`] to view output.

use crate::fetch_state::FetchState;

/// Render callbacks keyed by fetch-state variant.
///
/// Implementations are pure: they describe what to show and never touch the
/// provider.
pub trait StateView<T, E> {
    type Output;

    /// Nothing fetched yet, or the fetch was suppressed for auth.
    fn empty(&self) -> Self::Output;

    /// A fetch is running. `previous` is the last success, if there was one
    /// right before this reload.
    fn loading(&self, previous: Option<&T>) -> Self::Output;

    fn content(&self, value: &T) -> Self::Output;

    fn error(&self, error: &E) -> Self::Output;
}

/// Project `state` through `view`.
pub fn render<T, E, V>(state: &FetchState<T, E>, view: &V) -> V::Output
where
    V: StateView<T, E> + ?Sized,
{
    match state {
        FetchState::NoData => view.empty(),
        FetchState::Loading(previous) => view.loading(previous.as_ref()),
        FetchState::Success(value) => view.content(value),
        FetchState::Failure(error) => view.error(error),
    }
}

/// Which view a state projects to, without rendering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Empty,
    Loading { stale: bool },
    Content,
    Error,
}

impl ViewKind {
    pub fn of<T, E>(state: &FetchState<T, E>) -> Self {
        render(state, &ViewKindView)
    }
}

struct ViewKindView;

impl<T, E> StateView<T, E> for ViewKindView {
    type Output = ViewKind;

    fn empty(&self) -> ViewKind {
        ViewKind::Empty
    }

    fn loading(&self, previous: Option<&T>) -> ViewKind {
        ViewKind::Loading {
            stale: previous.is_some(),
        }
    }

    fn content(&self, _value: &T) -> ViewKind {
        ViewKind::Content
    }

    fn error(&self, _error: &E) -> ViewKind {
        ViewKind::Error
    }
}
