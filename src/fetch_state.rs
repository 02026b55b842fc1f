//! Presentation state for network-backed views.
//!
//! [`FetchState`] is the only thing a host looks at when it renders a
//! provider. It is a closed enum so every render site has to handle all four
//! cases.

/// Result of the most recent fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState<T, E> {
    /// Nothing has been fetched yet (or the fetch was suppressed for auth).
    NoData,
    /// A fetch is in flight. Carries the last successful payload, if the
    /// state being replaced was a success, for stale-while-revalidate.
    Loading(Option<T>),
    /// The last fetch completed.
    Success(T),
    /// The last fetch failed. No payload is retained.
    Failure(E),
}

impl<T, E> FetchState<T, E> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, FetchState::NoData)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchState::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchState::Failure(_))
    }

    /// Whether a host reappearing on this state should fetch again even if
    /// the auth token is unchanged.
    pub fn needs_retry(&self) -> bool {
        matches!(self, FetchState::NoData | FetchState::Failure(_))
    }

    /// The payload a renderer may show: the success value, or the previous
    /// value retained while loading.
    pub fn payload(&self) -> Option<&T> {
        match self {
            FetchState::Success(value) => Some(value),
            FetchState::Loading(previous) => previous.as_ref(),
            FetchState::NoData | FetchState::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            FetchState::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// Consume the state and produce the `Loading` state that replaces it.
    ///
    /// Only a `Success` payload carries over. A `Loading` state being
    /// superseded by another reload is not a success, so its retained value
    /// is dropped as well.
    pub fn into_loading(self) -> Self {
        match self {
            FetchState::Success(value) => FetchState::Loading(Some(value)),
            _ => FetchState::Loading(None),
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            FetchState::NoData => "no_data",
            FetchState::Loading(_) => "loading",
            FetchState::Success(_) => "success",
            FetchState::Failure(_) => "failure",
        }
    }
}

impl<T, E> Default for FetchState<T, E> {
    fn default() -> Self {
        FetchState::NoData
    }
}

impl<T, E> From<Result<T, E>> for FetchState<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => FetchState::Success(value),
            Err(err) => FetchState::Failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type State = FetchState<String, String>;

    #[test]
    fn test_default_is_no_data() {
        let state = State::default();
        assert!(state.is_no_data());
        assert!(state.payload().is_none());
    }

    #[test]
    fn test_into_loading_keeps_success_payload() {
        let state = State::Success("A".to_string());
        assert_eq!(state.into_loading(), State::Loading(Some("A".to_string())));
    }

    #[test]
    fn test_into_loading_drops_everything_else() {
        assert_eq!(State::NoData.into_loading(), State::Loading(None));
        assert_eq!(
            State::Failure("boom".to_string()).into_loading(),
            State::Loading(None)
        );
        assert_eq!(
            State::Loading(Some("old".to_string())).into_loading(),
            State::Loading(None)
        );
    }

    #[test]
    fn test_payload_from_loading_previous() {
        let state = State::Loading(Some("stale".to_string()));
        assert_eq!(state.payload().map(String::as_str), Some("stale"));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_failure_has_no_payload() {
        let state = State::Failure("E1".to_string());
        assert!(state.payload().is_none());
        assert_eq!(state.error().map(String::as_str), Some("E1"));
    }

    #[test]
    fn test_needs_retry() {
        assert!(State::NoData.needs_retry());
        assert!(State::Failure("e".to_string()).needs_retry());
        assert!(!State::Loading(None).needs_retry());
        assert!(!State::Success("v".to_string()).needs_retry());
    }

    #[test]
    fn test_from_result() {
        let ok: State = Ok::<_, String>("v".to_string()).into();
        assert!(ok.is_success());

        let err: State = Err::<String, _>("e".to_string()).into();
        assert!(err.is_failure());
        assert_eq!(err.label(), "failure");
    }
}
