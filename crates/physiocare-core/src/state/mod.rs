//! Screen state holders.
//!
//! Each screen owns one view model. A view model runs repository calls in
//! response to user or lifecycle events and publishes a single
//! [`ViewState`] that the host observes.
//!
//! Loads are not de-duplicated: calling `load` while an earlier call is in
//! flight starts a second request, and whichever response arrives last
//! determines the final state. Each action also returns its own outcome.

mod appointment_detail;
mod consultations;
mod create_appointment;
mod login;
mod patient_detail;
mod patients;
mod physio_detail;

pub use appointment_detail::*;
pub use consultations::*;
pub use create_appointment::*;
pub use login::*;
pub use patient_detail::*;
pub use patients::*;
pub use physio_detail::*;

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use futures::stream::BoxStream;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

use crate::repository::RepoError;
use crate::session::watch_stream;

/// Message shown for transport and decoding failures.
pub const UNEXPECTED_ERROR: &str = "Unexpected error";

/// Screen state.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Nothing requested yet
    Idle,
    /// Request in flight
    Loading,
    /// Last request succeeded
    Success(T),
    /// Last request failed, with a human-readable message
    Error(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            ViewState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Observable holder for one [`ViewState`].
pub struct StateCell<T> {
    sender: watch::Sender<ViewState<T>>,
}

impl<T> StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: ViewState<T>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Replace the state. Last write wins.
    pub fn set(&self, state: ViewState<T>) {
        self.sender.send_replace(state);
    }

    /// Current state snapshot.
    pub fn get(&self) -> ViewState<T> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.sender.subscribe()
    }

    /// Current state, then every change.
    pub fn observe(&self) -> BoxStream<'static, ViewState<T>> {
        watch_stream(self.sender.subscribe())
    }

    /// Publish the outcome of a load and hand it back to the caller.
    ///
    /// Callers that need this call's outcome use the returned value; the
    /// cell may already hold a later call's result by the time they read it.
    pub(crate) fn resolve(&self, result: Result<T, String>) -> Result<T, String> {
        match &result {
            Ok(value) => self.set(ViewState::Success(value.clone())),
            Err(message) => {
                tracing::warn!(%message, "screen load failed");
                self.set(ViewState::Error(message.clone()));
            }
        }
        result
    }
}

impl<T> Default for StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(ViewState::Idle)
    }
}

/// Human-readable message for a repository failure.
///
/// Transport and storage failures collapse into [`UNEXPECTED_ERROR`].
pub fn describe(error: &RepoError) -> String {
    match error {
        RepoError::Api(_) | RepoError::Session(_) => UNEXPECTED_ERROR.to_string(),
        other => other.to_string(),
    }
}

/// Tasks bound to one screen's visible lifetime.
///
/// Dropping the scope aborts every task still running. Aborting stops the
/// task at its next await; a request already on the wire is not recalled.
#[derive(Default)]
pub struct ScreenScope {
    tasks: Mutex<Vec<AbortHandle>>,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task owned by this screen.
    pub fn launch<F>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle.abort_handle());
        handle
    }

    /// Abort every running task.
    pub fn cancel_all(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use futures::StreamExt;

    #[test]
    fn test_view_state_accessors() {
        let state: ViewState<u32> = ViewState::Success(3);
        assert_eq!(state.success(), Some(&3));
        assert_eq!(state.error(), None);

        let state: ViewState<u32> = ViewState::Error("boom".into());
        assert_eq!(state.error(), Some("boom"));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_describe_hides_transport_details() {
        let err = RepoError::Api(ApiError::Status {
            status: 502,
            body: "<html>Bad gateway</html>".into(),
        });
        assert_eq!(describe(&err), UNEXPECTED_ERROR);
        assert_eq!(describe(&RepoError::Backend("Forbidden".into())), "Forbidden");
        assert_eq!(describe(&RepoError::InvalidToken), "Invalid token");
    }

    #[tokio::test]
    async fn test_state_cell_observe() {
        let cell: StateCell<u32> = StateCell::default();
        let mut states = cell.observe();
        assert_eq!(states.next().await, Some(ViewState::Idle));

        cell.set(ViewState::Loading);
        assert_eq!(states.next().await, Some(ViewState::Loading));

        assert_eq!(cell.resolve(Ok(5)), Ok(5));
        assert_eq!(states.next().await, Some(ViewState::Success(5)));

        assert_eq!(cell.resolve(Err("boom".into())), Err("boom".to_string()));
        assert_eq!(states.next().await, Some(ViewState::Error("boom".into())));
    }

    #[tokio::test]
    async fn test_scope_drop_aborts_tasks() {
        let scope = ScreenScope::new();
        let (_tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = scope.launch(async move {
            let _ = rx.await;
        });

        drop(scope);
        let result = handle.await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
