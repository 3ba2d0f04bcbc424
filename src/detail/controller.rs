//! State controller for the repository detail screen.
//!
//! The controller is created once per screen activation and immediately
//! starts two independent fetches:
//! - the repository, a single request that sets `repo_detail` on success
//! - the owner's profile, a stream where every item replaces `user_detail`
//!
//! Both run as tokio tasks tied to the controller's [`CancellationToken`].
//! Closing or dropping the controller cancels them, and the store rejects
//! any write that races with the cancellation.
//!
//! Failures never leave the controller. Either fetch failing produces
//! [`SideEffect::ShowError`] followed by [`SideEffect::BackPreviousScreen`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::intent::Intent;
use super::model::{RepoDetail, UserDetail};
use super::side_effect::SideEffect;
use super::source::{FetchError, RepoDetailSource, UserDetailSource};
use super::state::UiState;
use crate::store::Store;

type DetailStore = Store<UiState, SideEffect>;

/// Navigation arguments of the detail screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRoute {
    pub user_name: Option<String>,
    pub repo_name: Option<String>,
}

impl DetailRoute {
    pub fn new(user_name: Option<String>, repo_name: Option<String>) -> Self {
        Self {
            user_name,
            repo_name,
        }
    }
}

pub struct SearchDetailController {
    store: Arc<DetailStore>,
    cancellation_token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    fetch_timeout: Option<Duration>,
}

impl SearchDetailController {
    /// Create the controller and start loading `route`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        route: DetailRoute,
        repo_source: Arc<dyn RepoDetailSource>,
        user_source: Arc<dyn UserDetailSource>,
    ) -> Self {
        Self::start(route, repo_source, user_source, None)
    }

    /// Like [`Self::new`], but each fetch step fails with
    /// [`FetchError::Timeout`] if it takes longer than `timeout`.
    pub fn with_fetch_timeout(
        route: DetailRoute,
        repo_source: Arc<dyn RepoDetailSource>,
        user_source: Arc<dyn UserDetailSource>,
        timeout: Duration,
    ) -> Self {
        Self::start(route, repo_source, user_source, Some(timeout))
    }

    fn start(
        route: DetailRoute,
        repo_source: Arc<dyn RepoDetailSource>,
        user_source: Arc<dyn UserDetailSource>,
        fetch_timeout: Option<Duration>,
    ) -> Self {
        let cancellation_token = CancellationToken::new();
        let mut controller = Self {
            store: Arc::new(Store::new(UiState::default(), cancellation_token.clone())),
            cancellation_token,
            tasks: Vec::with_capacity(2),
            fetch_timeout,
        };

        let user_name = route.user_name.unwrap_or_default();
        let repo_name = route.repo_name.unwrap_or_default();
        info!(%user_name, %repo_name, "Opening repository detail");

        controller.load_repo_detail(repo_source, user_name.clone(), repo_name);
        controller.load_user_detail(user_source, user_name);
        controller
    }

    /// Apply a user action. Runs synchronously.
    pub fn handle_intent(&self, intent: Intent) {
        debug!(?intent, "Handling intent");
        match intent {
            Intent::ClickMoreUserInfo => self.update_bottom_sheet_visible(true),
            Intent::TouchBottomSheetClose => self.update_bottom_sheet_visible(false),
        }
    }

    /// Subscribe to state. The receiver starts at the current snapshot.
    pub fn state(&self) -> watch::Receiver<UiState> {
        self.store.subscribe()
    }

    pub fn current_state(&self) -> UiState {
        self.store.current()
    }

    /// Take the side-effect stream. There is a single subscriber, so every
    /// call after the first returns `None`.
    pub fn take_side_effects(&self) -> Option<mpsc::Receiver<SideEffect>> {
        self.store.take_side_effects()
    }

    /// Cancel in-flight fetches and wait for their tasks to finish.
    ///
    /// After this returns no state change or side effect is published, and
    /// both streams end once the last handle to them is gone.
    pub async fn close(mut self) {
        self.store.close();
        for task in std::mem::take(&mut self.tasks) {
            match task.await {
                Err(e) if e.is_panic() => warn!("Detail fetch task panicked: {e}"),
                _ => {}
            }
        }
        debug!("Repository detail closed");
    }

    fn update_bottom_sheet_visible(&self, visible: bool) {
        self.store
            .reduce(|state| state.with_bottom_sheet_visible(visible));
    }

    fn load_repo_detail(
        &mut self,
        source: Arc<dyn RepoDetailSource>,
        user_name: String,
        repo_name: String,
    ) {
        self.store.reduce(|state| state.with_loading(true));

        let store = Arc::clone(&self.store);
        let timeout = self.fetch_timeout;
        self.spawn(async move {
            let result =
                with_timeout(timeout, source.fetch_repo_detail(&user_name, &repo_name)).await;
            match result {
                Ok(raw) => {
                    let detail = RepoDetail::from(raw);
                    store.reduce(|state| state.with_repo_detail(detail));
                }
                Err(e) => {
                    warn!(%user_name, %repo_name, "Failed to load repository: {e}");
                    post_failure(&store).await;
                }
            }
        });
    }

    fn load_user_detail(&mut self, source: Arc<dyn UserDetailSource>, user_name: String) {
        let store = Arc::clone(&self.store);
        let timeout = self.fetch_timeout;
        self.spawn(async move {
            let mut stream = source.fetch_user_detail(&user_name);
            store.reduce(|state| state.with_loading(true));

            let failure = loop {
                match with_timeout(timeout, async { stream.next().await.transpose() }).await {
                    Ok(Some(raw)) => {
                        let detail = UserDetail::from(raw);
                        store.reduce(|state| state.with_user_detail(detail));
                    }
                    Ok(None) => break None,
                    Err(e) => break Some(e),
                }
            };

            store.reduce(|state| state.with_loading(false));

            if let Some(e) = failure {
                warn!(%user_name, "Failed to load user: {e}");
                post_failure(&store).await;
            }
        });
    }

    fn spawn(&mut self, task: impl Future<Output = ()> + Send + 'static) {
        let cancellation_token = self.cancellation_token.clone();
        self.tasks.push(tokio::spawn(async move {
            tokio::select! {
                () = cancellation_token.cancelled() => {}
                () = task => {}
            }
        }));
    }
}

impl Drop for SearchDetailController {
    /// Cancels without joining. The store is closed under its state lock,
    /// so a task still running on another worker cannot publish afterwards.
    fn drop(&mut self) {
        self.store.close();
    }
}

async fn post_failure(store: &DetailStore) {
    store.post_side_effect(SideEffect::ShowError).await;
    store.post_side_effect(SideEffect::BackPreviousScreen).await;
}

async fn with_timeout<T>(
    timeout: Option<Duration>,
    fetch: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .unwrap_or(Err(FetchError::Timeout(limit))),
        None => fetch.await,
    }
}
