//! Data sources the detail screen depends on.
//!
//! The two sources have deliberately different shapes: the repository is a
//! single fallible request, while the user profile is a stream that may emit
//! several values (cached, then fresh) and may fail part way through.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::github::{RepoDetailRaw, UserDetailRaw};

/// Why a fetch failed. The screen treats every variant the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

pub type UserDetailStream = BoxStream<'static, Result<UserDetailRaw, FetchError>>;

#[async_trait]
pub trait RepoDetailSource: Send + Sync {
    /// Fetch a single repository owned by `user_name`.
    async fn fetch_repo_detail(
        &self,
        user_name: &str,
        repo_name: &str,
    ) -> Result<RepoDetailRaw, FetchError>;
}

pub trait UserDetailSource: Send + Sync {
    /// Stream the profile of `user_name`.
    ///
    /// The stream is lazy: nothing is requested until it is polled. It ends
    /// after the first error.
    fn fetch_user_detail(&self, user_name: &str) -> UserDetailStream;
}
