//! GitHub REST API access.
//!
//! [`GithubClient`] backs both data sources of the detail screen.

mod client;
mod model;

pub use client::GithubClient;
pub use model::{RepoDetailRaw, UserDetailRaw};
