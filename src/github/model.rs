//! Raw payloads of the GitHub REST API.
//!
//! Only the fields the detail screen shows are deserialized.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response of `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoDetailRaw {
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    pub license: Option<LicenseRaw>,
    pub default_branch: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    /// Real watcher count. Only present on the single-repository endpoint.
    pub subscribers_count: Option<u64>,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LicenseRaw {
    pub name: String,
    pub spdx_id: Option<String>,
}

/// Response of `GET /users/{username}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserDetailRaw {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub email: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    pub created_at: Option<DateTime<Utc>>,
}
