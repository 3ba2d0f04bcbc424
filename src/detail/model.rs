//! Display models for the detail screen.
//!
//! Raw API payloads are mapped here into the shape the view renders:
//! counts are abbreviated and timestamps reduced to dates.

use chrono::{DateTime, Utc};

use crate::github::{RepoDetailRaw, UserDetailRaw};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDetail {
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub language: Option<String>,
    pub license: Option<String>,
    pub default_branch: String,
    pub topics: Vec<String>,
    pub stars: String,
    pub forks: String,
    pub watchers: String,
    pub open_issues: String,
    pub updated: Option<String>,
    pub is_fork: bool,
    pub is_archived: bool,
}

impl From<RepoDetailRaw> for RepoDetail {
    fn from(raw: RepoDetailRaw) -> Self {
        Self {
            full_name: raw.full_name,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            url: raw.html_url,
            language: raw.language,
            license: raw.license.map(|l| l.spdx_id.unwrap_or(l.name)),
            default_branch: raw.default_branch,
            topics: raw.topics,
            stars: format_count(raw.stargazers_count),
            forks: format_count(raw.forks_count),
            watchers: format_count(raw.subscribers_count.unwrap_or(raw.watchers_count)),
            open_issues: format_count(raw.open_issues_count),
            updated: raw.updated_at.as_ref().map(format_date),
            is_fork: raw.fork,
            is_archived: raw.archived,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetail {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub email: Option<String>,
    pub url: String,
    pub public_repos: String,
    pub followers: String,
    pub following: String,
    pub joined: Option<String>,
}

impl UserDetail {
    /// Name to show in headers: the profile name, or the login.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

impl From<UserDetailRaw> for UserDetail {
    fn from(raw: UserDetailRaw) -> Self {
        Self {
            login: raw.login,
            name: non_blank(raw.name),
            bio: non_blank(raw.bio),
            company: non_blank(raw.company),
            location: non_blank(raw.location),
            blog: non_blank(raw.blog),
            email: non_blank(raw.email),
            url: raw.html_url,
            public_repos: format_count(raw.public_repos),
            followers: format_count(raw.followers),
            following: format_count(raw.following),
            joined: raw.created_at.as_ref().map(format_date),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// Abbreviate a count: `999`, `1.2k`, `12k`, `3.4m`.
fn format_count(count: u64) -> String {
    let (unit, suffix) = match count {
        0..1_000 => return count.to_string(),
        1_000..1_000_000 => (1_000, "k"),
        _ => (1_000_000, "m"),
    };
    let whole = count / unit;
    let tenth = (count % unit) * 10 / unit;
    if whole >= 10 || tenth == 0 {
        format!("{whole}{suffix}")
    } else {
        format!("{whole}.{tenth}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1k");
        assert_eq!(format_count(1_250), "1.2k");
        assert_eq!(format_count(12_999), "12k");
        assert_eq!(format_count(3_400_000), "3.4m");
    }

    #[test]
    fn test_repo_detail_mapping() {
        let raw: RepoDetailRaw = serde_json::from_value(json!({
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "owner": { "login": "octocat" },
            "description": "  ",
            "html_url": "https://github.com/octocat/Hello-World",
            "language": "Rust",
            "license": { "name": "MIT License", "spdx_id": "MIT" },
            "default_branch": "main",
            "stargazers_count": 2_512,
            "forks_count": 10,
            "watchers_count": 2_512,
            "subscribers_count": 40,
            "open_issues_count": 0,
            "updated_at": "2024-03-01T12:30:00Z"
        }))
        .unwrap();

        let detail = RepoDetail::from(raw);
        assert_eq!(detail.full_name, "octocat/Hello-World");
        assert_eq!(detail.description, None);
        assert_eq!(detail.license.as_deref(), Some("MIT"));
        assert_eq!(detail.stars, "2.5k");
        assert_eq!(detail.watchers, "40");
        assert_eq!(detail.updated.as_deref(), Some("2024-03-01"));
        assert!(detail.topics.is_empty());
    }

    #[test]
    fn test_user_detail_display_name_falls_back_to_login() {
        let raw: UserDetailRaw = serde_json::from_value(json!({
            "login": "octocat",
            "name": "",
            "html_url": "https://github.com/octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/583231",
            "followers": 5,
            "created_at": "2011-01-25T18:44:36Z"
        }))
        .unwrap();

        let detail = UserDetail::from(raw);
        assert_eq!(detail.display_name(), "octocat");
        assert_eq!(detail.followers, "5");
        assert_eq!(detail.joined.as_deref(), Some("2011-01-25"));
    }
}
