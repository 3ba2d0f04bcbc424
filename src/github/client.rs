use async_trait::async_trait;
use color_eyre::eyre::eyre;
use futures::{StreamExt, stream};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::GithubConfig;
use crate::detail::{FetchError, RepoDetailSource, UserDetailSource, UserDetailStream};
use crate::github::model::{RepoDetailRaw, UserDetailRaw};

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

#[derive(Clone, Debug)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GithubClient {
    /// Create a client for the API described by `config`.
    ///
    /// Sends the configured token as a bearer token when present.
    pub fn new(config: &GithubConfig) -> color_eyre::Result<Self> {
        let base_url = Url::parse(&config.api_base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(eyre!("Invalid GitHub API URL: {}", config.api_base_url));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<RepoDetailRaw, FetchError> {
        self.get_json(&["repos", owner, repo]).await
    }

    pub async fn get_user(&self, user_name: &str) -> Result<UserDetailRaw, FetchError> {
        self.get_json(&["users", user_name]).await
    }

    /// Build `{base}/{segments...}`, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, FetchError> {
        let resource = segments[1..].join("/");
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(FetchError::NotFound(resource));
        }

        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        check_status(response.status(), &resource)?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

fn check_status(status: StatusCode, resource: &str) -> Result<(), FetchError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(FetchError::NotFound(resource.to_string())),
        s => Err(FetchError::Status(s.as_u16())),
    }
}

#[async_trait]
impl RepoDetailSource for GithubClient {
    async fn fetch_repo_detail(
        &self,
        user_name: &str,
        repo_name: &str,
    ) -> Result<RepoDetailRaw, FetchError> {
        self.get_repo(user_name, repo_name).await
    }
}

impl UserDetailSource for GithubClient {
    fn fetch_user_detail(&self, user_name: &str) -> UserDetailStream {
        let client = self.clone();
        let user_name = user_name.to_string();
        stream::once(async move { client.get_user(&user_name).await }).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GithubClient {
        GithubClient::new(&GithubConfig {
            api_base_url: base.to_string(),
            ..GithubConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client("https://api.github.com");
        assert_eq!(
            client.endpoint(&["repos", "octocat", "Hello-World"]).as_str(),
            "https://api.github.com/repos/octocat/Hello-World"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_escapes() {
        let client = client("https://ghe.example.com/api/v3/");
        assert_eq!(
            client.endpoint(&["users", "a b/c"]).as_str(),
            "https://ghe.example.com/api/v3/users/a%20b%2Fc"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = GithubConfig {
            api_base_url: "mailto:octocat@github.com".to_string(),
            ..GithubConfig::default()
        };
        assert!(GithubClient::new(&config).is_err());
    }

    #[test]
    fn test_check_status() {
        assert_eq!(check_status(StatusCode::OK, "octocat"), Ok(()));
        assert_eq!(
            check_status(StatusCode::NOT_FOUND, "octocat/missing"),
            Err(FetchError::NotFound("octocat/missing".to_string()))
        );
        assert_eq!(
            check_status(StatusCode::FORBIDDEN, "octocat"),
            Err(FetchError::Status(403))
        );
    }

    #[tokio::test]
    async fn test_empty_names_fail_without_request() {
        // Unroutable base: any real request would fail with a network error.
        let client = client("http://127.0.0.1:9");
        assert_eq!(
            client.fetch_repo_detail("", "").await,
            Err(FetchError::NotFound("/".to_string()))
        );

        let items: Vec<_> = client.fetch_user_detail("").collect().await;
        assert_eq!(items, vec![Err(FetchError::NotFound(String::new()))]);
    }

    #[test]
    fn test_decode_repo_payload() {
        let body = r#"{
            "id": 1296269,
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "owner": { "login": "octocat", "id": 1 },
            "private": false,
            "html_url": "https://github.com/octocat/Hello-World",
            "description": "This your first repo!",
            "fork": false,
            "language": null,
            "forks_count": 9,
            "stargazers_count": 80,
            "watchers_count": 80,
            "subscribers_count": 42,
            "open_issues_count": 0,
            "default_branch": "master",
            "topics": ["octocat", "api"],
            "archived": false,
            "license": { "key": "mit", "name": "MIT License", "spdx_id": "MIT" },
            "updated_at": "2011-01-26T19:14:43Z"
        }"#;

        let repo: RepoDetailRaw = serde_json::from_str(body).unwrap();
        assert_eq!(repo.full_name, "octocat/Hello-World");
        assert_eq!(repo.language, None);
        assert_eq!(repo.subscribers_count, Some(42));
        assert_eq!(repo.topics, vec!["octocat", "api"]);
    }
}
