use std::path::PathBuf;

use clap::Parser;

use crate::detail::DetailRoute;

#[derive(Parser, Debug)]
#[command(name = "soop", version, about = "Browse a GitHub repository and its owner")]
pub struct Args {
    /// Repository owner, or `owner/repo`
    pub user: Option<String>,

    /// Repository name
    pub repo: Option<String>,

    /// Load configuration from this file instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Navigation arguments for the detail screen.
    pub fn route(&self) -> DetailRoute {
        match (&self.user, &self.repo) {
            (Some(user), None) => match user.split_once('/') {
                Some((owner, repo)) => {
                    DetailRoute::new(Some(owner.to_string()), Some(repo.to_string()))
                }
                None => DetailRoute::new(Some(user.clone()), None),
            },
            (user, repo) => DetailRoute::new(user.clone(), repo.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("soop").chain(args.iter().copied()))
    }

    #[test]
    fn test_owner_and_repo() {
        let route = parse(&["octocat", "Hello-World"]).route();
        assert_eq!(route.user_name.as_deref(), Some("octocat"));
        assert_eq!(route.repo_name.as_deref(), Some("Hello-World"));
    }

    #[test]
    fn test_slash_form() {
        let route = parse(&["octocat/Hello-World"]).route();
        assert_eq!(route.user_name.as_deref(), Some("octocat"));
        assert_eq!(route.repo_name.as_deref(), Some("Hello-World"));
    }

    #[test]
    fn test_missing_arguments() {
        assert_eq!(parse(&[]).route(), DetailRoute::default());
        assert_eq!(parse(&["octocat"]).route().repo_name, None);
    }

    #[test]
    fn test_config_flag() {
        let args = parse(&["--config", "/tmp/soop.toml", "octocat/Hello-World"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/soop.toml")));
    }
}
