use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::Url;

/// Connection flags shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub struct Settings {
    /// API origin, e.g. https://api.openlearn.example
    #[arg(long, global = true, env = "OPENLEARN_API_BASE_URL")]
    pub base_url: Option<String>,

    /// Bearer token for authenticated endpoints
    #[arg(long, global = true, env = "OPENLEARN_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Read the bearer token from a file instead
    #[arg(long, global = true, conflicts_with = "token")]
    pub token_file: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl Settings {
    pub fn request_context(&self) -> anyhow::Result<RequestContext> {
        let base_url = match &self.base_url {
            Some(url) => url.clone(),
            None => std::env::var("VITE_API_BASE_URL")
                .context("OPENLEARN_API_BASE_URL (or VITE_API_BASE_URL) must be set")?,
        };

        let access_token = match &self.token_file {
            Some(path) => {
                let token = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read token file {}", path.display()))?;
                Some(token.trim().to_string())
            }
            None => self.token.clone(),
        }
        .filter(|token| !token.is_empty());

        RequestContext::new(&base_url, access_token, Duration::from_secs(self.timeout_secs))
    }
}

/// Everything a request needs besides its path and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    base_url: String,
    access_token: Option<String>,
    timeout: Duration,
}

impl RequestContext {
    pub fn new(
        base_url: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url.trim())
            .with_context(|| format!("invalid API base URL {base_url:?}"))?;
        if parsed.cannot_be_a_base() {
            bail!("API base URL {base_url:?} cannot carry paths");
        }
        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            access_token,
            timeout,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let context =
            RequestContext::new("https://api.openlearn.example/", None, Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            context.endpoint("/api/cohorts"),
            "https://api.openlearn.example/api/cohorts"
        );
    }

    #[test]
    fn rejects_unparseable_base() {
        assert!(RequestContext::new("openlearn", None, Duration::from_secs(5)).is_err());
        assert!(RequestContext::new("mailto:ops@openlearn.example", None, Duration::from_secs(5))
            .is_err());
    }

    #[test]
    fn token_file_wins_and_is_trimmed() {
        let path = std::env::temp_dir().join(format!("openlearn-token-{}", std::process::id()));
        std::fs::write(&path, "secret-token\n").unwrap();
        let settings = Settings {
            base_url: Some("http://localhost:4000".to_string()),
            token: None,
            token_file: Some(path.clone()),
            timeout_secs: 5,
        };
        let context = settings.request_context().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(context.access_token(), Some("secret-token"));
    }
}
