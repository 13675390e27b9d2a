//! Hosted release creation on GitHub.
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ReleaseError;

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Public GitHub REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Global timeout for one API request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    /// Account or organisation.
    pub owner: String,
    /// Repository name without `.git`.
    pub name: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Extract the repository from a GitHub remote URL.
///
/// Accepts SSH (`git@github.com:owner/repo.git`) and HTTPS
/// (`https://github.com/owner/repo`) forms, with or without `.git`.
///
/// # Examples
///
/// ```
/// use submoduler_child::release::parse_github_repo;
///
/// let repo = parse_github_repo("git@github.com:acme/core.git").unwrap();
/// assert_eq!(repo.to_string(), "acme/core");
/// ```
///
/// # Errors
///
/// Returns [`ReleaseError::UnknownRemote`] for any other URL.
pub fn parse_github_repo(url: &str) -> Result<RepoId, ReleaseError> {
    let unknown = || ReleaseError::UnknownRemote(url.to_string());
    let trimmed = url.trim();

    let path = if let Some(rest) = trimmed.strip_prefix("git@github.com:") {
        rest
    } else {
        let after_scheme = ["https://", "http://", "ssh://", "git://"]
            .iter()
            .find_map(|scheme| trimmed.strip_prefix(scheme))
            .ok_or_else(unknown)?;
        let host_and_path = after_scheme
            .split_once('@')
            .filter(|(user, _)| !user.contains('/'))
            .map_or(after_scheme, |(_, rest)| rest);
        host_and_path
            .strip_prefix("github.com/")
            .ok_or_else(unknown)?
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    match path.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(RepoId {
                owner: owner.to_string(),
                name: name.to_string(),
            })
        }
        _ => Err(unknown()),
    }
}

/// A release to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Existing tag the release points at.
    pub tag: String,
    /// Release title.
    pub name: String,
    /// Release notes.
    pub body: String,
}

impl ReleaseRequest {
    /// The standard release for `tag`.
    #[must_use]
    pub fn for_tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            name: format!("Release {tag}"),
            body: "Automated release via Submoduler".to_string(),
        }
    }
}

/// Creates releases on a hosting service.
#[cfg_attr(test, mockall::automock)]
pub trait ReleasePublisher {
    /// Create `release` in `repo` and return its web URL.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::Api`] if the service rejects the request or
    /// cannot be reached.
    fn create_release(&self, repo: &RepoId, release: &ReleaseRequest)
    -> Result<String, ReleaseError>;
}

/// [`ReleasePublisher`] backed by the GitHub REST API.
pub struct GitHubReleases {
    agent: ureq::Agent,
    token: String,
    api_base: String,
}

impl fmt::Debug for GitHubReleases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubReleases")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct NewRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

#[derive(Deserialize)]
struct CreatedRelease {
    html_url: String,
}

impl GitHubReleases {
    /// Create a client for `api_base` authenticating with `token`.
    #[must_use]
    pub fn new(token: String, api_base: &str) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Client for the public API using `GITHUB_TOKEN`, or `None` when the
    /// variable is unset or empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(|token| Self::new(token, DEFAULT_API_BASE))
    }
}

impl ReleasePublisher for GitHubReleases {
    fn create_release(
        &self,
        repo: &RepoId,
        release: &ReleaseRequest,
    ) -> Result<String, ReleaseError> {
        let api_error = |reason: String| ReleaseError::Api {
            tag: release.tag.clone(),
            reason,
        };
        let url = format!("{}/repos/{repo}/releases", self.api_base);
        let payload = NewRelease {
            tag_name: &release.tag,
            name: &release.name,
            body: &release.body,
            draft: false,
            prerelease: false,
        };

        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", concat!("submoduler-child/", env!("CARGO_PKG_VERSION")))
            .send_json(&payload)
            .map_err(|e| api_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .body_mut()
                .read_json::<serde_json::Value>()
                .map_or_else(|_| String::new(), |body| error_detail(&body));
            return Err(api_error(format!("HTTP {}{detail}", status.as_u16())));
        }

        response
            .body_mut()
            .read_json::<CreatedRelease>()
            .map(|r| r.html_url)
            .map_err(|e| api_error(format!("unexpected response: {e}")))
    }
}

/// Summarise a GitHub error body: its `message` and any `errors[].code`.
fn error_detail(body: &serde_json::Value) -> String {
    let message = body.get("message").and_then(serde_json::Value::as_str);
    let codes: Vec<&str> = body
        .get("errors")
        .and_then(serde_json::Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("code").and_then(serde_json::Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    match (message, codes.is_empty()) {
        (None, _) => String::new(),
        (Some(m), true) => format!(": {m}"),
        (Some(m), false) => format!(": {m} ({})", codes.join(", ")),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn repo(url: &str) -> String {
        parse_github_repo(url).unwrap().to_string()
    }

    #[test]
    fn parses_ssh_remote() {
        assert_eq!(repo("git@github.com:acme/core.git"), "acme/core");
        assert_eq!(repo("git@github.com:acme/core"), "acme/core");
    }

    #[test]
    fn parses_https_remote() {
        assert_eq!(repo("https://github.com/acme/core.git"), "acme/core");
        assert_eq!(repo("https://github.com/acme/core"), "acme/core");
        assert_eq!(repo("https://github.com/acme/core/\n"), "acme/core");
        assert_eq!(repo("https://token@github.com/acme/core.git"), "acme/core");
        assert_eq!(repo("ssh://git@github.com/acme/core.git"), "acme/core");
    }

    #[test]
    fn rejects_other_hosts_and_shapes() {
        for url in [
            "https://gitlab.com/acme/core.git",
            "git@bitbucket.org:acme/core.git",
            "https://github.com/acme",
            "https://github.com/acme/core/tree/main",
            "/local/path/core.git",
            "",
        ] {
            assert!(
                matches!(parse_github_repo(url), Err(ReleaseError::UnknownRemote(_))),
                "{url:?} should be rejected"
            );
        }
    }

    #[test]
    fn standard_release_request() {
        let req = ReleaseRequest::for_tag("v1.2.4");
        assert_eq!(req.name, "Release v1.2.4");
        assert_eq!(req.body, "Automated release via Submoduler");
    }

    #[test]
    fn unreachable_api_is_an_api_error() {
        let client = GitHubReleases::new("t".to_string(), "http://127.0.0.1:9");
        let err = client
            .create_release(
                &RepoId {
                    owner: "acme".to_string(),
                    name: "core".to_string(),
                },
                &ReleaseRequest::for_tag("v0.0.1"),
            )
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Api { ref tag, .. } if tag == "v0.0.1"));
    }

    #[test]
    fn error_detail_includes_validation_codes() {
        let body = serde_json::json!({
            "message": "Validation Failed",
            "errors": [{"resource": "Release", "code": "already_exists", "field": "tag_name"}]
        });
        assert_eq!(error_detail(&body), ": Validation Failed (already_exists)");
        assert_eq!(
            error_detail(&serde_json::json!({"message": "Bad credentials"})),
            ": Bad credentials"
        );
        assert_eq!(error_detail(&serde_json::json!([])), "");
    }

    #[test]
    fn debug_hides_token() {
        let client = GitHubReleases::new("secret-token".to_string(), DEFAULT_API_BASE);
        assert!(!format!("{client:?}").contains("secret-token"));
    }
}
