//! GitHub REST client for filing contact submissions as issues.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

const GITHUB_API_BASE: &str = "https://api.github.com";

/// Payload sent to the issues endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
}

/// The created issue (subset of fields we care about).
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub number: i64,
    pub html_url: String,
}

/// Where accepted submissions end up.
///
/// The HTTP handler talks to this trait so tests can swap in a recording
/// fake instead of the live GitHub client.
#[async_trait]
pub trait IssueSink: Send + Sync {
    async fn create_issue(&self, issue: NewIssue) -> anyhow::Result<CreatedIssue>;
}

/// Live GitHub issue sink for a single repository.
pub struct GitHubIssues {
    client: reqwest::Client,
    token: String,
    repo: String,
    api_base: String,
}

impl GitHubIssues {
    pub fn new(token: String, repo: String) -> Self {
        Self::with_api_base(token, repo, GITHUB_API_BASE.to_string())
    }

    pub fn with_api_base(token: String, repo: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            repo,
            api_base,
        }
    }
}

#[async_trait]
impl IssueSink for GitHubIssues {
    async fn create_issue(&self, issue: NewIssue) -> anyhow::Result<CreatedIssue> {
        let url = format!("{}/repos/{}/issues", self.api_base, self.repo);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "formgate")
            .json(&issue)
            .send()
            .await
            .context("Failed to send issue request to GitHub")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("GitHub issues API returned {}: {}", status, text.trim());
        }

        resp.json::<CreatedIssue>()
            .await
            .context("Failed to parse issue response from GitHub")
    }
}

/// Known GitHub token prefixes.
/// See: https://github.blog/2021-04-05-behind-githubs-new-authentication-token-formats/
const GITHUB_TOKEN_PREFIXES: &[&str] = &[
    "ghp_",        // Personal access tokens (classic)
    "github_pat_", // Fine-grained personal access tokens
    "gho_",        // OAuth access tokens
    "ghu_",        // GitHub App user-to-server tokens
    "ghs_",        // GitHub App server-to-server tokens
];

/// Format check only — does not verify the token is active or scoped.
pub fn is_valid_github_token(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    GITHUB_TOKEN_PREFIXES
        .iter()
        .any(|prefix| token.starts_with(prefix))
}

/// Validate an "owner/repo" slug, returning it normalized.
pub fn parse_owner_repo(slug: &str) -> Option<String> {
    let slug = slug.trim().trim_end_matches('/').trim_end_matches(".git");
    let parts: Vec<&str> = slug.split('/').collect();
    if parts.len() == 2
        && !parts[0].is_empty()
        && !parts[1].is_empty()
        && !parts[0].contains(':')
        && !parts[0].contains('.')
    {
        Some(format!("{}/{}", parts[0], parts[1]))
    } else {
        None
    }
}

/// Title for a filed submission: `Contact: {name} ({timestamp})`.
pub fn issue_title(name: &str, at: DateTime<Utc>) -> String {
    let name = if name.is_empty() { "Anonymous" } else { name };
    format!(
        "Contact: {} ({})",
        name,
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Markdown body for a filed submission.
pub fn issue_body(
    message: &str,
    name: &str,
    email: &str,
    phone: &str,
    subject: &str,
    client_ip: &str,
) -> String {
    let name = if name.is_empty() { "Anonymous" } else { name };
    let email = if email.is_empty() { "Not provided" } else { email };
    let mut body = format!("**Message**:\n{message}\n\n**From**: {name}\n**Email**: {email}");
    if !phone.is_empty() {
        body.push_str(&format!("\n**Phone**: {phone}"));
    }
    if !subject.is_empty() {
        body.push_str(&format!("\n**Subject**: {subject}"));
    }
    body.push_str(&format!("\n**IP**: {client_ip}"));
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // ── is_valid_github_token ────────────────────────────────────────

    #[test]
    fn test_known_prefixes_are_valid() {
        assert!(is_valid_github_token("ghp_abc123def456"));
        assert!(is_valid_github_token("github_pat_abc123"));
        assert!(is_valid_github_token("gho_abc123"));
        assert!(is_valid_github_token("ghu_xyz789"));
        assert!(is_valid_github_token("ghs_xyz789"));
    }

    #[test]
    fn test_empty_token_is_invalid() {
        assert!(!is_valid_github_token(""));
    }

    #[test]
    fn test_random_string_is_invalid() {
        assert!(!is_valid_github_token("not-a-token"));
    }

    #[test]
    fn test_token_with_leading_space_is_invalid() {
        assert!(!is_valid_github_token(" ghp_abc123"));
    }

    // ── parse_owner_repo ─────────────────────────────────────────────

    #[test]
    fn test_parse_simple_slug() {
        assert_eq!(
            parse_owner_repo("owner/repo"),
            Some("owner/repo".to_string())
        );
    }

    #[test]
    fn test_parse_slug_with_git_suffix() {
        assert_eq!(
            parse_owner_repo("owner/repo.git"),
            Some("owner/repo".to_string())
        );
    }

    #[test]
    fn test_parse_slug_with_trailing_slash() {
        assert_eq!(
            parse_owner_repo("owner/repo/"),
            Some("owner/repo".to_string())
        );
    }

    #[test]
    fn test_parse_missing_repo() {
        assert_eq!(parse_owner_repo("owner"), None);
        assert_eq!(parse_owner_repo("owner/"), None);
    }

    #[test]
    fn test_parse_too_many_segments() {
        assert_eq!(parse_owner_repo("a/b/c"), None);
    }

    #[test]
    fn test_parse_url_is_not_a_slug() {
        assert_eq!(parse_owner_repo("https://github.com/owner/repo"), None);
    }

    #[test]
    fn test_parse_empty_string() {
        assert_eq!(parse_owner_repo(""), None);
    }

    // ── issue templating ─────────────────────────────────────────────

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_title_includes_name_and_timestamp() {
        let title = issue_title("Ada", fixed_time());
        assert_eq!(title, "Contact: Ada (2024-05-01T12:30:00.000Z)");
    }

    #[test]
    fn test_title_falls_back_to_anonymous() {
        let title = issue_title("", fixed_time());
        assert!(title.starts_with("Contact: Anonymous ("));
    }

    #[test]
    fn test_body_contains_all_required_sections() {
        let body = issue_body("Hello there", "Ada", "ada@example.com", "", "", "1.2.3.4");
        assert!(body.contains("**Message**:\nHello there"));
        assert!(body.contains("**From**: Ada"));
        assert!(body.contains("**Email**: ada@example.com"));
        assert!(body.contains("**IP**: 1.2.3.4"));
        assert!(!body.contains("**Phone**"));
        assert!(!body.contains("**Subject**"));
    }

    #[test]
    fn test_body_fallbacks_for_missing_fields() {
        let body = issue_body("Hi", "", "", "", "", "unknown");
        assert!(body.contains("**From**: Anonymous"));
        assert!(body.contains("**Email**: Not provided"));
        assert!(body.contains("**IP**: unknown"));
    }

    #[test]
    fn test_body_includes_optional_fields_when_present() {
        let body = issue_body("Hi", "Ada", "a@b.c", "555-0100", "Question", "1.2.3.4");
        assert!(body.contains("**Phone**: 555-0100"));
        assert!(body.contains("**Subject**: Question"));
    }

    // ── wire types ───────────────────────────────────────────────────

    #[test]
    fn test_created_issue_deserialize() {
        let json = r#"{
            "number": 42,
            "html_url": "https://github.com/owner/repo/issues/42",
            "state": "open",
            "title": "Contact: Ada"
        }"#;
        let issue: CreatedIssue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.number, 42);
        assert_eq!(issue.html_url, "https://github.com/owner/repo/issues/42");
    }

    #[test]
    fn test_new_issue_serializes_title_and_body() {
        let issue = NewIssue {
            title: "Contact: Ada".to_string(),
            body: "**Message**:\nHi".to_string(),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["title"], "Contact: Ada");
        assert!(json["body"].as_str().unwrap().starts_with("**Message**"));
    }
}
