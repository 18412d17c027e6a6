//! Third-party integration providers and bring-your-own-key resolution.
//!
//! A workspace may store its own credentials for a provider (encrypted, see
//! [`crate::credentials`]). When it has none, the platform-wide key from the
//! environment is used. When neither exists the integration is unavailable.

use serde::{Deserialize, Serialize};

/// Field inside a decrypted credential blob that holds the API key.
pub const API_KEY_FIELD: &str = "api_key";

/// Number of trailing key characters shown in a credential hint.
const HINT_VISIBLE_CHARS: usize = 4;

/// Keys shorter than this never reveal any characters in their hint.
const HINT_MIN_KEY_LEN: usize = 12;

/// Providers a workspace can configure credentials for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationProvider {
    Serp,
    Openai,
    Anthropic,
    Pagespeed,
}

impl IntegrationProvider {
    pub const ALL: [IntegrationProvider; 4] = [
        Self::Serp,
        Self::Openai,
        Self::Anthropic,
        Self::Pagespeed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Serp => "serp",
            Self::Openai => "openai",
            Self::Anthropic => "anthropic",
            Self::Pagespeed => "pagespeed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }

    /// Environment variable holding the platform-wide fallback key.
    pub fn platform_env_var(self) -> &'static str {
        match self {
            Self::Serp => "SERP_API_KEY",
            Self::Openai => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Pagespeed => "PAGESPEED_API_KEY",
        }
    }
}

impl std::fmt::Display for IntegrationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    Workspace,
    Platform,
}

/// An API key ready to use, with its provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: String,
    pub source: KeySource,
}

impl std::fmt::Debug for ResolvedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedKey")
            .field("key", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

/// Extract a non-blank `api_key` from a decrypted credential blob.
pub fn api_key_from_credentials(credentials: &serde_json::Value) -> Option<&str> {
    credentials
        .get(API_KEY_FIELD)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|k| !k.is_empty())
}

/// Resolve the key for one provider.
///
/// `workspace_credentials` is the decrypted blob of an enabled workspace
/// config (if any); `platform_key` is the environment fallback.
pub fn resolve_api_key(
    workspace_credentials: Option<&serde_json::Value>,
    platform_key: Option<&str>,
) -> Option<ResolvedKey> {
    if let Some(key) = workspace_credentials.and_then(api_key_from_credentials) {
        return Some(ResolvedKey {
            key: key.to_string(),
            source: KeySource::Workspace,
        });
    }

    platform_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| ResolvedKey {
            key: k.to_string(),
            source: KeySource::Platform,
        })
}

/// Masked display form of a credential, e.g. `••••abcd`.
pub fn credential_hint(credentials: &serde_json::Value) -> Option<String> {
    let key = api_key_from_credentials(credentials)?;
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < HINT_MIN_KEY_LEN {
        return Some("••••".to_string());
    }
    let tail: String = chars[chars.len() - HINT_VISIBLE_CHARS..].iter().collect();
    Some(format!("••••{tail}"))
}
