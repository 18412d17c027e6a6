//! Language-model provider selection and content-brief prompts.

use serde::{Deserialize, Serialize};

use crate::integrations::IntegrationProvider;

/// Default model per provider.
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// Upper bound on generated tokens for a content brief.
pub const BRIEF_MAX_TOKENS: u32 = 2000;

/// Maximum number of competitor results quoted in a brief prompt.
pub const BRIEF_MAX_COMPETITORS: usize = 10;

/// Fallback order when the workspace has no preference (or its preferred
/// provider has no key).
pub const PROVIDER_ORDER: [LlmProvider; 2] = [LlmProvider::Openai, LlmProvider::Anthropic];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Openai,
    Anthropic,
}

impl LlmProvider {
    pub fn as_str(self) -> &'static str {
        self.integration().as_str()
    }

    pub fn parse(value: &str) -> Option<Self> {
        PROVIDER_ORDER.into_iter().find(|p| p.as_str() == value)
    }

    /// The integration whose credentials this provider uses.
    pub fn integration(self) -> IntegrationProvider {
        match self {
            Self::Openai => IntegrationProvider::Openai,
            Self::Anthropic => IntegrationProvider::Anthropic,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Openai => OPENAI_DEFAULT_MODEL,
            Self::Anthropic => ANTHROPIC_DEFAULT_MODEL,
        }
    }
}

/// Pick the provider to use given which ones currently have a usable key.
///
/// The workspace preference is honoured when available; otherwise the first
/// provider in [`PROVIDER_ORDER`] with a key wins.
pub fn select_provider(
    preferred: Option<LlmProvider>,
    available: &[LlmProvider],
) -> Option<LlmProvider> {
    if let Some(p) = preferred.filter(|p| available.contains(p)) {
        return Some(p);
    }
    PROVIDER_ORDER
        .into_iter()
        .find(|p| available.contains(p))
}

/// A system + user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// One competing page from the search results, as quoted in a brief prompt.
#[derive(Debug, Clone)]
pub struct CompetitorPage {
    pub position: i32,
    pub title: String,
    pub url: String,
}

/// Build the prompt that asks the model for a content brief.
pub fn build_brief_prompt(
    target_keyword: &str,
    title: &str,
    domain: Option<&str>,
    competitors: &[CompetitorPage],
) -> Prompt {
    let system = "You are an SEO content strategist. Write concise, actionable content \
                  briefs in Markdown with these sections: Search intent, Suggested title, \
                  Outline (H2/H3), Key questions to answer, Related terms, Word count target."
        .to_string();

    let mut user = format!("Target keyword: \"{}\"\nWorking title: \"{}\"\n", target_keyword.trim(), title.trim());
    if let Some(domain) = domain {
        user.push_str(&format!("Publishing site: {domain}\n"));
    }

    if competitors.is_empty() {
        user.push_str("\nNo search results are available; rely on general knowledge of the topic.\n");
    } else {
        user.push_str("\nCurrent top-ranking pages:\n");
        for c in competitors.iter().take(BRIEF_MAX_COMPETITORS) {
            user.push_str(&format!("{}. {} ({})\n", c.position, c.title, c.url));
        }
        user.push_str("\nThe brief should cover what these pages cover and close their gaps.\n");
    }

    Prompt { system, user }
}
