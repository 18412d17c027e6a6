//! Keyword normalization, domain matching and rank bookkeeping.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;

/// Maximum length of a keyword term, in characters.
pub const MAX_TERM_LENGTH: usize = 200;

/// Maximum number of terms accepted in one batch create request.
pub const MAX_BATCH_SIZE: usize = 100;

/// How deep into the results a rank check looks. A domain that does not
/// appear within this many results is "not ranking".
pub const RANK_CHECK_DEPTH: usize = 100;

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$").expect("valid regex")
});

/// Lowercase, trim and collapse internal whitespace.
pub fn normalize_term(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalize and validate a batch of terms, dropping duplicates while
/// keeping first-seen order.
pub fn normalize_batch(terms: &[String]) -> Result<Vec<String>, CoreError> {
    if terms.is_empty() {
        return Err(CoreError::Validation("At least one keyword is required".into()));
    }
    if terms.len() > MAX_BATCH_SIZE {
        return Err(CoreError::Validation(format!(
            "At most {MAX_BATCH_SIZE} keywords can be added at once"
        )));
    }

    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for raw in terms {
        let term = normalize_term(raw);
        if term.is_empty() {
            return Err(CoreError::Validation("Keywords must not be blank".into()));
        }
        if term.chars().count() > MAX_TERM_LENGTH {
            return Err(CoreError::Validation(format!(
                "Keyword exceeds {MAX_TERM_LENGTH} characters"
            )));
        }
        if !out.contains(&term) {
            out.push(term);
        }
    }
    Ok(out)
}

/// Reduce a user-supplied domain or URL to its bare lowercase host without a
/// leading `www.`. Returns `None` when the result is not a plausible domain.
pub fn normalize_domain(input: &str) -> Option<String> {
    let lower = input.trim().to_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host.rsplit_once('@').map_or(host, |(_, h)| h);
    let host = host.split(':').next().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.trim_end_matches('.');

    DOMAIN_RE.is_match(host).then(|| host.to_string())
}

/// Position of the first result whose host is `domain` or a subdomain of it.
///
/// `results` are `(position, url)` pairs in rank order.
pub fn find_domain_position<'a>(
    results: impl IntoIterator<Item = (i32, &'a str)>,
    domain: &str,
) -> Option<i32> {
    results.into_iter().find_map(|(position, url)| {
        let host = normalize_domain(url)?;
        let matches = host == domain || host.ends_with(&format!(".{domain}"));
        matches.then_some(position)
    })
}

/// Rank columns after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankUpdate {
    pub current_position: Option<i32>,
    pub previous_position: Option<i32>,
    pub best_position: Option<i32>,
}

/// Compute the new rank columns from the stored ones and a fresh observation.
///
/// Lower positions are better; `None` means not ranking.
pub fn apply_rank_observation(
    current: Option<i32>,
    best: Option<i32>,
    observed: Option<i32>,
) -> RankUpdate {
    let best_position = match (best, observed) {
        (Some(b), Some(o)) => Some(b.min(o)),
        (b, o) => b.or(o),
    };
    RankUpdate {
        current_position: observed,
        previous_position: current,
        best_position,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn terms_are_normalized() {
        assert_eq!(normalize_term("  Best   Running\tShoes "), "best running shoes");
    }

    #[test]
    fn batch_drops_duplicates_after_normalization() {
        let terms = vec!["SEO tools".to_string(), "seo  tools".to_string(), "rank".to_string()];
        assert_eq!(normalize_batch(&terms).unwrap(), vec!["seo tools", "rank"]);
    }

    #[test]
    fn batch_rejects_blank_and_oversized_input() {
        assert_matches!(normalize_batch(&[]), Err(CoreError::Validation(_)));
        assert_matches!(normalize_batch(&["   ".to_string()]), Err(CoreError::Validation(_)));
        let long = "a".repeat(MAX_TERM_LENGTH + 1);
        assert_matches!(normalize_batch(&[long]), Err(CoreError::Validation(_)));
        let many: Vec<String> = (0..=MAX_BATCH_SIZE).map(|i| format!("kw {i}")).collect();
        assert_matches!(normalize_batch(&many), Err(CoreError::Validation(_)));
    }

    #[test]
    fn domains_are_reduced_to_bare_hosts() {
        assert_eq!(normalize_domain("https://www.Example.com/path?q=1").as_deref(), Some("example.com"));
        assert_eq!(normalize_domain("blog.example.co.uk").as_deref(), Some("blog.example.co.uk"));
        assert_eq!(normalize_domain("http://example.com:8080").as_deref(), Some("example.com"));
        assert_eq!(normalize_domain("not a domain"), None);
        assert_eq!(normalize_domain("localhost"), None);
    }

    #[test]
    fn finds_first_matching_result_including_subdomains() {
        let results = vec![
            (1, "https://competitor.com/a"),
            (2, "https://notexample.com/"),
            (3, "https://blog.example.com/post"),
            (4, "https://example.com/"),
        ];
        assert_eq!(find_domain_position(results, "example.com"), Some(3));
    }

    #[test]
    fn missing_domain_is_not_ranking() {
        let results = vec![(1, "https://a.com"), (2, "https://b.com")];
        assert_eq!(find_domain_position(results, "example.com"), None);
    }

    #[test]
    fn rank_observation_tracks_best_and_previous() {
        let first = apply_rank_observation(None, None, Some(12));
        assert_eq!(first.best_position, Some(12));
        assert_eq!(first.previous_position, None);

        let improved = apply_rank_observation(Some(12), Some(12), Some(5));
        assert_eq!(improved.best_position, Some(5));
        assert_eq!(improved.previous_position, Some(12));

        let dropped = apply_rank_observation(Some(5), Some(5), None);
        assert_eq!(dropped.current_position, None);
        assert_eq!(dropped.best_position, Some(5));
    }
}
