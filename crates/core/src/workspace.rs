//! Workspace naming helpers.

use rand::Rng;

/// Maximum slug length before the random suffix.
const MAX_SLUG_BASE_LEN: usize = 48;

/// Length of the random suffix appended to keep slugs unique.
const SLUG_SUFFIX_LEN: usize = 6;

/// Lowercase ASCII slug of `name`: alphanumerics kept, everything else
/// collapsed into single hyphens. Falls back to `"workspace"` when nothing
/// survives.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
        if slug.len() >= MAX_SLUG_BASE_LEN {
            break;
        }
    }

    if slug.is_empty() {
        "workspace".to_string()
    } else {
        slug
    }
}

/// Slug with a short random suffix, e.g. `acme-seo-x3k9qa`.
pub fn unique_slug(name: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SLUG_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}-{suffix}", slugify(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Acme SEO -- Team!  "), "acme-seo-team");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Müller"), "caf-m-ller");
        assert_eq!(slugify("日本"), "workspace");
    }

    #[test]
    fn slugify_truncates_long_names() {
        let slug = slugify(&"a".repeat(200));
        assert_eq!(slug.len(), MAX_SLUG_BASE_LEN);
    }

    #[test]
    fn unique_slug_appends_suffix() {
        let slug = unique_slug("Acme");
        assert!(slug.starts_with("acme-"));
        assert_eq!(slug.len(), "acme-".len() + SLUG_SUFFIX_LEN);
    }
}
