//! On-page SEO heuristic analyzer.
//!
//! Parses an HTML document and applies a fixed checklist. Every failed check
//! deducts a fixed number of points from a starting score of 100; the score
//! never goes below zero. The analysis is pure: fetching the page is done by
//! the integrations layer.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STARTING_SCORE: i32 = 100;

pub const TITLE_MIN_CHARS: usize = 30;
pub const TITLE_MAX_CHARS: usize = 60;
pub const META_DESCRIPTION_MIN_CHARS: usize = 120;
pub const META_DESCRIPTION_MAX_CHARS: usize = 160;
pub const MIN_WORD_COUNT: usize = 300;

const DEDUCT_MISSING_TITLE: i32 = 20;
const DEDUCT_TITLE_LENGTH: i32 = 5;
const DEDUCT_MISSING_META: i32 = 15;
const DEDUCT_META_LENGTH: i32 = 5;
const DEDUCT_MISSING_H1: i32 = 15;
const DEDUCT_MULTIPLE_H1: i32 = 5;
const DEDUCT_THIN_CONTENT: i32 = 10;
const DEDUCT_PER_IMAGE_MISSING_ALT: i32 = 2;
const DEDUCT_IMAGES_MISSING_ALT_CAP: i32 = 10;
const DEDUCT_MISSING_CANONICAL: i32 = 5;

/// Values of `seo_audits.status`.
pub mod audit_status {
    pub const PENDING: &str = "pending";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
}

/// Elements whose text is not visible page copy.
const NON_CONTENT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META: LazyLock<Selector> = LazyLock::new(|| selector("meta[name]"));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("link[rel]"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    MissingTitle,
    TitleLength,
    MissingMetaDescription,
    MetaDescriptionLength,
    MissingH1,
    MultipleH1,
    ThinContent,
    ImagesMissingAlt,
    MissingCanonical,
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoIssue {
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
    pub deduction: i32,
}

/// Raw measurements taken from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetrics {
    pub title: Option<String>,
    pub title_length: usize,
    pub meta_description: Option<String>,
    pub meta_description_length: usize,
    pub h1_count: usize,
    pub word_count: usize,
    pub image_count: usize,
    pub images_missing_alt: usize,
    pub canonical_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub score: i32,
    pub issues: Vec<SeoIssue>,
    pub metrics: PageMetrics,
}

impl AnalysisReport {
    pub fn has_issue(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Measure and score an HTML document.
pub fn analyze_html(html: &str) -> AnalysisReport {
    let document = Html::parse_document(html);
    let metrics = measure(&document);
    let issues = evaluate(&metrics);
    let deducted: i32 = issues.iter().map(|i| i.deduction).sum();

    AnalysisReport {
        score: (STARTING_SCORE - deducted).max(0),
        issues,
        metrics,
    }
}

fn measure(document: &Html) -> PageMetrics {
    let title = document
        .select(&TITLE)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let meta_description = document
        .select(&META)
        .find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|n| n.eq_ignore_ascii_case("description"))
        })
        .and_then(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|d| !d.is_empty());

    let canonical_url = document
        .select(&LINK)
        .find(|el| {
            el.value().attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|r| r.eq_ignore_ascii_case("canonical"))
            })
        })
        .and_then(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty());

    let mut image_count = 0;
    let mut images_missing_alt = 0;
    for img in document.select(&IMG) {
        image_count += 1;
        if !img.value().attr("alt").is_some_and(|alt| !alt.trim().is_empty()) {
            images_missing_alt += 1;
        }
    }

    let word_count = document
        .select(&BODY)
        .next()
        .map(visible_word_count)
        .unwrap_or(0);

    PageMetrics {
        title_length: title.as_deref().map_or(0, |t| t.chars().count()),
        title,
        meta_description_length: meta_description.as_deref().map_or(0, |d| d.chars().count()),
        meta_description,
        h1_count: document.select(&H1).count(),
        word_count,
        image_count,
        images_missing_alt,
        canonical_url,
    }
}

fn evaluate(m: &PageMetrics) -> Vec<SeoIssue> {
    let mut issues = Vec::new();
    let mut push = |code, severity, deduction, message: String| {
        issues.push(SeoIssue {
            code,
            severity,
            message,
            deduction,
        });
    };

    match m.title {
        None => push(
            IssueCode::MissingTitle,
            Severity::Critical,
            DEDUCT_MISSING_TITLE,
            "Page has no <title> tag".into(),
        ),
        Some(_) if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&m.title_length) => push(
            IssueCode::TitleLength,
            Severity::Warning,
            DEDUCT_TITLE_LENGTH,
            format!(
                "Title is {} characters; aim for {TITLE_MIN_CHARS}-{TITLE_MAX_CHARS}",
                m.title_length
            ),
        ),
        Some(_) => {}
    }

    match m.meta_description {
        None => push(
            IssueCode::MissingMetaDescription,
            Severity::Critical,
            DEDUCT_MISSING_META,
            "Page has no meta description".into(),
        ),
        Some(_)
            if !(META_DESCRIPTION_MIN_CHARS..=META_DESCRIPTION_MAX_CHARS)
                .contains(&m.meta_description_length) =>
        {
            push(
                IssueCode::MetaDescriptionLength,
                Severity::Warning,
                DEDUCT_META_LENGTH,
                format!(
                    "Meta description is {} characters; aim for \
                     {META_DESCRIPTION_MIN_CHARS}-{META_DESCRIPTION_MAX_CHARS}",
                    m.meta_description_length
                ),
            )
        }
        Some(_) => {}
    }

    match m.h1_count {
        0 => push(
            IssueCode::MissingH1,
            Severity::Critical,
            DEDUCT_MISSING_H1,
            "Page has no <h1> heading".into(),
        ),
        1 => {}
        n => push(
            IssueCode::MultipleH1,
            Severity::Warning,
            DEDUCT_MULTIPLE_H1,
            format!("Page has {n} <h1> headings; use exactly one"),
        ),
    }

    if m.word_count < MIN_WORD_COUNT {
        push(
            IssueCode::ThinContent,
            Severity::Warning,
            DEDUCT_THIN_CONTENT,
            format!(
                "Page has {} words of visible content; aim for at least {MIN_WORD_COUNT}",
                m.word_count
            ),
        );
    }

    if m.images_missing_alt > 0 {
        let deduction = i32::try_from(m.images_missing_alt)
            .unwrap_or(i32::MAX)
            .saturating_mul(DEDUCT_PER_IMAGE_MISSING_ALT)
            .min(DEDUCT_IMAGES_MISSING_ALT_CAP);
        push(
            IssueCode::ImagesMissingAlt,
            Severity::Warning,
            deduction,
            format!(
                "{} of {} images have no alt text",
                m.images_missing_alt, m.image_count
            ),
        );
    }

    if m.canonical_url.is_none() {
        push(
            IssueCode::MissingCanonical,
            Severity::Info,
            DEDUCT_MISSING_CANONICAL,
            "Page has no canonical link".into(),
        );
    }

    issues
}

fn visible_word_count(body: ElementRef<'_>) -> usize {
    body.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| NON_CONTENT_ELEMENTS.contains(&e.name()))
            });
            (!hidden).then(|| text.split_whitespace().count())
        })
        .sum()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
