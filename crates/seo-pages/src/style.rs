/// Color and font extraction from an uploaded home page.
///
/// Plain regex scans over the raw document; no HTML parsing.
use std::sync::LazyLock;

use regex::Regex;

pub const MAX_COLORS: usize = 5;
pub const MAX_FONTS: usize = 3;
pub const FALLBACK_FONTS: [&str; 3] = ["Arial", "Helvetica", "sans-serif"];

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(?:[0-9a-fA-F]{3}){1,2}|rgba?\([^)<>{}]+\)").expect("valid regex")
});

static FONT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)font-family:\s*['"]?([^'";\n]+)['"]?;"#).expect("valid regex")
});

/// Colors and fonts reused by every page in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePalette {
    pub colors: Vec<String>,
    pub fonts: Vec<String>,
}

impl Default for StylePalette {
    fn default() -> Self {
        Self {
            colors: Vec::new(),
            fonts: fallback_fonts(),
        }
    }
}

pub fn extract_palette(html: &str) -> StylePalette {
    StylePalette {
        colors: extract_colors(html),
        fonts: extract_fonts(html),
    }
}

/// Up to five distinct hex/rgb/rgba tokens in first-occurrence order.
pub fn extract_colors(html: &str) -> Vec<String> {
    distinct(COLOR_RE.find_iter(html).map(|m| m.as_str().to_string()), MAX_COLORS)
}

/// Up to three distinct `font-family` values, or [`FALLBACK_FONTS`] when none exist.
pub fn extract_fonts(html: &str) -> Vec<String> {
    let fonts = distinct(
        FONT_RE
            .captures_iter(html)
            .map(|caps| caps[1].trim().to_string())
            .filter(|f| !f.is_empty() && !f.contains(['<', '>', '{', '}'])),
        MAX_FONTS,
    );
    if fonts.is_empty() {
        fallback_fonts()
    } else {
        fonts
    }
}

fn fallback_fonts() -> Vec<String> {
    FALLBACK_FONTS.iter().map(|f| f.to_string()).collect()
}

fn distinct(values: impl Iterator<Item = String>, limit: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(limit);
    for value in values {
        if out.len() == limit {
            break;
        }
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
