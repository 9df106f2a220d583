/// Landing page renderer.
///
/// Produces one self-contained HTML5 document: inline stylesheet, optional
/// JSON-LD block, no external assets. Output depends only on its arguments.
use std::fmt::Write;

use crate::model::{GeneratedContent, MetaTags};
use crate::style::StylePalette;

pub const DEFAULT_PRIMARY_COLOR: &str = "#667eea";
pub const DEFAULT_SECONDARY_COLOR: &str = "#764ba2";
pub const DEFAULT_FONT: &str = "Arial";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub include_schema: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_schema: true,
        }
    }
}

/// Page inputs that vary per keyword.
#[derive(Debug, Clone, Copy)]
pub struct PageInput<'a> {
    pub keyword: &'a str,
    pub city: &'a str,
    pub country: &'a str,
    pub content: &'a GeneratedContent,
    pub meta: &'a MetaTags,
}

pub fn render_page(page: &PageInput<'_>, palette: &StylePalette, options: RenderOptions) -> String {
    let primary = palette
        .colors
        .first()
        .map(String::as_str)
        .unwrap_or(DEFAULT_PRIMARY_COLOR);
    let secondary = palette
        .colors
        .get(1)
        .map(String::as_str)
        .unwrap_or(DEFAULT_SECONDARY_COLOR);
    let font = palette
        .fonts
        .first()
        .map(String::as_str)
        .unwrap_or(DEFAULT_FONT);

    let keyword = escape_html(page.keyword);
    let slug = escape_html(&page.keyword.to_lowercase().replace(' ', "-"));
    let breadcrumb_city = if page.city.is_empty() {
        String::new()
    } else {
        format!(" / {}", escape_html(page.city))
    };
    let serving = if page.city.is_empty() {
        "Multiple Locations".to_string()
    } else {
        escape_html(page.city)
    };
    let serving_country = if page.country.is_empty() {
        String::new()
    } else {
        format!(", {}", escape_html(page.country))
    };

    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    let _ = writeln!(
        html,
        "    <meta name=\"description\" content=\"{}\">",
        escape_html(&page.meta.description)
    );
    let _ = writeln!(
        html,
        "    <meta name=\"keywords\" content=\"{}\">",
        escape_html(&page.meta.keywords)
    );
    html.push_str("    <meta name=\"author\" content=\"SEO Page Generator\">\n");
    let _ = writeln!(html, "    <title>{}</title>", escape_html(&page.meta.title));

    if options.include_schema {
        html.push_str("    <script type=\"application/ld+json\">\n");
        html.push_str(&json_ld(&page.meta.schema));
        html.push_str("\n    </script>\n");
    }

    html.push_str(&stylesheet(primary, secondary, font));
    html.push_str("</head>\n<body>\n");

    let _ = write!(
        html,
        r##"    <nav>
        <a href="/">Home</a>
        <a href="#{slug}">{keyword}</a>
        <a href="/contact">Contact</a>
    </nav>

    <header>
        <div class="breadcrumb">Home / {keyword}{breadcrumb_city}</div>
        <h1>{h1}</h1>
    </header>

    <div class="container">
        <section class="intro-section" id="{slug}">
            <p>{intro}</p>
        </section>

        <section class="benefits">
"##,
        h1 = escape_html(&page.content.h1),
        intro = escape_html(&page.content.intro),
    );

    for benefit in &page.content.benefits {
        let _ = write!(
            html,
            r#"            <div class="benefit">
                <h2>{}</h2>
                <p>{}</p>
            </div>
"#,
            escape_html(&benefit.title),
            escape_html(&benefit.description)
        );
    }

    let _ = write!(
        html,
        r#"        </section>

        <section class="cta-section">
            <h2>Ready to Get Started?</h2>
            <p>{cta}</p>
            <a class="cta-button" href="/contact">Get in Touch</a>
        </section>
    </div>

    <footer>
        <p>&copy; {keyword} Services. All rights reserved.</p>
        <p>Serving {serving}{serving_country}</p>
    </footer>
</body>
</html>
"#,
        cta = escape_html(&page.content.cta),
    );

    html
}

fn stylesheet(primary: &str, secondary: &str, font: &str) -> String {
    format!(
        r#"    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{ font-family: {font}, sans-serif; color: #333; line-height: 1.6; }}

        header {{ background: linear-gradient(135deg, {primary} 0%, {secondary} 100%);
                 color: white; padding: 60px 20px; text-align: center; }}
        header h1 {{ font-size: 2.5em; margin-bottom: 10px; color: white; }}

        nav {{ background: {primary}; padding: 15px; }}
        nav a {{ color: white; text-decoration: none; margin: 0 15px; }}

        .container {{ max-width: 1200px; margin: 0 auto; padding: 40px 20px; }}

        .intro-section {{ background: #f8f9fa; padding: 30px; border-radius: 8px; margin-bottom: 40px; }}
        .intro-section p {{ font-size: 1.1em; color: #555; }}

        .benefits {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 30px; margin: 40px 0; }}
        .benefit {{ background: white; padding: 25px; border-radius: 8px; border-left: 4px solid {primary};
                   box-shadow: 0 2px 8px rgba(0,0,0,0.1); }}
        .benefit h2 {{ color: {primary}; margin-bottom: 15px; }}

        .cta-section {{ background: {primary}; color: white; padding: 40px; text-align: center; border-radius: 8px; margin: 40px 0; }}
        .cta-section h2 {{ color: white; }}
        .cta-button {{ display: inline-block; background: white; color: {primary}; padding: 12px 30px;
                       border-radius: 5px; font-size: 1.1em; font-weight: bold; text-decoration: none; margin-top: 15px; }}

        footer {{ background: #333; color: white; text-align: center; padding: 20px; margin-top: 60px; }}

        .breadcrumb {{ color: white; opacity: 0.85; margin-bottom: 20px; font-size: 0.9em; }}

        h1, h2, h3 {{ color: {primary}; margin-top: 20px; }}

        @media (max-width: 768px) {{
            header h1 {{ font-size: 1.8em; }}
            .benefits {{ grid-template-columns: 1fr; }}
        }}
    </style>
"#
    )
}

/// Pretty JSON for a `<script>` block; `</` is escaped so the payload cannot
/// close the element early.
fn json_ld<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fallback_content;
    use crate::meta::build_meta_tags;
    use crate::model::{Benefit, Location};

    fn render(palette: &StylePalette, options: RenderOptions) -> (String, MetaTags) {
        let content = fallback_content("electrician", &Location::new("New York", "NY", "USA"));
        let meta = build_meta_tags("electrician", "New York", "USA", &content.intro);
        let page = PageInput {
            keyword: "electrician",
            city: "New York",
            country: "USA",
            content: &content,
            meta: &meta,
        };
        (render_page(&page, palette, options), meta)
    }

    #[test]
    fn document_is_complete_and_contains_meta() {
        let (html, meta) = render(&StylePalette::default(), RenderOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert_eq!(html.matches("<head>").count(), 1);
        assert_eq!(html.matches("</body>").count(), 1);
        assert!(html.contains(&format!("<title>{}</title>", meta.title)));
        assert!(html.contains(&format!("content=\"{}\"", meta.description)));
        assert!(html.contains("Serving New York, USA"));
        assert!(html.contains("Home / electrician / New York"));
        assert!(html.contains("href=\"#electrician\""));
    }

    #[test]
    fn has_no_external_assets() {
        let (html, _) = render(&StylePalette::default(), RenderOptions::default());
        assert!(!html.contains("<link"));
        assert!(!html.contains("src="));
        assert!(!html.contains("http://"));
    }

    #[test]
    fn uses_default_colors_without_palette() {
        let (html, _) = render(&StylePalette::default(), RenderOptions::default());
        assert!(html.contains(DEFAULT_PRIMARY_COLOR));
        assert!(html.contains(DEFAULT_SECONDARY_COLOR));
        assert!(html.contains("font-family: Arial, sans-serif"));
    }

    #[test]
    fn uses_extracted_colors_and_first_font() {
        let palette = StylePalette {
            colors: vec!["#112233".to_string(), "rgb(1, 2, 3)".to_string(), "#abc".to_string()],
            fonts: vec!["Georgia".to_string(), "Verdana".to_string()],
        };
        let (html, _) = render(&palette, RenderOptions::default());
        assert!(html.contains("linear-gradient(135deg, #112233 0%, rgb(1, 2, 3) 100%)"));
        assert!(html.contains("font-family: Georgia, sans-serif"));
        assert!(!html.contains("#abc"));
        assert!(!html.contains(DEFAULT_PRIMARY_COLOR));
    }

    #[test]
    fn single_color_keeps_default_secondary() {
        let palette = StylePalette {
            colors: vec!["#112233".to_string()],
            fonts: vec![],
        };
        let (html, _) = render(&palette, RenderOptions::default());
        assert!(html.contains("#112233 0%, #764ba2 100%"));
        assert!(html.contains("font-family: Arial, sans-serif"));
    }

    #[test]
    fn schema_block_is_optional() {
        let (with, _) = render(&StylePalette::default(), RenderOptions::default());
        assert!(with.contains("application/ld+json"));
        assert!(with.contains("\"@type\": \"LocalBusiness\""));

        let (without, _) = render(&StylePalette::default(), RenderOptions { include_schema: false });
        assert!(!without.contains("application/ld+json"));
    }

    #[test]
    fn one_card_per_benefit() {
        let (html, _) = render(&StylePalette::default(), RenderOptions::default());
        assert_eq!(html.matches("<div class=\"benefit\">").count(), 3);
    }

    #[test]
    fn model_text_is_escaped() {
        let content = GeneratedContent {
            h1: "<script>alert(1)</script>".to_string(),
            intro: "Fish & chips".to_string(),
            benefits: vec![Benefit {
                title: "\"Quoted\"".to_string(),
                description: "ok".to_string(),
            }],
            cta: "</script>".to_string(),
        };
        let meta = build_meta_tags("chef", "", "", &content.intro);
        let page = PageInput {
            keyword: "chef",
            city: "",
            country: "",
            content: &content,
            meta: &meta,
        };
        let html = render_page(&page, &StylePalette::default(), RenderOptions::default());
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Fish &amp; chips"));
        assert!(html.contains("&quot;Quoted&quot;"));
        assert!(html.contains("Serving Multiple Locations</p>"));
    }

    fn unescape(s: &str) -> String {
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
    }

    fn between<'a>(html: &'a str, open: &str, close: &str) -> &'a str {
        let start = html.find(open).unwrap() + open.len();
        let end = start + html[start..].find(close).unwrap();
        &html[start..end]
    }

    #[test]
    fn title_and_description_survive_special_characters() {
        let content = fallback_content("Tom's A&B plumbing", &Location::default());
        let meta = build_meta_tags("Tom's A&B plumbing", "", "", &content.intro);
        let page = PageInput {
            keyword: "Tom's A&B plumbing",
            city: "",
            country: "",
            content: &content,
            meta: &meta,
        };
        let html = render_page(&page, &StylePalette::default(), RenderOptions::default());

        assert_eq!(meta.title, "Tom's A&B plumbing | Professional Services");
        assert!(html.contains("<title>Tom's A&amp;B plumbing | Professional Services</title>"));
        assert_eq!(unescape(between(&html, "<title>", "</title>")), meta.title);
        assert_eq!(
            unescape(between(&html, "<meta name=\"description\" content=\"", "\">")),
            meta.description
        );
    }

    #[test]
    fn json_ld_cannot_close_script() {
        let out = json_ld(&serde_json::json!({"name": "</script><b>"}));
        assert!(!out.contains("</script>"));
        assert!(out.contains("<\\/script>"));
    }
}
