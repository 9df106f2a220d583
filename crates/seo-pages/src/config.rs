use std::path::PathBuf;

use crate::error::AppError;
use crate::model::Location;
use crate::render::RenderOptions;
use crate::session::GenerationSettings;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OUTPUT_DIR: &str = "seo-pages-output";

/// Application configuration loaded explicitly from environment variables.
///
/// The OpenAI client reads its own `OPENAI_*` variables; see
/// `seo_common::openai::OpenAiClientConfig::from_env`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat model used for copywriting.
    pub model: String,
    /// Directory exports are written to unless a call names another.
    pub output_dir: PathBuf,
    /// Keyword records processed at once. 1 means strictly sequential.
    pub concurrency: usize,
    /// HTML file analyzed at startup as the session's style source.
    pub style_source_path: Option<PathBuf>,
    /// Initial generation settings of the session.
    pub settings: GenerationSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `SEO_PAGES_MODEL`: chat model (default `gpt-3.5-turbo`)
    /// - `SEO_PAGES_OUTPUT_DIR`: export directory (default `seo-pages-output`)
    /// - `SEO_PAGES_CONCURRENCY`: records in flight, at least 1 (default 1)
    /// - `SEO_PAGES_STYLE_PATH`: home page HTML to preload; must exist
    /// - `SEO_PAGES_DEFAULT_CITY` / `_STATE` / `_COUNTRY`: default location
    /// - `SEO_PAGES_USE_DEFAULT_LOCATION`: apply the default location (default false)
    /// - `SEO_PAGES_INCLUDE_SCHEMA`: embed JSON-LD (default true)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let model = var("SEO_PAGES_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let output_dir = PathBuf::from(
            var("SEO_PAGES_OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
        );

        let concurrency = match var("SEO_PAGES_CONCURRENCY") {
            None => 1,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(AppError::Config(format!(
                        "SEO_PAGES_CONCURRENCY must be a positive integer, got {raw:?}"
                    )))
                }
            },
        };

        let style_source_path = var("SEO_PAGES_STYLE_PATH").map(PathBuf::from);
        if let Some(path) = &style_source_path {
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "style source not found at {}",
                    path.display()
                )));
            }
        }

        let default_location = Location::new(
            var("SEO_PAGES_DEFAULT_CITY").unwrap_or_default(),
            var("SEO_PAGES_DEFAULT_STATE").unwrap_or_default(),
            var("SEO_PAGES_DEFAULT_COUNTRY").unwrap_or_default(),
        );
        let use_default_location =
            parse_flag("SEO_PAGES_USE_DEFAULT_LOCATION", var("SEO_PAGES_USE_DEFAULT_LOCATION"), false)?;
        let include_schema =
            parse_flag("SEO_PAGES_INCLUDE_SCHEMA", var("SEO_PAGES_INCLUDE_SCHEMA"), true)?;

        Ok(Self {
            model,
            output_dir,
            concurrency,
            style_source_path,
            settings: GenerationSettings {
                default_location,
                use_default_location,
                render: RenderOptions { include_schema },
            },
        })
    }
}

fn parse_flag(name: &str, value: Option<String>, default: bool) -> Result<bool, AppError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!(
            "{name} must be a boolean, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.output_dir, PathBuf::from("seo-pages-output"));
        assert_eq!(config.concurrency, 1);
        assert!(config.style_source_path.is_none());
        assert!(!config.settings.use_default_location);
        assert!(config.settings.render.include_schema);
    }

    #[test]
    fn reads_location_defaults_and_flags() {
        let config = load(&[
            ("SEO_PAGES_DEFAULT_CITY", " Dubai "),
            ("SEO_PAGES_DEFAULT_COUNTRY", "UAE"),
            ("SEO_PAGES_USE_DEFAULT_LOCATION", "yes"),
            ("SEO_PAGES_INCLUDE_SCHEMA", "off"),
            ("SEO_PAGES_CONCURRENCY", "4"),
        ])
        .unwrap();
        assert_eq!(config.settings.default_location, Location::new("Dubai", "", "UAE"));
        assert!(config.settings.use_default_location);
        assert!(!config.settings.render.include_schema);
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = load(&[("SEO_PAGES_CONCURRENCY", "0")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn rejects_bad_flag() {
        let err = load(&[("SEO_PAGES_INCLUDE_SCHEMA", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("SEO_PAGES_INCLUDE_SCHEMA"));
    }

    #[test]
    fn rejects_missing_style_file() {
        let err = load(&[("SEO_PAGES_STYLE_PATH", "/definitely/not/here.html")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
