use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// --- Setup ---

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetApiKeyParams {
    /// Credential for the language-model service. An empty value clears it.
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConfigureDefaultsParams {
    /// Default city applied to keywords without one (when enabled).
    pub city: Option<String>,
    /// Default state or region.
    pub state: Option<String>,
    /// Default country.
    pub country: Option<String>,
    /// Fill empty location fields of every keyword from the defaults.
    pub use_default_location: Option<bool>,
    /// Embed a Schema.org JSON-LD block in each generated page.
    pub include_schema: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionSettingsResponse {
    pub credential_set: bool,
    pub style_loaded: bool,
    /// True while a generate_pages call is in progress.
    pub batch_running: bool,
    pub default_city: String,
    pub default_state: String,
    pub default_country: String,
    pub use_default_location: bool,
    pub include_schema: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LoadStyleParams {
    /// Full HTML of the home page whose colors and fonts should be reused.
    pub html: Option<String>,
    /// Path to an HTML file to read instead of passing `html` inline.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StyleSummaryResponse {
    /// Up to five distinct colors found in the document.
    pub colors: Vec<String>,
    /// Up to three distinct font families (or the fallback list).
    pub fonts: Vec<String>,
    /// Size of the analyzed HTML document.
    pub source_bytes: usize,
}

// --- Generate ---

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GeneratePagesParams {
    /// Keywords, one per line: `keyword[, city[, state[, country]]]`.
    pub keywords: Option<String>,
    /// Path to a CSV file with the same line format, used when `keywords` is absent.
    pub csv_path: Option<String>,
    /// Overrides the session's default-location flag for this run.
    pub use_default_location: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FailedKeyword {
    pub index: usize,
    pub keyword: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerateSummaryResponse {
    /// Number of keyword records attempted.
    pub attempted: usize,
    /// Number of pages produced (may be lower than `attempted`).
    pub generated: usize,
    /// Pages whose copy came from the deterministic fallback.
    pub fallback: usize,
    pub failures: Vec<FailedKeyword>,
}

// --- Preview & export ---

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageSummary {
    pub index: usize,
    /// Display label, `"{keyword} - {city}"`.
    pub label: String,
    pub keyword: String,
    pub city: String,
    pub country: String,
    pub meta_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageListResponse {
    pub pages: Vec<PageSummary>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PreviewPageParams {
    /// Zero-based index into the current result list.
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PagePreviewResponse {
    pub keyword: String,
    /// `"{city}, {country}"`.
    pub location: String,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub html: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExportPagesParams {
    /// Any of "zip", "json", "csv". Defaults to all three.
    pub formats: Option<Vec<String>>,
    /// Directory to write into. Defaults to the configured output directory.
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportedFileInfo {
    pub format: String,
    pub path: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportPagesResponse {
    pub page_count: usize,
    pub files: Vec<ExportedFileInfo>,
}
