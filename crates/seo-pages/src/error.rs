#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("API key is not set; configure a credential before generating pages")]
    MissingCredential,

    #[error("no keywords supplied; add at least one keyword")]
    NoKeywords,

    #[error("no style source loaded; upload a home page HTML document first")]
    MissingStyleSource,

    #[error("a generation batch is already running")]
    BatchRunning,

    #[error("page not found: index {index} (have {count} pages)")]
    PageNotFound { index: usize, count: usize },

    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
