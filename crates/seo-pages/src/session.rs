/// Per-session state: credential, style source, settings, and the results of
/// the last batch. Passed explicitly to whoever drives generation.
use tracing::info;

use crate::error::AppError;
use crate::model::{KeywordRecord, Location, PageResult};
use crate::render::RenderOptions;
use crate::style::{extract_palette, StylePalette};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
}

/// The uploaded home page and the palette derived from it.
#[derive(Debug, Clone)]
pub struct StyleSource {
    pub html: String,
    pub palette: StylePalette,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSettings {
    pub default_location: Location,
    pub use_default_location: bool,
    pub render: RenderOptions,
}

/// Everything one batch run needs, copied out of the session so the session
/// is not borrowed while the batch runs.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub credential: String,
    pub records: Vec<KeywordRecord>,
    pub palette: StylePalette,
    pub settings: GenerationSettings,
}

#[derive(Debug)]
pub struct Session {
    credential: Option<String>,
    style: Option<StyleSource>,
    settings: GenerationSettings,
    pages: Vec<PageResult>,
    state: BatchState,
}

impl Session {
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            credential: None,
            style: None,
            settings,
            pages: Vec::new(),
            state: BatchState::Idle,
        }
    }

    /// Store the credential. Blank input clears it.
    pub fn set_credential(&mut self, credential: &str) {
        let trimmed = credential.trim();
        self.credential = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Analyze `html` and keep it as the session's style source.
    pub fn load_style(&mut self, html: String) -> &StyleSource {
        let palette = extract_palette(&html);
        info!(
            colors = palette.colors.len(),
            fonts = palette.fonts.len(),
            "style source analyzed"
        );
        self.style.insert(StyleSource { html, palette })
    }

    pub fn style(&self) -> Option<&StyleSource> {
        self.style.as_ref()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut GenerationSettings {
        &mut self.settings
    }

    pub fn pages(&self) -> &[PageResult] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Result<&PageResult, AppError> {
        self.pages.get(index).ok_or(AppError::PageNotFound {
            index,
            count: self.pages.len(),
        })
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Check the preconditions of a run and move to `Running`.
    ///
    /// Fails without side effects when a batch is already running, no
    /// credential is set, `records` is empty, or no style source is loaded,
    /// checked in that order. On success the previous results are discarded.
    pub fn begin_batch(
        &mut self,
        records: Vec<KeywordRecord>,
        use_default_location: Option<bool>,
    ) -> Result<BatchJob, AppError> {
        if self.state == BatchState::Running {
            return Err(AppError::BatchRunning);
        }
        let credential = self.credential.clone().ok_or(AppError::MissingCredential)?;
        if records.is_empty() {
            return Err(AppError::NoKeywords);
        }
        let palette = self
            .style
            .as_ref()
            .map(|s| s.palette.clone())
            .ok_or(AppError::MissingStyleSource)?;

        let mut settings = self.settings.clone();
        if let Some(flag) = use_default_location {
            settings.use_default_location = flag;
        }

        self.pages.clear();
        self.state = BatchState::Running;
        Ok(BatchJob {
            credential,
            records,
            palette,
            settings,
        })
    }

    /// Store a finished batch's pages, replacing any previous results.
    pub fn finish_batch(&mut self, pages: Vec<PageResult>) {
        self.pages = pages;
        self.state = BatchState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_session() -> Session {
        let mut session = Session::new(GenerationSettings::default());
        session.set_credential("sk-test");
        session.load_style("<style>a { color: #112233; }</style>".to_string());
        session
    }

    #[test]
    fn missing_credential_is_reported_first() {
        let mut session = Session::new(GenerationSettings::default());
        let err = session.begin_batch(vec![], None).unwrap_err();
        assert!(matches!(err, AppError::MissingCredential));
        assert_eq!(session.state(), BatchState::Idle);
    }

    #[test]
    fn empty_keywords_are_rejected() {
        let mut session = Session::new(GenerationSettings::default());
        session.set_credential("sk-test");
        let err = session.begin_batch(vec![], None).unwrap_err();
        assert!(matches!(err, AppError::NoKeywords));
    }

    #[test]
    fn missing_style_is_rejected() {
        let mut session = Session::new(GenerationSettings::default());
        session.set_credential("sk-test");
        let err = session
            .begin_batch(vec![KeywordRecord::new("plumber")], None)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingStyleSource));
        assert_eq!(session.state(), BatchState::Idle);
    }

    #[test]
    fn blank_credential_clears() {
        let mut session = ready_session();
        session.set_credential("   ");
        assert!(!session.has_credential());
    }

    #[test]
    fn begin_batch_snapshots_inputs_and_blocks_reentry() {
        let mut session = ready_session();
        let job = session
            .begin_batch(vec![KeywordRecord::new("plumber")], Some(true))
            .unwrap();
        assert_eq!(job.credential, "sk-test");
        assert_eq!(job.palette.colors, vec!["#112233"]);
        assert!(job.settings.use_default_location);
        assert!(!session.settings().use_default_location);
        assert_eq!(session.state(), BatchState::Running);

        let err = session
            .begin_batch(vec![KeywordRecord::new("roofer")], None)
            .unwrap_err();
        assert!(matches!(err, AppError::BatchRunning));

        session.finish_batch(vec![]);
        assert_eq!(session.state(), BatchState::Idle);
    }

    #[test]
    fn page_lookup_reports_bounds() {
        let session = ready_session();
        match session.page(3) {
            Err(AppError::PageNotFound { index, count }) => {
                assert_eq!(index, 3);
                assert_eq!(count, 0);
            }
            other => panic!("expected PageNotFound, got {other:?}"),
        }
    }
}
