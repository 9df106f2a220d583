/// MCP server for the SEO page generator.
///
/// The tools follow the setup -> generate -> preview/export workflow:
/// - `set_api_key`, `configure_defaults`, `load_style`: session setup
/// - `generate_pages`: run one batch over a keyword list
/// - `list_pages`, `preview_page`: inspect the current results
/// - `export_pages`: write ZIP/JSON/CSV files
use std::path::PathBuf;
use std::sync::Arc;

use rmcp::{
    Json, Peer, RoleServer, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use seo_common::mcp_api::{
    ConfigureDefaultsParams, ExportPagesParams, ExportPagesResponse, ExportedFileInfo,
    FailedKeyword, GeneratePagesParams, GenerateSummaryResponse, LoadStyleParams, PageListResponse,
    PagePreviewResponse, PageSummary, PreviewPageParams, SessionSettingsResponse, SetApiKeyParams,
    StyleSummaryResponse,
};
use seo_common::openai::OpenAiClient;

use crate::batch::{BatchRunner, FanOut, LogProgress, Progress, ProgressSink};
use crate::config::Config;
use crate::content::OpenAiContentGenerator;
use crate::export::{write_exports, ExportFormat};
use crate::keywords::{parse_keywords, read_keywords_file};
use crate::session::{BatchState, Session};

/// Forwards batch progress to the MCP client as `notifications/progress`.
///
/// Updates are queued and sent by one task, so the client sees them in order.
struct PeerProgress {
    token: ProgressToken,
    tx: mpsc::UnboundedSender<ProgressNotificationParam>,
}

impl PeerProgress {
    /// The forwarding task ends once the sink is dropped and the queue drains.
    fn start(peer: Peer<RoleServer>, token: ProgressToken) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ProgressNotificationParam>();
        let forwarder = tokio::spawn(async move {
            while let Some(param) = rx.recv().await {
                if let Err(e) = peer.notify_progress(param).await {
                    debug!(error = %e, "progress notification not delivered");
                    break;
                }
            }
        });
        (Self { token, tx }, forwarder)
    }
}

impl ProgressSink for PeerProgress {
    fn record_done(&self, progress: Progress, keyword: &str, ok: bool) {
        let status = if ok { "generated" } else { "failed" };
        let _ = self.tx.send(ProgressNotificationParam {
            progress_token: self.token.clone(),
            progress: progress.completed as f64,
            total: Some(progress.total as f64),
            message: Some(format!("{keyword}: {status}")),
        });
    }
}

#[derive(Clone)]
pub struct SeoPagesServer {
    session: Arc<RwLock<Session>>,
    openai: Arc<OpenAiClient>,
    config: Arc<Config>,
    tool_router: ToolRouter<SeoPagesServer>,
}

impl SeoPagesServer {
    pub fn new(session: Session, openai: Arc<OpenAiClient>, config: Config) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            openai,
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    /// Parse the keyword input, run one batch, and store its pages.
    async fn run_generation(
        &self,
        params: GeneratePagesParams,
        progress: FanOut,
    ) -> Result<GenerateSummaryResponse, String> {
        let records = match (params.keywords, params.csv_path) {
            (Some(text), _) if !text.trim().is_empty() => parse_keywords(&text),
            (_, Some(path)) if !path.trim().is_empty() => {
                read_keywords_file(path.trim()).map_err(|e| e.to_string())?
            }
            _ => Vec::new(),
        };

        let job = self
            .session
            .write()
            .await
            .begin_batch(records, params.use_default_location)
            .map_err(|e| e.to_string())?;

        let generator = OpenAiContentGenerator::new(
            self.openai.with_api_key(job.credential.clone()),
            self.config.model.clone(),
        );
        let runner = BatchRunner::new(generator).with_concurrency(self.config.concurrency);

        // Detached so a cancelled tool call still returns the session to idle.
        let session = Arc::clone(&self.session);
        let task = tokio::spawn(async move {
            let outcome = runner.run(&job, &progress).await;
            let summary = GenerateSummaryResponse {
                attempted: outcome.attempted,
                generated: outcome.pages.len(),
                fallback: outcome.fallback_count,
                failures: outcome
                    .failures
                    .into_iter()
                    .map(|f| FailedKeyword {
                        index: f.index,
                        keyword: f.keyword,
                        error: f.error,
                    })
                    .collect(),
            };
            session.write().await.finish_batch(outcome.pages);
            summary
        });

        match task.await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                error!(error = %e, "generation task failed");
                self.session.write().await.finish_batch(Vec::new());
                Err(format!("generation failed: {e}"))
            }
        }
    }

    fn settings_response(session: &Session) -> SessionSettingsResponse {
        let settings = session.settings();
        SessionSettingsResponse {
            credential_set: session.has_credential(),
            style_loaded: session.style().is_some(),
            batch_running: session.state() == BatchState::Running,
            default_city: settings.default_location.city.clone(),
            default_state: settings.default_location.state.clone(),
            default_country: settings.default_location.country.clone(),
            use_default_location: settings.use_default_location,
            include_schema: settings.render.include_schema,
        }
    }
}

#[tool_router]
impl SeoPagesServer {
    #[tool(description = "Set the language-model API key used for page generation. An empty key clears it.")]
    async fn set_api_key(
        &self,
        Parameters(params): Parameters<SetApiKeyParams>,
    ) -> Result<Json<SessionSettingsResponse>, String> {
        let mut session = self.session.write().await;
        session.set_credential(&params.api_key);
        info!(credential_set = session.has_credential(), "api key updated");
        Ok(Json(Self::settings_response(&session)))
    }

    #[tool(description = "Set the default city/state/country, whether to apply it to keywords without a location, and whether to embed Schema.org JSON-LD.")]
    async fn configure_defaults(
        &self,
        Parameters(params): Parameters<ConfigureDefaultsParams>,
    ) -> Result<Json<SessionSettingsResponse>, String> {
        let mut session = self.session.write().await;
        let settings = session.settings_mut();
        if let Some(city) = params.city {
            settings.default_location.city = city.trim().to_string();
        }
        if let Some(state) = params.state {
            settings.default_location.state = state.trim().to_string();
        }
        if let Some(country) = params.country {
            settings.default_location.country = country.trim().to_string();
        }
        if let Some(flag) = params.use_default_location {
            settings.use_default_location = flag;
        }
        if let Some(flag) = params.include_schema {
            settings.render.include_schema = flag;
        }
        Ok(Json(Self::settings_response(&session)))
    }

    #[tool(description = "Analyze a home page HTML document (inline or by path) and use its colors and fonts for generated pages.")]
    async fn load_style(
        &self,
        Parameters(params): Parameters<LoadStyleParams>,
    ) -> Result<Json<StyleSummaryResponse>, String> {
        let html = match (params.html, params.path) {
            (Some(html), _) if !html.trim().is_empty() => html,
            (_, Some(path)) if !path.trim().is_empty() => tokio::fs::read_to_string(path.trim())
                .await
                .map_err(|e| format!("failed to read style source: {e}"))?,
            _ => return Err("either html or path must be provided".to_string()),
        };

        let mut session = self.session.write().await;
        let style = session.load_style(html);
        Ok(Json(StyleSummaryResponse {
            colors: style.palette.colors.clone(),
            fonts: style.palette.fonts.clone(),
            source_bytes: style.html.len(),
        }))
    }

    #[tool(description = "Generate one landing page per keyword line (`keyword[, city[, state[, country]]]`) from inline text or a CSV file. Replaces previous results. Sends progress notifications when the request carries a progress token.")]
    async fn generate_pages(
        &self,
        Parameters(params): Parameters<GeneratePagesParams>,
        meta: Meta,
        client: Peer<RoleServer>,
    ) -> Result<Json<GenerateSummaryResponse>, String> {
        let mut sinks: Vec<Box<dyn ProgressSink>> = vec![Box::new(LogProgress)];
        let mut forwarder = None;
        if let Some(token) = meta.get_progress_token() {
            let (sink, handle) = PeerProgress::start(client, token);
            sinks.push(Box::new(sink));
            forwarder = Some(handle);
        }

        let result = self.run_generation(params, FanOut(sinks)).await;
        if let Some(handle) = forwarder {
            let _ = handle.await;
        }
        result.map(Json)
    }

    #[tool(description = "List the pages produced by the last generation run.")]
    async fn list_pages(&self) -> Result<Json<PageListResponse>, String> {
        let session = self.session.read().await;
        let pages = session
            .pages()
            .iter()
            .enumerate()
            .map(|(index, p)| PageSummary {
                index,
                label: p.label(),
                keyword: p.keyword.clone(),
                city: p.city.clone(),
                country: p.country.clone(),
                meta_title: p.meta.title.clone(),
            })
            .collect();
        Ok(Json(PageListResponse { pages }))
    }

    #[tool(description = "Show one generated page: location, meta title and description, keywords, and full HTML.")]
    async fn preview_page(
        &self,
        Parameters(params): Parameters<PreviewPageParams>,
    ) -> Result<Json<PagePreviewResponse>, String> {
        let session = self.session.read().await;
        let page = session.page(params.index).map_err(|e| e.to_string())?;
        Ok(Json(PagePreviewResponse {
            keyword: page.keyword.clone(),
            location: format!("{}, {}", page.city, page.country),
            meta_title: page.meta.title.clone(),
            meta_description: page.meta.description.clone(),
            meta_keywords: page.meta.keywords.clone(),
            html: page.html.clone(),
        }))
    }

    #[tool(description = "Write the generated pages as a ZIP of HTML files, a JSON metadata document, and/or a CSV table.")]
    async fn export_pages(
        &self,
        Parameters(params): Parameters<ExportPagesParams>,
    ) -> Result<Json<ExportPagesResponse>, String> {
        let formats = match params.formats {
            Some(names) if !names.is_empty() => names
                .iter()
                .map(|n| n.parse::<ExportFormat>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?,
            _ => ExportFormat::ALL.to_vec(),
        };
        let dir = params
            .output_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.output_dir.clone());

        let pages = self.session.read().await.pages().to_vec();
        if pages.is_empty() {
            return Err("no pages to export; run generate_pages first".to_string());
        }
        let page_count = pages.len();
        let files = tokio::task::spawn_blocking(move || write_exports(&pages, &dir, &formats))
            .await
            .map_err(|e| format!("export task failed: {e}"))?
            .map_err(|e| e.to_string())?;
        Ok(Json(ExportPagesResponse {
            page_count,
            files: files
                .into_iter()
                .map(|f| ExportedFileInfo {
                    format: f.format.as_str().to_string(),
                    path: f.path.display().to_string(),
                    bytes: f.bytes,
                })
                .collect(),
        }))
    }
}

#[tool_handler]
impl ServerHandler for SeoPagesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "seo-pages".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "SEO landing page generator. Set up with set_api_key, load_style (home page HTML) \
and optionally configure_defaults. Then call generate_pages with one keyword per line \
(`keyword, city, state, country`). Inspect results with list_pages/preview_page and write \
them out with export_pages."
                    .to_string(),
            ),
        }
    }
}
