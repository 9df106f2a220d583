mod batch;
mod config;
mod content;
mod error;
mod export;
mod keywords;
mod meta;
mod model;
mod render;
mod server;
mod session;
mod style;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use seo_common::openai::{OpenAiClient, OpenAiClientConfig};

use config::Config;
use server::SeoPagesServer;
use session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting seo-pages MCP server");

    let config = Config::from_env()?;
    info!(
        model = %config.model,
        output_dir = %config.output_dir.display(),
        concurrency = config.concurrency,
        "seo-pages configured"
    );

    let openai_config = OpenAiClientConfig::from_env();
    info!(
        base_url = %openai_config.base_url,
        timeout_ms = openai_config.default_timeout.as_millis(),
        max_retries = openai_config.max_retries,
        "openai client configured"
    );

    let mut session = Session::new(config.settings.clone());
    if let Some(key) = openai_config.api_key.as_deref() {
        session.set_credential(key);
        info!("api key loaded from environment");
    }
    if let Some(path) = &config.style_source_path {
        let html = tokio::fs::read_to_string(path).await?;
        session.load_style(html);
        info!(path = %path.display(), "style source preloaded");
    }

    let openai = Arc::new(OpenAiClient::new(openai_config)?);
    let server = SeoPagesServer::new(session, openai, config);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
