use std::future::Future;

use serde::Deserialize;
use tracing::{debug, warn};

use seo_common::openai::{ChatCompletionRequest, Message, OpenAiClient, OpenAiClientError};

use crate::model::{Benefit, GeneratedContent, GeneratedCopy, Location};

pub const SYSTEM_PROMPT: &str =
    "You are an expert SEO copywriter specializing in local business content.";
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 1500;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("content service failed: {0}")]
    Service(#[from] OpenAiClientError),

    #[error("content service returned no choices")]
    EmptyResponse,
}

/// System/user prompt pair for one keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPrompt {
    pub keyword: String,
    pub system: String,
    pub user: String,
}

/// A language-model backend that turns a prompt into raw response text.
pub trait ContentGenerator: Send + Sync {
    fn complete(
        &self,
        prompt: &ContentPrompt,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// [`ContentGenerator`] backed by an OpenAI-compatible chat completions API.
pub struct OpenAiContentGenerator {
    client: OpenAiClient,
    model: String,
}

impl OpenAiContentGenerator {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl ContentGenerator for OpenAiContentGenerator {
    async fn complete(&self, prompt: &ContentPrompt) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(prompt.system.clone()),
                Message::user(prompt.user.clone()),
            ],
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
        };
        let response = self.client.chat_completions(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                keyword = %prompt.keyword,
                total_tokens = usage.total_tokens,
                "completion usage"
            );
        }
        if response.choices.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        // A choice without text is treated as an unusable answer, not a failure.
        Ok(response.first_content().unwrap_or_default().to_string())
    }
}

/// `" in {city}"`, then `", {state}"`, then `", {country}"`, each only when set.
pub fn location_context(location: &Location) -> String {
    let mut ctx = String::new();
    if !location.city.is_empty() {
        ctx.push_str(&format!(" in {}", location.city));
    }
    if !location.state.is_empty() {
        ctx.push_str(&format!(", {}", location.state));
    }
    if !location.country.is_empty() {
        ctx.push_str(&format!(", {}", location.country));
    }
    ctx
}

pub fn build_prompt(keyword: &str, location: &Location) -> ContentPrompt {
    let ctx = location_context(location);
    let user = format!(
        "Generate professional, SEO-optimized content for a service page about \"{keyword}\"{ctx}.

Requirements:
1. Write a compelling H1 heading (50-60 chars)
2. Write an intro paragraph (100-120 words) using natural language
3. Create 3 service benefits as H2 sections with 80-100 word descriptions each
4. Include a CTA section
5. Use semantic HTML keywords naturally
6. Ensure 2-3% keyword density
7. Make it locally relevant if location is provided

Format response as JSON with keys: h1, intro, benefits, cta
Each benefit should have: title, description"
    );
    ContentPrompt {
        keyword: keyword.to_string(),
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Deterministic copy built only from the keyword and location.
pub fn fallback_content(keyword: &str, location: &Location) -> GeneratedContent {
    let ctx = location_context(location);
    GeneratedContent {
        h1: format!("Professional {keyword} Services{ctx}"),
        intro: format!(
            "Looking for quality {keyword} services{ctx}? We provide expert solutions tailored to your needs."
        ),
        benefits: vec![
            Benefit {
                title: "Expert Team".to_string(),
                description: format!(
                    "Our experienced professionals deliver top-quality {keyword} services."
                ),
            },
            Benefit {
                title: "Affordable Pricing".to_string(),
                description: format!("Competitive rates for {keyword} without compromising quality."),
            },
            Benefit {
                title: "Fast Service".to_string(),
                description: format!(
                    "Quick turnaround on {keyword} projects while maintaining excellence."
                ),
            },
        ],
        cta: format!("Contact us today for professional {keyword} services!"),
    }
}

#[derive(Debug, Deserialize)]
struct RawContent {
    h1: Option<String>,
    intro: Option<String>,
    #[serde(default)]
    benefits: Vec<RawBenefit>,
    cta: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBenefit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

/// Interpret a model response, falling back to templated copy when it is not
/// a JSON object with the expected keys.
pub fn interpret_response(raw: &str, keyword: &str, location: &Location) -> GeneratedCopy {
    match serde_json::from_str::<RawContent>(strip_code_fence(raw)) {
        Ok(parsed) => GeneratedCopy::Structured(GeneratedContent {
            h1: parsed
                .h1
                .unwrap_or_else(|| format!("Professional {keyword} Services")),
            intro: parsed.intro.unwrap_or_default(),
            benefits: parsed
                .benefits
                .into_iter()
                .map(|b| Benefit {
                    title: b.title,
                    description: b.description,
                })
                .collect(),
            cta: parsed.cta.unwrap_or_default(),
        }),
        Err(e) => {
            warn!(keyword, error = %e, "model response is not structured, using fallback copy");
            GeneratedCopy::Fallback(fallback_content(keyword, location))
        }
    }
}

/// Generate copy for one keyword: build the prompt, call the backend once,
/// and interpret the answer.
pub async fn generate_content<G: ContentGenerator>(
    generator: &G,
    keyword: &str,
    location: &Location,
) -> Result<GeneratedCopy, GenerationError> {
    let prompt = build_prompt(keyword, location);
    let raw = generator.complete(&prompt).await?;
    Ok(interpret_response(&raw, keyword, location))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
