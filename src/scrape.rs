use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::http_client::http_client;
use crate::scrape_config::{Provider, ScraperConfig};

const SUPERSTATS_PROGRAM_URL: &str = "https://superstats.dk/program";
// Keeps the prompt inside a small local model's context window.
const MAX_PAGE_CHARS: usize = 60_000;

pub trait Schema: DeserializeOwned {
    /// JSON skeleton of the expected output, each leaf holding its field description.
    fn describe() -> Value;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub dato: NaiveDate,
    pub home: String,
    pub visitor: String,
    pub home_goals: u32,
    pub visitor_goals: u32,
    pub attendance: u32,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matches {
    pub matches: Vec<Match>,
}

impl Schema for Matches {
    fn describe() -> Value {
        json!({
            "matches": [{
                "dato": "Game played date (YYYY-MM-DD)",
                "home": "Name of the team playing at home",
                "visitor": "Name of the team playing away",
                "home_goals": "Number of goals scored by home team (integer)",
                "visitor_goals": "Number of goals scored by away team (integer)",
                "attendance": "Number of spectators (integer)",
                "url": "Link to the match page"
            }]
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub description: String,
    pub email: String,
}

impl Schema for Company {
    fn describe() -> Value {
        json!({
            "name": "Name of the company",
            "description": "What the company does",
            "email": "Contact email address"
        })
    }
}

pub trait Extractor {
    fn extract(
        &self,
        prompt: &str,
        page: &str,
        schema: &Value,
        config: &ScraperConfig,
    ) -> Result<Value>;
}

/// Extraction through an Ollama-compatible `/api/generate` endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct OllamaExtractor;

impl Extractor for OllamaExtractor {
    fn extract(
        &self,
        prompt: &str,
        page: &str,
        schema: &Value,
        config: &ScraperConfig,
    ) -> Result<Value> {
        let provider = config.provider();
        if provider != Some(Provider::Ollama) {
            let name = provider.map(Provider::as_str).unwrap_or("unknown");
            return Err(anyhow!(
                "extraction backend for provider {name} is not supported (model {})",
                config.llm.model
            ));
        }
        let base_url = config
            .llm
            .base_url
            .as_deref()
            .context("ollama config needs a base_url")?;

        let body = generate_request(prompt, page, schema, config);
        if config.verbose {
            info!(
                model = config.llm.model_name(),
                page_chars = page.len(),
                "sending extraction request"
            );
        }

        let url = format!("{}/api/generate", base_url.trim_end_matches('/'));
        let resp = http_client()?
            .post(&url)
            .json(&body)
            .send()
            .context("extraction request failed")?;
        let status = resp.status();
        let text = resp.text().context("failed reading extraction body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, text));
        }
        parse_generate_response(&text)
    }
}

fn generate_request(prompt: &str, page: &str, schema: &Value, config: &ScraperConfig) -> Value {
    let mut body = json!({
        "model": config.llm.model_name(),
        "prompt": build_prompt(prompt, page, schema),
        "stream": false,
        "options": { "temperature": config.llm.temperature },
    });
    if let Some(format) = config.llm.format.as_deref() {
        body["format"] = Value::String(format.to_string());
    }
    body
}

pub fn build_prompt(prompt: &str, page: &str, schema: &Value) -> String {
    let page = truncate_chars(page, MAX_PAGE_CHARS);
    format!(
        "You are a website scraper. {prompt}\n\n\
         Answer with JSON only, following this structure:\n{schema}\n\n\
         Website content:\n{page}"
    )
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub fn parse_generate_response(raw: &str) -> Result<Value> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid generate response json")?;
    let output = root
        .get("response")
        .and_then(|v| v.as_str())
        .context("generate response has no `response` field")?;
    serde_json::from_str(strip_code_fence(output)).context("model output is not valid json")
}

fn strip_code_fence(s: &str) -> &str {
    let t = s.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn fetch_page(url: &str) -> Result<String> {
    let resp = http_client()?
        .get(url)
        .send()
        .with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }
    Ok(body)
}

pub fn extract_from_page<T: Schema>(
    prompt: &str,
    page: &str,
    config: &ScraperConfig,
    extractor: &dyn Extractor,
) -> Result<T> {
    let raw = extractor.extract(prompt, page, &T::describe(), config)?;
    serde_json::from_value(raw).context("extracted data does not match schema")
}

pub fn get_data<T: Schema>(
    prompt: &str,
    url: &str,
    config: &ScraperConfig,
    extractor: &dyn Extractor,
) -> Result<T> {
    debug!(url, model = %config.llm.model, "scraping page");
    let page = fetch_page(url)?;
    extract_from_page(prompt, &page, config, extractor)
}

/// Results page for a season given two-digit years, e.g. `(23, 24)`.
pub fn season_url(start_yy: u8, end_yy: u8) -> String {
    format!("{SUPERSTATS_PROGRAM_URL}?aar=20{start_yy:02}%2F20{end_yy:02}")
}

pub fn season_output_path(dir: &Path, start_yy: u8, end_yy: u8) -> PathBuf {
    dir.join(format!("{start_yy:02}{end_yy:02}x.json"))
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).context("serialize scraped data")?;
    fs::write(&tmp, json).context("write scraped data")?;
    fs::rename(&tmp, path).context("swap scraped data")?;
    Ok(())
}
