use std::env;

use serde::{Deserialize, Serialize};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Ollama,
    Groq,
    GoogleGenai,
    Openai,
}

impl Provider {
    pub fn from_model(model: &str) -> Option<Self> {
        let (prefix, _) = model.split_once('/')?;
        Self::parse(prefix)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "groq" => Some(Self::Groq),
            "google_genai" | "gemini" | "google" => Some(Self::GoogleGenai),
            "openai" => Some(Self::Openai),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Groq => "groq",
            Self::GoogleGenai => "google_genai",
            Self::Openai => "openai",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `provider/model`, e.g. `ollama/llama3.1`.
    pub model: String,
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl LlmConfig {
    pub fn model_name(&self) -> &str {
        self.model
            .split_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub llm: LlmConfig,
    #[serde(default)]
    pub verbose: bool,
    // Kept for parity with browser-based backends; pages are fetched over plain HTTP.
    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_headless() -> bool {
    true
}

/// The gemini preset. `OllamaExtractor` only accepts ollama models, so scraping
/// with the bundled extractor needs `ScraperConfig::ollama()` or `MPIRA_PROVIDER=ollama`.
impl Default for ScraperConfig {
    fn default() -> Self {
        Self::gemini()
    }
}

impl ScraperConfig {
    pub fn ollama() -> Self {
        Self {
            llm: LlmConfig {
                model: "ollama/llama3.1".to_string(),
                temperature: 0.0,
                format: Some("json".to_string()),
                base_url: Some(DEFAULT_OLLAMA_URL.to_string()),
            },
            verbose: false,
            headless: true,
        }
    }

    pub fn groq() -> Self {
        Self {
            llm: LlmConfig {
                model: "groq/llama3-8b-8192".to_string(),
                temperature: 0.0,
                format: None,
                base_url: None,
            },
            verbose: true,
            headless: true,
        }
    }

    pub fn gemini() -> Self {
        Self {
            llm: LlmConfig {
                model: "google_genai/gemini-pro".to_string(),
                temperature: 0.0,
                format: None,
                base_url: None,
            },
            verbose: false,
            headless: true,
        }
    }

    pub fn openai() -> Self {
        Self {
            llm: LlmConfig {
                model: "openai/gpt-4o".to_string(),
                temperature: 0.0,
                format: None,
                base_url: None,
            },
            verbose: false,
            headless: true,
        }
    }

    pub fn preset(provider: Provider) -> Self {
        match provider {
            Provider::Ollama => Self::ollama(),
            Provider::Groq => Self::groq(),
            Provider::GoogleGenai => Self::gemini(),
            Provider::Openai => Self::openai(),
        }
    }

    pub fn provider(&self) -> Option<Provider> {
        Provider::from_model(&self.llm.model)
    }

    /// Preset chosen by `MPIRA_PROVIDER`, with per-field overrides from
    /// `MPIRA_MODEL`, `MPIRA_TEMPERATURE`, `MPIRA_FORMAT`, `MPIRA_BASE_URL`,
    /// `MPIRA_VERBOSE` and `MPIRA_HEADLESS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let opt = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| {
                    let t = v.trim().to_ascii_lowercase();
                    !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
                })
                .unwrap_or(default)
        };

        let mut cfg = opt("MPIRA_PROVIDER")
            .and_then(|p| Provider::parse(&p))
            .map(Self::preset)
            .unwrap_or_default();

        if let Some(model) = opt("MPIRA_MODEL") {
            cfg.llm.model = model;
        }
        if let Some(temperature) = opt("MPIRA_TEMPERATURE").and_then(|v| v.parse::<f64>().ok()) {
            cfg.llm.temperature = temperature.clamp(0.0, 2.0);
        }
        if let Some(format) = opt("MPIRA_FORMAT") {
            cfg.llm.format = Some(format);
        }
        if let Some(base_url) = opt("MPIRA_BASE_URL") {
            cfg.llm.base_url = Some(base_url.trim_end_matches('/').to_string());
        }
        cfg.verbose = flag("MPIRA_VERBOSE", cfg.verbose);
        cfg.headless = flag("MPIRA_HEADLESS", cfg.headless);
        cfg
    }
}
