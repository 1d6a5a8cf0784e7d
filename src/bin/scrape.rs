use std::path::PathBuf;

use anyhow::{Result, bail};
use tracing::{info, warn};

use mpira::logging::init_tracing;
use mpira::scrape::{
    Matches, OllamaExtractor, get_data, save_json, season_output_path, season_url,
};
use mpira::scrape_config::{Provider, ScraperConfig};

const PROMPT: &str = "Get the results of football games";
const SEASONS: [(u8, u8); 3] = [(21, 22), (22, 23), (23, 24)];

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let out_dir = parse_out_dir_arg().unwrap_or_else(|| PathBuf::from("data"));
    let config = ScraperConfig::from_env();
    if config.provider() != Some(Provider::Ollama) {
        bail!(
            "model {} cannot be scraped locally; set MPIRA_PROVIDER=ollama",
            config.llm.model
        );
    }
    info!(model = %config.llm.model, out = %out_dir.display(), "scraping seasons");

    let mut errors = Vec::new();
    for (start, end) in SEASONS {
        let url = season_url(start, end);
        println!("----- Getting Data 20{start:02} - 20{end:02}");
        match get_data::<Matches>(PROMPT, &url, &config, &OllamaExtractor) {
            Ok(results) => {
                let path = season_output_path(&out_dir, start, end);
                save_json(&path, &results)?;
                println!("Matches: {}", results.matches.len());
                println!("Saved: {}", path.display());
            }
            Err(err) => {
                warn!(%url, "season scrape failed: {err:#}");
                errors.push(format!("20{start:02}/20{end:02}: {err:#}"));
            }
        }
    }

    if !errors.is_empty() {
        println!("Errors: {}", errors.len());
        for err in &errors {
            println!(" - {err}");
        }
    }

    Ok(())
}

fn parse_out_dir_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--out=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--out" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
