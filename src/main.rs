use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

use mpira::logging::init_tracing;
use mpira::predictor::{Fixture, MatchPredictor};
use mpira::report::render_prediction;
use mpira::trace::load_trace_file;

const DEFAULT_TRACE_PATH: &str = "data/trace.json";

#[derive(Debug, Default)]
struct Args {
    trace: Option<PathBuf>,
    fixtures: Option<PathBuf>,
    sims: Option<usize>,
    seed: Option<u64>,
    json: bool,
    teams: Vec<String>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let args = parse_args(std::env::args().skip(1).collect())?;

    let trace_path = args
        .trace
        .clone()
        .or_else(|| std::env::var("MPIRA_TRACE_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TRACE_PATH));
    let file = load_trace_file(&trace_path)?;
    let predictor = MatchPredictor::from_trace_file(&file)?;
    info!(
        trace = %trace_path.display(),
        samples = predictor.num_samples(),
        teams = predictor.teams().len(),
        "loaded posterior trace"
    );

    let fixtures = collect_fixtures(&args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let predictions = predictor.predict_fixtures(&fixtures, args.sims, seed)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&predictions).context("serialize predictions")?
        );
    } else {
        for (idx, prediction) in predictions.iter().enumerate() {
            if idx > 0 {
                println!();
            }
            print!("{}", render_prediction(prediction));
        }
    }

    Ok(())
}

fn collect_fixtures(args: &Args) -> Result<Vec<Fixture>> {
    let mut fixtures = Vec::new();
    if let Some(path) = &args.fixtures {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read fixtures {}", path.display()))?;
        let parsed: Vec<Fixture> =
            serde_json::from_str(&raw).context("fixtures must be a json list of {home, away}")?;
        fixtures.extend(parsed);
    }

    if args.teams.len() % 2 != 0 {
        bail!("team names must come in HOME AWAY pairs");
    }
    for pair in args.teams.chunks(2) {
        fixtures.push(Fixture {
            home: pair[0].clone(),
            away: pair[1].clone(),
        });
    }

    if fixtures.is_empty() {
        bail!(
            "usage: mpira [--trace PATH] [--sims N] [--seed N] [--json] [--fixtures PATH] HOME AWAY [HOME AWAY ...]"
        );
    }
    Ok(fixtures)
}

fn parse_args(raw: Vec<String>) -> Result<Args> {
    let mut args = Args::default();
    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => {
                (flag.to_string(), Some(value.to_string()))
            }
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String> {
            inline
                .clone()
                .or_else(|| iter.next())
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{name} needs a value"))
        };
        match flag.as_str() {
            "--trace" => args.trace = Some(PathBuf::from(value("--trace")?)),
            "--fixtures" => args.fixtures = Some(PathBuf::from(value("--fixtures")?)),
            "--sims" => {
                let v = value("--sims")?;
                let sims = v.trim().parse().with_context(|| format!("invalid --sims {v}"))?;
                args.sims = Some(sims);
            }
            "--seed" => {
                let v = value("--seed")?;
                let seed = v.trim().parse().with_context(|| format!("invalid --seed {v}"))?;
                args.seed = Some(seed);
            }
            "--json" => args.json = true,
            other if other.starts_with("--") => bail!("unknown option {other}"),
            _ => args.teams.push(arg),
        }
    }
    Ok(args)
}
