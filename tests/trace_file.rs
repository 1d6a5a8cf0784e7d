use std::path::PathBuf;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use mpira::report::render_prediction;
use mpira::trace::{load_trace_file, parse_trace_json};
use mpira::{MatchPredictor, PredictError};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn superliga() -> MatchPredictor {
    let file = load_trace_file(&fixture_path("superliga_trace.json")).expect("fixture should load");
    MatchPredictor::from_trace_file(&file).expect("fixture should build a predictor")
}

#[test]
fn loads_superliga_fixture() {
    let file = load_trace_file(&fixture_path("superliga_trace.json")).unwrap();
    assert_eq!(file.trace.chains(), 2);
    assert_eq!(file.trace.draws(), 500);
    assert_eq!(file.trace.num_teams(), 4);
    assert_eq!(file.teams[0], "FC København");

    let p = MatchPredictor::from_trace_file(&file).unwrap();
    assert_eq!(p.num_samples(), 1000);
    assert_eq!(p.team_index("Vejle BK"), Some(3));
}

#[test]
fn strong_home_side_is_favoured() {
    let p = superliga();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let res = p
        .predict_match_with_rng("FC København", "Vejle BK", None, &mut rng)
        .unwrap();
    assert!(res.probabilities.home_win > 0.6, "{:?}", res.probabilities);
    assert!(res.probabilities.home_win > res.probabilities.away_win);
    assert!(res.expected_home_goals > 2.0);
    assert!(res.expected_away_goals < 1.0);
}

#[test]
fn fixture_rejects_more_simulations_than_samples() {
    let p = superliga();
    let err = p
        .predict_match("FC København", "Brøndby IF", Some(2000))
        .unwrap_err();
    assert!(matches!(
        err,
        PredictError::InvalidSimulationCount {
            requested: 2000,
            available: 1000
        }
    ));
}

#[test]
fn unknown_fixture_team_is_rejected() {
    let p = superliga();
    let err = p.predict_match("X", "Brøndby IF", None).unwrap_err();
    assert!(matches!(err, PredictError::UnknownTeam { .. }));
}

#[test]
fn rendered_prediction_names_both_teams() {
    let p = superliga();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let res = p
        .predict_match_with_rng("FC Midtjylland", "Brøndby IF", Some(500), &mut rng)
        .unwrap();
    let text = render_prediction(&res);
    assert!(text.starts_with("Predicted probabilities for FC Midtjylland vs Brøndby IF:\n"));
    assert!(text.contains("Home win probability: "));
    assert!(text.contains(&format!("FC Midtjylland: {:.2}\n", res.expected_home_goals)));
}

#[test]
fn prediction_serializes_to_json() {
    let p = superliga();
    let res = p.predict_match("Vejle BK", "FC Midtjylland", Some(100)).unwrap();
    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(json["home_team"], "Vejle BK");
    assert!(json["probabilities"]["draw"].is_number());
    assert!(json["expected_goals"]["FC Midtjylland"].is_number());
}

#[test]
fn team_count_must_match_trace() {
    let raw = std::fs::read_to_string(fixture_path("superliga_trace.json")).unwrap();
    let raw = raw.replace("\"Vejle BK\"", "\"Vejle BK\", \"AaB\"");
    let file = parse_trace_json(&raw).unwrap();
    let err = MatchPredictor::from_trace_file(&file).unwrap_err();
    assert!(matches!(err, PredictError::Configuration { .. }));
}
