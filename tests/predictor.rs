use ndarray::{Array2, Array3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use mpira::{Fixture, MatchPredictor, PosteriorTrace, PredictError};

const TEAMS: [&str; 3] = ["AGF", "OB", "Silkeborg"];

fn trace_with(
    chains: usize,
    draws: usize,
    adv: impl Fn(usize) -> f64,
    attack: impl Fn(usize, usize) -> f64,
    defense: impl Fn(usize, usize) -> f64,
) -> PosteriorTrace {
    let teams = TEAMS.len();
    PosteriorTrace::new(
        Array2::from_shape_fn((chains, draws), |(c, d)| adv(c * draws + d)),
        Array3::from_shape_fn((chains, draws, teams), |(c, d, t)| attack(c * draws + d, t)),
        Array3::from_shape_fn((chains, draws, teams), |(c, d, t)| defense(c * draws + d, t)),
    )
    .unwrap()
}

fn wobbly_predictor(chains: usize, draws: usize) -> MatchPredictor {
    let trace = trace_with(
        chains,
        draws,
        |i| 0.2 + 0.05 * (i as f64 * 0.37).sin(),
        |i, t| [0.3, 0.0, -0.2][t] + 0.1 * (i as f64 * 0.11 + t as f64).sin(),
        |i, t| [0.1, 0.05, -0.1][t] + 0.1 * (i as f64 * 0.23 - t as f64).cos(),
    );
    MatchPredictor::new(&trace, TEAMS).unwrap()
}

#[test]
fn unknown_team_is_reported_for_either_side() {
    let p = wobbly_predictor(2, 10);
    let err = p.predict_match("X", "AGF", None).unwrap_err();
    assert_eq!(
        err,
        PredictError::UnknownTeam {
            name: "X".to_string()
        }
    );
    let err = p.predict_match("AGF", "Y", None).unwrap_err();
    assert!(matches!(err, PredictError::UnknownTeam { name } if name == "Y"));
}

#[test]
fn oversized_simulation_count_is_rejected() {
    let p = wobbly_predictor(2, 500);
    assert_eq!(p.num_samples(), 1000);
    let err = p.predict_match("AGF", "OB", Some(2000)).unwrap_err();
    assert_eq!(
        err,
        PredictError::InvalidSimulationCount {
            requested: 2000,
            available: 1000
        }
    );
}

#[test]
fn duplicate_team_names_are_a_configuration_error() {
    let trace = trace_with(1, 4, |_| 0.0, |_, _| 0.0, |_, _| 0.0);
    let err = MatchPredictor::new(&trace, ["AGF", "OB", "AGF"]).unwrap_err();
    assert!(matches!(err, PredictError::Configuration { .. }));
}

// The three shares are f64 quotients of integer counts, so their sum is 1 to
// within one ulp rather than bit-exact; the tolerance below is deliberate.
#[test]
fn probabilities_close_for_every_pair_and_count() {
    let p = wobbly_predictor(4, 250);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for home in TEAMS {
        for away in TEAMS {
            for sims in [None, Some(1), Some(37), Some(999), Some(1000)] {
                let res = p.predict_match_with_rng(home, away, sims, &mut rng).unwrap();
                let probs = res.probabilities;
                let sum = probs.home_win + probs.draw + probs.away_win;
                assert!((sum - 1.0).abs() < 1e-12, "{home} v {away} {sims:?}: {sum}");
                assert!(probs.home_win >= 0.0 && probs.draw >= 0.0 && probs.away_win >= 0.0);
            }
        }
    }
}

#[test]
fn expected_goals_are_stable_over_full_sample() {
    let p = wobbly_predictor(2, 300);
    let first = p.predict_match("AGF", "Silkeborg", None).unwrap();
    for _ in 0..5 {
        let again = p.predict_match("AGF", "Silkeborg", None).unwrap();
        assert_eq!(again.expected_home_goals, first.expected_home_goals);
        assert_eq!(again.expected_away_goals, first.expected_away_goals);
        assert_eq!(again.expected_goals, first.expected_goals);
    }
    assert_eq!(first.simulations, 600);
}

#[test]
fn expected_goals_are_means_of_rates() {
    let p = wobbly_predictor(2, 50);
    let (th, ta) = p.goal_rates("OB", "AGF").unwrap();
    let res = p.predict_match("OB", "AGF", None).unwrap();
    assert!((res.expected_home_goals - th.mean().unwrap()).abs() < 1e-12);
    assert!((res.expected_away_goals - ta.mean().unwrap()).abs() < 1e-12);
    assert_eq!(res.expected_goals["OB"], res.expected_home_goals);
    assert_eq!(res.expected_goals["AGF"], res.expected_away_goals);
}

#[test]
fn same_seed_gives_same_prediction() {
    let p = wobbly_predictor(2, 400);
    let a = p
        .predict_match_with_rng("AGF", "OB", Some(300), &mut ChaCha8Rng::seed_from_u64(42))
        .unwrap();
    let b = p
        .predict_match_with_rng("AGF", "OB", Some(300), &mut ChaCha8Rng::seed_from_u64(42))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn flattened_parameters_stay_aligned_per_draw() {
    // Every parameter encodes its own flat draw index, so a misaligned flatten breaks the sum.
    let trace = trace_with(
        3,
        7,
        |i| i as f64 * 1e-3,
        |i, t| if t == 0 { i as f64 * 1e-3 } else { 0.0 },
        |i, t| if t == 1 { -(i as f64) * 1e-3 } else { 0.0 },
    );
    let p = MatchPredictor::new(&trace, TEAMS).unwrap();
    let (th, ta) = p.goal_rates("AGF", "OB").unwrap();
    for i in 0..21 {
        let log_home = th[i].ln();
        assert!((log_home - 3.0 * i as f64 * 1e-3).abs() < 1e-9, "draw {i}");
        assert!((ta[i].ln() - 0.0).abs() < 1e-12);
    }
}

#[test]
fn team_against_itself_only_home_side_gets_advantage() {
    let p = wobbly_predictor(2, 200);
    let (th, ta) = p.goal_rates("OB", "OB").unwrap();
    let trace_adv = |i: usize| 0.2 + 0.05 * (i as f64 * 0.37).sin();
    for i in 0..th.len() {
        assert!((th[i] / ta[i] - trace_adv(i).exp()).abs() < 1e-9);
    }

    let res = p.predict_match("OB", "OB", None).unwrap();
    assert!(res.expected_home_goals > res.expected_away_goals);
    assert_eq!(res.expected_goals.len(), 1);
    assert_eq!(res.expected_goals["OB"], res.expected_away_goals);
}

#[test]
fn stronger_attack_means_more_goals() {
    let base = trace_with(2, 2000, |_| 0.1, |_, _| 0.0, |_, _| 0.0);
    let boosted = trace_with(2, 2000, |_| 0.1, |_, t| if t == 0 { 0.4 } else { 0.0 }, |_, _| 0.0);
    let base = MatchPredictor::new(&base, TEAMS).unwrap();
    let boosted = MatchPredictor::new(&boosted, TEAMS).unwrap();

    let a = base
        .predict_match_with_rng("AGF", "OB", None, &mut ChaCha8Rng::seed_from_u64(1))
        .unwrap();
    let b = boosted
        .predict_match_with_rng("AGF", "OB", None, &mut ChaCha8Rng::seed_from_u64(2))
        .unwrap();
    assert!(b.expected_home_goals > a.expected_home_goals);
    assert_eq!(b.expected_away_goals, a.expected_away_goals);
    assert!(b.probabilities.home_win > a.probabilities.home_win);
}

#[test]
fn even_rates_draw_at_poisson_tie_rate() {
    // P(X = Y) for independent Poisson(1) variables is about 0.3085.
    let trace = trace_with(4, 5000, |_| 0.0, |_, _| 0.0, |_, _| 0.0);
    let p = MatchPredictor::new(&trace, TEAMS).unwrap();
    let res = p
        .predict_match_with_rng("AGF", "OB", None, &mut ChaCha8Rng::seed_from_u64(99))
        .unwrap();
    assert!((res.probabilities.draw - 0.3085).abs() < 0.02, "{:?}", res.probabilities);
    assert!((res.probabilities.home_win - res.probabilities.away_win).abs() < 0.03);
    assert!((res.expected_home_goals - 1.0).abs() < 1e-12);
}

#[test]
fn batch_prediction_keeps_order_and_seeding() {
    let p = wobbly_predictor(2, 250);
    let fixtures = vec![
        Fixture {
            home: "AGF".to_string(),
            away: "OB".to_string(),
        },
        Fixture {
            home: "Silkeborg".to_string(),
            away: "AGF".to_string(),
        },
        Fixture {
            home: "OB".to_string(),
            away: "Silkeborg".to_string(),
        },
    ];
    let out = p.predict_fixtures(&fixtures, Some(200), 500).unwrap();
    assert_eq!(out.len(), 3);
    for (i, (fixture, res)) in fixtures.iter().zip(&out).enumerate() {
        assert_eq!(res.home_team, fixture.home);
        assert_eq!(res.away_team, fixture.away);
        let mut rng = ChaCha8Rng::seed_from_u64(500 + i as u64);
        let single = p
            .predict_match_with_rng(&fixture.home, &fixture.away, Some(200), &mut rng)
            .unwrap();
        assert_eq!(&single, res);
    }
}

#[test]
fn batch_prediction_fails_on_unknown_team() {
    let p = wobbly_predictor(1, 20);
    let fixtures = vec![Fixture {
        home: "AGF".to_string(),
        away: "Lyngby".to_string(),
    }];
    assert!(matches!(
        p.predict_fixtures(&fixtures, None, 0),
        Err(PredictError::UnknownTeam { .. })
    ));
}
