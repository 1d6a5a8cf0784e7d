use std::cmp::Ordering;
use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis, Zip};
use rand::Rng;
use rand::SeedableRng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Poisson};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PredictError, PredictResult};
use crate::samples::{flatten_per_team, flatten_scalar};
use crate::teams::TeamRegistry;
use crate::trace::{PosteriorTrace, TraceFile};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub home_team: String,
    pub away_team: String,
    pub probabilities: OutcomeProbabilities,
    // Keyed by team name; a team playing itself collapses to one entry holding the away value.
    pub expected_goals: BTreeMap<String, f64>,
    pub expected_home_goals: f64,
    pub expected_away_goals: f64,
    pub simulations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub home: String,
    pub away: String,
}

/// Simulates match outcomes from flattened posterior samples of the goal model.
///
/// Home goals follow `Poisson(exp(home_advantage + attack[home] - defense[away]))`
/// and away goals `Poisson(exp(attack[away] - defense[home]))`, one draw per
/// posterior sample. State is read-only after construction.
#[derive(Debug, Clone)]
pub struct MatchPredictor {
    teams: TeamRegistry,
    home_advantage: Array1<f64>,
    attack_strength: Array2<f64>,
    defense_strength: Array2<f64>,
}

impl MatchPredictor {
    pub fn new<I, S>(trace: &PosteriorTrace, teams: I) -> PredictResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let teams = TeamRegistry::new(teams)?;
        if trace.num_teams() != teams.len() {
            return Err(PredictError::configuration(format!(
                "trace has samples for {} teams but {} team names were given",
                trace.num_teams(),
                teams.len()
            )));
        }

        let home_advantage = flatten_scalar(&trace.home_advantage)?;
        let attack_strength = flatten_per_team(&trace.attack_strength)?;
        let defense_strength = flatten_per_team(&trace.defense_strength)?;

        debug!(
            chains = trace.chains(),
            draws = trace.draws(),
            teams = teams.len(),
            "match predictor ready"
        );

        Ok(Self {
            teams,
            home_advantage,
            attack_strength,
            defense_strength,
        })
    }

    pub fn from_trace_file(file: &TraceFile) -> PredictResult<Self> {
        Self::new(&file.trace, file.teams.iter().cloned())
    }

    pub fn num_samples(&self) -> usize {
        self.home_advantage.len()
    }

    pub fn teams(&self) -> &[String] {
        self.teams.names()
    }

    pub fn team_index(&self, name: &str) -> Option<usize> {
        self.teams.get(name)
    }

    pub fn goal_rates(
        &self,
        home_team: &str,
        away_team: &str,
    ) -> PredictResult<(Array1<f64>, Array1<f64>)> {
        let home_idx = self.teams.index_of(home_team)?;
        let away_idx = self.teams.index_of(away_team)?;

        let home_attack = self.attack_strength.column(home_idx);
        let home_defense = self.defense_strength.column(home_idx);
        let away_attack = self.attack_strength.column(away_idx);
        let away_defense = self.defense_strength.column(away_idx);

        let theta_home = Zip::from(&self.home_advantage)
            .and(&home_attack)
            .and(&away_defense)
            .map_collect(|&adv, &att, &def| (adv + att - def).exp());
        // No home advantage term on the away side.
        let theta_away = Zip::from(&away_attack)
            .and(&home_defense)
            .map_collect(|&att, &def| (att - def).exp());

        Ok((theta_home, theta_away))
    }

    pub fn predict_match(
        &self,
        home_team: &str,
        away_team: &str,
        num_simulations: Option<usize>,
    ) -> PredictResult<PredictionResult> {
        self.predict_match_with_rng(
            home_team,
            away_team,
            num_simulations,
            &mut rand::thread_rng(),
        )
    }

    pub fn predict_match_with_rng<R: Rng + ?Sized>(
        &self,
        home_team: &str,
        away_team: &str,
        num_simulations: Option<usize>,
        rng: &mut R,
    ) -> PredictResult<PredictionResult> {
        let (mut theta_home, mut theta_away) = self.goal_rates(home_team, away_team)?;

        let total = theta_home.len();
        if let Some(requested) = num_simulations {
            if requested == 0 || requested > total {
                return Err(PredictError::InvalidSimulationCount {
                    requested,
                    available: total,
                });
            }
            if requested < total {
                let picks = index::sample(rng, total, requested).into_vec();
                theta_home = theta_home.select(Axis(0), &picks);
                theta_away = theta_away.select(Axis(0), &picks);
            }
        }

        let n = theta_home.len();
        debug!(home_team, away_team, simulations = n, "simulating match");

        let (mut home_wins, mut draws, mut away_wins) = (0usize, 0usize, 0usize);
        for (&rate_home, &rate_away) in theta_home.iter().zip(theta_away.iter()) {
            let goals_home = sample_goals(rate_home, rng);
            let goals_away = sample_goals(rate_away, rng);
            match goals_home.cmp(&goals_away) {
                Ordering::Greater => home_wins += 1,
                Ordering::Equal => draws += 1,
                Ordering::Less => away_wins += 1,
            }
        }

        let probabilities = outcome_probabilities(home_wins, draws, away_wins);
        let expected_home_goals = theta_home.mean().unwrap_or(0.0);
        let expected_away_goals = theta_away.mean().unwrap_or(0.0);

        let mut expected_goals = BTreeMap::new();
        expected_goals.insert(home_team.to_string(), expected_home_goals);
        expected_goals.insert(away_team.to_string(), expected_away_goals);

        Ok(PredictionResult {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            probabilities,
            expected_goals,
            expected_home_goals,
            expected_away_goals,
            simulations: n,
        })
    }

    // Fixture `i` gets its own ChaCha8Rng seeded with `seed + i`.
    pub fn predict_fixtures(
        &self,
        fixtures: &[Fixture],
        num_simulations: Option<usize>,
        seed: u64,
    ) -> PredictResult<Vec<PredictionResult>> {
        fixtures
            .par_iter()
            .enumerate()
            .map(|(i, fixture)| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
                self.predict_match_with_rng(&fixture.home, &fixture.away, num_simulations, &mut rng)
            })
            .collect()
    }
}

fn sample_goals<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> u64 {
    // Poisson(0) is degenerate at zero; non-finite rates are treated the same way.
    if !(rate.is_finite() && rate > 0.0) {
        return 0;
    }
    match Poisson::new(rate) {
        Ok(dist) => dist.sample(rng) as u64,
        Err(_) => 0,
    }
}

fn outcome_probabilities(home_wins: usize, draws: usize, away_wins: usize) -> OutcomeProbabilities {
    let n = (home_wins + draws + away_wins) as f64;
    if n == 0.0 {
        return OutcomeProbabilities {
            home_win: 0.0,
            draw: 0.0,
            away_win: 0.0,
        };
    }
    let home_win = home_wins as f64 / n;
    let away_win = away_wins as f64 / n;
    let mut draw = draws as f64 / n;
    // Put any rounding residue into draw so the three always close to 1.
    draw += 1.0 - (home_win + draw + away_win);
    OutcomeProbabilities {
        home_win,
        draw,
        away_win,
    }
}
