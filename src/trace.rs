use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::{Array, Array2, Array3, Dimension, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{PredictError, PredictResult};

/// Posterior samples for the goal model, indexed by (chain, draw[, team]).
#[derive(Debug, Clone)]
pub struct PosteriorTrace {
    pub home_advantage: Array2<f64>,
    pub attack_strength: Array3<f64>,
    pub defense_strength: Array3<f64>,
}

impl PosteriorTrace {
    pub fn new(
        home_advantage: Array2<f64>,
        attack_strength: Array3<f64>,
        defense_strength: Array3<f64>,
    ) -> PredictResult<Self> {
        let (chains, draws) = home_advantage.dim();
        if chains == 0 || draws == 0 {
            return Err(PredictError::configuration(format!(
                "home_advantage has no samples (chains={chains}, draws={draws})"
            )));
        }
        for (name, arr) in [
            ("attack_strength", &attack_strength),
            ("defense_strength", &defense_strength),
        ] {
            let (c, d, _) = arr.dim();
            if (c, d) != (chains, draws) {
                return Err(PredictError::configuration(format!(
                    "{name} has (chains, draws) = ({c}, {d}), expected ({chains}, {draws})"
                )));
            }
        }
        if attack_strength.dim().2 != defense_strength.dim().2 {
            return Err(PredictError::configuration(format!(
                "attack_strength covers {} teams but defense_strength covers {}",
                attack_strength.dim().2,
                defense_strength.dim().2
            )));
        }

        Ok(Self {
            home_advantage,
            attack_strength,
            defense_strength,
        })
    }

    pub fn chains(&self) -> usize {
        self.home_advantage.dim().0
    }

    pub fn draws(&self) -> usize {
        self.home_advantage.dim().1
    }

    pub fn num_teams(&self) -> usize {
        self.attack_strength.dim().2
    }
}

/// Row-major array as stored in a trace file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl StoredArray {
    pub fn from_array<S, D>(arr: &ndarray::ArrayBase<S, D>) -> Self
    where
        S: ndarray::Data<Elem = f64>,
        D: Dimension,
    {
        Self {
            shape: arr.shape().to_vec(),
            data: arr.iter().copied().collect(),
        }
    }

    fn into_array<D: Dimension>(self, name: &str) -> Result<Array<f64, D>> {
        let Some(expected) = self
            .shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        else {
            anyhow::bail!("{name}: shape {:?} overflows", self.shape);
        };
        if expected != self.data.len() {
            anyhow::bail!(
                "{name}: shape {:?} needs {expected} values, found {}",
                self.shape,
                self.data.len()
            );
        }
        Array::from_shape_vec(IxDyn(&self.shape), self.data)
            .with_context(|| format!("{name}: invalid shape"))?
            .into_dimensionality::<D>()
            .with_context(|| format!("{name}: unexpected number of axes"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPosterior {
    home_advantage: StoredArray,
    attack_strength: StoredArray,
    defense_strength: StoredArray,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTrace {
    teams: Vec<String>,
    posterior: StoredPosterior,
}

/// A posterior trace together with the team order its last axis follows.
#[derive(Debug, Clone)]
pub struct TraceFile {
    pub teams: Vec<String>,
    pub trace: PosteriorTrace,
}

pub fn parse_trace_json(raw: &str) -> Result<TraceFile> {
    let stored: StoredTrace = serde_json::from_str(raw.trim()).context("invalid trace json")?;
    let posterior = stored.posterior;
    let trace = PosteriorTrace::new(
        posterior.home_advantage.into_array("home_advantage")?,
        posterior.attack_strength.into_array("attack_strength")?,
        posterior.defense_strength.into_array("defense_strength")?,
    )?;
    Ok(TraceFile {
        teams: stored.teams,
        trace,
    })
}

pub fn load_trace_file(path: &Path) -> Result<TraceFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read trace {}", path.display()))?;
    parse_trace_json(&raw).with_context(|| format!("failed to parse trace {}", path.display()))
}

pub fn trace_to_json(teams: &[String], trace: &PosteriorTrace) -> Result<String> {
    let stored = StoredTrace {
        teams: teams.to_vec(),
        posterior: StoredPosterior {
            home_advantage: StoredArray::from_array(&trace.home_advantage),
            attack_strength: StoredArray::from_array(&trace.attack_strength),
            defense_strength: StoredArray::from_array(&trace.defense_strength),
        },
    };
    serde_json::to_string(&stored).context("serialize trace")
}
