use std::collections::HashMap;

use crate::error::{PredictError, PredictResult};

/// Ordered team names; a team's position is its index into the per-team sample axis.
#[derive(Debug, Clone)]
pub struct TeamRegistry {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl TeamRegistry {
    pub fn new<I, S>(teams: I) -> PredictResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = teams.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(PredictError::configuration("team list is empty"));
        }

        let mut index = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if index.insert(name.clone(), idx).is_some() {
                return Err(PredictError::configuration(format!(
                    "duplicate team name: {name}"
                )));
            }
        }

        Ok(Self { names, index })
    }

    pub fn index_of(&self, name: &str) -> PredictResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| PredictError::UnknownTeam {
                name: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
