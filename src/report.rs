use std::fmt;

use crate::predictor::PredictionResult;

/// Render a prediction as plain text: percentages and expected goals to two decimals.
pub fn render_prediction(prediction: &PredictionResult) -> String {
    let probs = &prediction.probabilities;
    let mut out = String::new();
    out.push_str(&format!(
        "Predicted probabilities for {} vs {}:\n",
        prediction.home_team, prediction.away_team
    ));
    out.push_str(&format!("Home win probability: {}\n", percent(probs.home_win)));
    out.push_str(&format!("Draw probability: {}\n", percent(probs.draw)));
    out.push_str(&format!("Away win probability: {}\n", percent(probs.away_win)));
    out.push_str("\nExpected goals:\n");
    out.push_str(&format!(
        "{}: {:.2}\n",
        prediction.home_team, prediction.expected_home_goals
    ));
    out.push_str(&format!(
        "{}: {:.2}\n",
        prediction.away_team, prediction.expected_away_goals
    ));
    out
}

fn percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_prediction(self))
    }
}
