pub mod error;
pub mod http_client;
pub mod logging;
pub mod predictor;
pub mod report;
pub mod samples;
pub mod scrape;
pub mod scrape_config;
pub mod teams;
pub mod trace;

pub use error::{PredictError, PredictResult};
pub use predictor::{Fixture, MatchPredictor, OutcomeProbabilities, PredictionResult};
pub use trace::PosteriorTrace;
