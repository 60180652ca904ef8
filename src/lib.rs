pub mod config;
pub mod corpus;
pub mod detector;
pub mod domain_utils;
pub mod features;
pub mod prediction;

pub use config::{Config, Thresholds};
pub use corpus::{Corpus, CorpusConfig};
pub use detector::{EmailInput, PhishingDetector};
pub use features::FeatureSet;
pub use prediction::{EmailPrediction, EmailVerdict, UrlPrediction, UrlVerdict};
