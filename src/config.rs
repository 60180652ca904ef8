use crate::corpus::CorpusConfig;
use serde::{Deserialize, Serialize};

/// Decision thresholds and confidence bounds used when assembling predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A standalone URL is phishing when its score exceeds this.
    pub url_phishing: u32,
    /// An email is phishing when its blended score exceeds this.
    pub email_phishing: f64,
    /// Embedded URLs scoring above this are reported as malicious links.
    pub malicious_url: u32,
    /// Fraction of each embedded URL's score added to the email total.
    pub url_weight: f64,
    pub url_confidence_min: f64,
    pub url_confidence_max: f64,
    pub email_confidence_min: f64,
    pub email_confidence_max: f64,
    pub embedded_url_confidence_min: u32,
    pub embedded_url_confidence_max: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            url_phishing: 50,
            email_phishing: 40.0,
            malicious_url: 60,
            url_weight: 0.8,
            url_confidence_min: 65.0,
            url_confidence_max: 98.0,
            email_confidence_min: 70.0,
            email_confidence_max: 98.0,
            embedded_url_confidence_min: 75,
            embedded_url_confidence_max: 95,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub thresholds: Thresholds,
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
