pub mod email_content;
pub mod url_features;
pub mod url_risk;

use serde::{Deserialize, Serialize};

/// Structural measurements of a single URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlFeatures {
    pub url_length: usize,
    pub domain_length: usize,
    pub path_length: usize,
    pub params_length: usize,

    pub dots_count: usize,
    pub hyphens_count: usize,
    pub underscores_count: usize,
    pub slashes_count: usize,
    pub question_marks_count: usize,
    pub equals_count: usize,
    pub ampersand_count: usize,
    pub at_count: usize,

    pub subdomain_count: usize,
    pub is_ip: bool,
    pub has_port: bool,
    pub uses_https: bool,
    pub has_suspicious_words: bool,
    pub has_numbers_in_domain: bool,
    pub excessive_hyphens: bool,
    pub multiple_subdomains: bool,
}

/// Marker for a URL that could not be parsed. Only the raw length survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidUrl {
    pub invalid_url: bool,
    pub url_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureSet {
    Invalid(InvalidUrl),
    Parsed(UrlFeatures),
}

impl FeatureSet {
    pub fn invalid(url_length: usize) -> Self {
        FeatureSet::Invalid(InvalidUrl {
            invalid_url: true,
            url_length,
        })
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, FeatureSet::Invalid(_))
    }

    pub fn parsed(&self) -> Option<&UrlFeatures> {
        match self {
            FeatureSet::Parsed(features) => Some(features),
            FeatureSet::Invalid(_) => None,
        }
    }

    pub fn url_length(&self) -> usize {
        match self {
            FeatureSet::Parsed(features) => features.url_length,
            FeatureSet::Invalid(invalid) => invalid.url_length,
        }
    }
}

/// Contribution of one email analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalScore {
    pub name: String,
    pub score: f64,
    pub evidence: Vec<String>,
}

impl SignalScore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            score: 0.0,
            evidence: Vec::new(),
        }
    }
}

/// Saturate a raw score into the closed `[0, 100]` range.
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}
