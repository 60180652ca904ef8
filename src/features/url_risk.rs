use super::FeatureSet;
use crate::corpus::{Corpus, DomainIndicator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    /// In evaluation order, not severity order.
    pub factors: Vec<String>,
}

impl RiskAssessment {
    fn add(&mut self, points: u32, factor: impl Into<String>) {
        self.score += points;
        self.factors.push(factor.into());
    }

    fn clamped(mut self) -> Self {
        self.score = self.score.min(100);
        self
    }
}

/// Additive penalty model over a URL's features and the corpus blacklists.
pub struct UrlRiskScorer<'a> {
    corpus: &'a Corpus,
}

impl<'a> UrlRiskScorer<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self { corpus }
    }

    pub fn score(&self, features: &FeatureSet, url: &str) -> RiskAssessment {
        let mut assessment = RiskAssessment {
            score: 0,
            factors: Vec::new(),
        };

        let features = match features {
            FeatureSet::Parsed(features) => features,
            FeatureSet::Invalid(_) => {
                assessment.add(80, "Invalid URL format");
                return assessment.clamped();
            }
        };

        if features.url_length > 100 {
            assessment.add(25, "Extremely long URL");
        } else if features.url_length > 75 {
            assessment.add(15, "Very long URL");
        } else if features.url_length > 50 {
            assessment.add(8, "Long URL");
        }

        if features.is_ip {
            assessment.add(40, "IP address instead of domain");
        }

        if features.domain_length < 4 {
            assessment.add(20, "Suspiciously short domain");
        }

        if features.subdomain_count > 3 {
            assessment.add(20, "Too many subdomains");
        } else if features.subdomain_count > 2 {
            assessment.add(10, "Multiple subdomains");
        }

        if features.dots_count > 5 {
            assessment.add(15, "Excessive dots in URL");
        }

        if features.hyphens_count > 4 {
            assessment.add(20, "Excessive hyphens");
        } else if features.hyphens_count > 2 {
            assessment.add(10, "Multiple hyphens");
        }

        if features.at_count > 0 {
            assessment.add(30, "@ symbol in URL (redirect technique)");
        }

        if !features.uses_https {
            assessment.add(15, "Not using HTTPS");
        }

        if features.has_port {
            assessment.add(10, "Custom port number");
        }

        if features.has_suspicious_words {
            assessment.add(25, "Contains suspicious keywords");
        }

        if features.has_numbers_in_domain {
            assessment.add(8, "Numbers in domain name");
        }

        let lower_url = url.to_lowercase();
        self.check_suspicious_domains(&lower_url, &mut assessment);
        self.check_shorteners(&lower_url, &mut assessment);

        log::debug!(
            "URL '{}' scored {} ({} factors)",
            url,
            assessment.score,
            assessment.factors.len()
        );

        assessment.clamped()
    }

    // Declaration order, first hit of either kind ends the scan.
    fn check_suspicious_domains(&self, lower_url: &str, assessment: &mut RiskAssessment) {
        for indicator in self.corpus.suspicious_domains() {
            match indicator {
                DomainIndicator::Literal(domain) => {
                    if lower_url.contains(domain.as_str()) {
                        assessment.add(50, format!("Known suspicious domain: {}", domain));
                        return;
                    }
                }
                DomainIndicator::Pattern(pattern) => {
                    if pattern.is_match(lower_url) {
                        assessment.add(35, "Matches suspicious domain pattern");
                        return;
                    }
                }
            }
        }
    }

    fn check_shorteners(&self, lower_url: &str, assessment: &mut RiskAssessment) {
        if self
            .corpus
            .shorteners()
            .iter()
            .any(|s| lower_url.contains(s.as_str()))
        {
            assessment.add(45, "URL shortener detected");
        }
    }
}
