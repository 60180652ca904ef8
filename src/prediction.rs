use crate::config::Thresholds;
use crate::features::email_content::{EmailAnalysis, UrlAssessment};
use crate::features::url_risk::RiskAssessment;
use crate::features::FeatureSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlVerdict {
    Phishing,
    Safe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailVerdict {
    #[serde(rename = "Phishing Email")]
    PhishingEmail,
    #[serde(rename = "Safe Email")]
    SafeEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlLengthRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainReputation {
    Acceptable,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityIndicators {
    pub uses_https: bool,
    pub has_suspicious_domain: bool,
    pub url_length_risk: UrlLengthRisk,
    pub domain_reputation: DomainReputation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlPrediction {
    pub prediction: UrlVerdict,
    pub confidence: u32,
    pub features: FeatureSet,
    pub risk_factors: Vec<String>,
    pub threat_score: u32,
    pub security_indicators: SecurityIndicators,
}

/// Verdict for one URL found inside an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedUrlPrediction {
    pub url: String,
    pub prediction: UrlVerdict,
    pub confidence: u32,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailPrediction {
    pub prediction: EmailVerdict,
    pub confidence: u32,
    pub reason: String,
    pub total_links: usize,
    pub malicious_links: Vec<String>,
    pub suspicious_patterns: Vec<String>,
    pub url_predictions: Vec<EmbeddedUrlPrediction>,
    pub risk_score: u32,
}

impl EmailPrediction {
    pub fn is_phishing(&self) -> bool {
        self.prediction == EmailVerdict::PhishingEmail
    }
}

impl UrlPrediction {
    pub fn is_phishing(&self) -> bool {
        self.prediction == UrlVerdict::Phishing
    }
}

/// Turns raw scores into verdicts, calibrated confidences and caller-facing results.
pub struct PredictionAssembler<'a> {
    thresholds: &'a Thresholds,
}

impl<'a> PredictionAssembler<'a> {
    pub fn new(thresholds: &'a Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn assemble_url(&self, features: FeatureSet, risk: RiskAssessment) -> UrlPrediction {
        let is_phishing = risk.score > self.thresholds.url_phishing;

        let confidence = match features.parsed() {
            None => 95.0,
            Some(f) => {
                let mut confidence = risk.score as f64;
                if f.is_ip {
                    confidence = confidence.max(85.0);
                }
                if f.subdomain_count > 3 {
                    confidence = confidence.max(80.0);
                }
                if !f.uses_https {
                    confidence = confidence.max(75.0);
                }
                confidence
            }
        };
        let confidence = confidence.clamp(
            self.thresholds.url_confidence_min,
            self.thresholds.url_confidence_max,
        );

        let url_length = features.url_length();
        let url_length_risk = if url_length > 75 {
            UrlLengthRisk::High
        } else if url_length > 50 {
            UrlLengthRisk::Medium
        } else {
            UrlLengthRisk::Low
        };

        let security_indicators = match features.parsed() {
            Some(f) => SecurityIndicators {
                uses_https: f.uses_https,
                has_suspicious_domain: f.has_suspicious_words,
                url_length_risk,
                domain_reputation: if f.is_ip {
                    DomainReputation::VeryPoor
                } else if f.subdomain_count > 2 {
                    DomainReputation::Poor
                } else {
                    DomainReputation::Acceptable
                },
            },
            None => SecurityIndicators {
                uses_https: false,
                has_suspicious_domain: false,
                url_length_risk,
                domain_reputation: DomainReputation::Acceptable,
            },
        };

        UrlPrediction {
            prediction: if is_phishing {
                UrlVerdict::Phishing
            } else {
                UrlVerdict::Safe
            },
            confidence: round_score(confidence),
            features,
            risk_factors: risk.factors,
            threat_score: risk.score,
            security_indicators,
        }
    }

    pub fn assemble_email(&self, analysis: EmailAnalysis) -> EmailPrediction {
        let blended = match analysis.mean_url_score() {
            Some(mean) => (analysis.score + mean) / 2.0,
            None => analysis.score,
        };
        let is_phishing = blended > self.thresholds.email_phishing;
        let confidence = blended.clamp(
            self.thresholds.email_confidence_min,
            self.thresholds.email_confidence_max,
        );

        let mut reason = if is_phishing {
            "Multiple phishing indicators detected".to_string()
        } else {
            "Content appears legitimate".to_string()
        };
        if !analysis.malicious_urls.is_empty() {
            reason.push_str(&format!(
                " - {} suspicious URL(s) found",
                analysis.malicious_urls.len()
            ));
        }
        if analysis.suspicious_elements.len() > 5 {
            reason.push_str(" - High number of suspicious patterns");
        }

        log::debug!(
            "Email text score {:.1}, blended {:.1}, phishing: {}",
            analysis.score,
            blended,
            is_phishing
        );

        let url_predictions = analysis
            .url_assessments
            .iter()
            .map(|a| self.embedded_url(a))
            .collect();

        EmailPrediction {
            prediction: if is_phishing {
                EmailVerdict::PhishingEmail
            } else {
                EmailVerdict::SafeEmail
            },
            confidence: round_score(confidence),
            reason,
            total_links: analysis.urls.len(),
            malicious_links: analysis.malicious_urls,
            suspicious_patterns: analysis.suspicious_elements,
            url_predictions,
            risk_score: round_score(analysis.score),
        }
    }

    fn embedded_url(&self, assessment: &UrlAssessment) -> EmbeddedUrlPrediction {
        EmbeddedUrlPrediction {
            url: assessment.url.clone(),
            prediction: if assessment.score > self.thresholds.url_phishing {
                UrlVerdict::Phishing
            } else {
                UrlVerdict::Safe
            },
            confidence: assessment.score.clamp(
                self.thresholds.embedded_url_confidence_min,
                self.thresholds.embedded_url_confidence_max,
            ),
            risk_factors: assessment.factors.clone(),
        }
    }
}

fn round_score(value: f64) -> u32 {
    value.clamp(0.0, 100.0).round() as u32
}
