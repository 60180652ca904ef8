use crate::config::{Config, Thresholds};
use crate::corpus::Corpus;
use crate::features::email_content::{EmailAnalysis, EmailContentAnalyzer};
use crate::features::url_features::UrlFeatureExtractor;
use crate::features::url_risk::UrlRiskScorer;
use crate::prediction::{EmailPrediction, PredictionAssembler, UrlPrediction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One email in a batch request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailInput {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// Entry point for URL and email classification. Holds only read-only data,
/// so a single instance can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct PhishingDetector {
    corpus: Corpus,
    thresholds: Thresholds,
}

impl Default for PhishingDetector {
    fn default() -> Self {
        Self {
            corpus: Corpus::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl PhishingDetector {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        validate_thresholds(&config.thresholds)?;
        let corpus = Corpus::compile(&config.corpus)?;

        log::info!(
            "Phishing detector ready: {} keywords, {} domain indicators, {} shorteners, {} phrase rules",
            corpus.keywords().len(),
            corpus.suspicious_domains().len(),
            corpus.shorteners().len(),
            corpus.phrase_rules().len()
        );

        Ok(Self {
            corpus,
            thresholds: config.thresholds.clone(),
        })
    }

    pub fn with_corpus(corpus: Corpus, thresholds: Thresholds) -> anyhow::Result<Self> {
        validate_thresholds(&thresholds)?;
        Ok(Self { corpus, thresholds })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn predict_url(&self, url: &str) -> UrlPrediction {
        let features = UrlFeatureExtractor::new().extract(url);
        let risk = UrlRiskScorer::new(&self.corpus).score(&features, url);
        PredictionAssembler::new(&self.thresholds).assemble_url(features, risk)
    }

    pub fn analyze_email(&self, subject: &str, body: &str) -> EmailAnalysis {
        EmailContentAnalyzer::new(&self.corpus, &self.thresholds).analyze(subject, body)
    }

    pub fn predict_email(&self, subject: &str, body: &str) -> EmailPrediction {
        let analysis = self.analyze_email(subject, body);
        PredictionAssembler::new(&self.thresholds).assemble_email(analysis)
    }

    pub fn predict_batch(&self, emails: &[EmailInput]) -> Vec<EmailPrediction> {
        emails
            .iter()
            .map(|email| self.predict_email(&email.subject, &email.body))
            .collect()
    }

    /// Evaluates each email on the blocking pool. Results keep input order.
    pub async fn predict_batch_concurrent(
        self: Arc<Self>,
        emails: Vec<EmailInput>,
    ) -> anyhow::Result<Vec<EmailPrediction>> {
        let handles: Vec<_> = emails
            .into_iter()
            .map(|email| {
                let detector = Arc::clone(&self);
                tokio::task::spawn_blocking(move || {
                    detector.predict_email(&email.subject, &email.body)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await?);
        }
        Ok(results)
    }
}

fn validate_thresholds(thresholds: &Thresholds) -> anyhow::Result<()> {
    anyhow::ensure!(
        thresholds.url_confidence_min <= thresholds.url_confidence_max,
        "url confidence bounds are inverted ({} > {})",
        thresholds.url_confidence_min,
        thresholds.url_confidence_max
    );
    anyhow::ensure!(
        thresholds.email_confidence_min <= thresholds.email_confidence_max,
        "email confidence bounds are inverted ({} > {})",
        thresholds.email_confidence_min,
        thresholds.email_confidence_max
    );
    anyhow::ensure!(
        thresholds.embedded_url_confidence_min <= thresholds.embedded_url_confidence_max,
        "embedded url confidence bounds are inverted ({} > {})",
        thresholds.embedded_url_confidence_min,
        thresholds.embedded_url_confidence_max
    );
    anyhow::ensure!(
        thresholds.url_weight.is_finite() && thresholds.url_weight >= 0.0,
        "url weight must be a non-negative number"
    );
    anyhow::ensure!(
        thresholds.email_phishing.is_finite(),
        "email phishing threshold must be a number"
    );
    Ok(())
}
