use super::url_features::UrlFeatureExtractor;
use super::url_risk::UrlRiskScorer;
use super::{clamp_score, FeatureSet, SignalScore};
use crate::config::Thresholds;
use crate::corpus::Corpus;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

struct TextPattern {
    name: &'static str,
    regex: Regex,
    weight: u32,
}

lazy_static! {
    static ref URL_TOKEN: Regex = Regex::new(r"(?i)https?://\S+").unwrap();
    static ref TEXT_PATTERNS: Vec<TextPattern> = vec![
        TextPattern {
            name: "all_caps",
            regex: Regex::new(r"(?-u)\b[A-Z]{3,}\b").unwrap(),
            weight: 8,
        },
        TextPattern {
            name: "money_amounts",
            regex: Regex::new(r"(?i-u)\$[0-9]+|[0-9]+\s*(USD|EUR|GBP|dollars?|euros?)").unwrap(),
            weight: 15,
        },
        TextPattern {
            name: "phone_numbers",
            regex: Regex::new(r"(?-u)\b[0-9]{3}[-.]?[0-9]{3}[-.]?[0-9]{4}\b").unwrap(),
            weight: 5,
        },
        TextPattern {
            name: "email_addresses",
            regex: Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap(),
            weight: 5,
        },
        TextPattern {
            name: "excessive_punctuation",
            regex: Regex::new(r"!{2,}|\?{2,}").unwrap(),
            weight: 5,
        },
        TextPattern {
            name: "grammar_mistakes",
            regex: Regex::new(r"(?i-u)\b(recieve|loose|there account|you're account|wont|cant)\b")
                .unwrap(),
            weight: 12,
        },
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlAssessment {
    pub url: String,
    pub score: u32,
    pub factors: Vec<String>,
    pub features: FeatureSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAnalysis {
    /// Clamped to `[0, 100]`.
    pub score: f64,
    /// De-duplicated, in first-seen order.
    pub suspicious_elements: Vec<String>,
    pub urls: Vec<String>,
    pub malicious_urls: Vec<String>,
    pub url_assessments: Vec<UrlAssessment>,
    pub signals: Vec<SignalScore>,
}

impl EmailAnalysis {
    pub fn mean_url_score(&self) -> Option<f64> {
        if self.url_assessments.is_empty() {
            return None;
        }
        let total: u32 = self.url_assessments.iter().map(|a| a.score).sum();
        Some(total as f64 / self.url_assessments.len() as f64)
    }
}

pub struct EmailContentAnalyzer<'a> {
    corpus: &'a Corpus,
    thresholds: &'a Thresholds,
    extractor: UrlFeatureExtractor,
}

impl<'a> EmailContentAnalyzer<'a> {
    pub fn new(corpus: &'a Corpus, thresholds: &'a Thresholds) -> Self {
        Self {
            corpus,
            thresholds,
            extractor: UrlFeatureExtractor::new(),
        }
    }

    pub fn analyze(&self, subject: &str, body: &str) -> EmailAnalysis {
        let full_text = format!("{} {}", subject, body);
        let lower_text = full_text.to_lowercase();

        let keywords = self.keyword_signal(&lower_text);
        let patterns = self.pattern_signal(&full_text);
        let (urls_signal, url_assessments) = self.url_signal(&full_text);
        let heuristics = self.heuristic_signal(subject, body);
        let phrases = self.phrase_signal(&lower_text);

        let signals = vec![keywords, patterns, urls_signal, heuristics, phrases];
        for signal in &signals {
            log::debug!(
                "Email signal '{}' contributed {:.1} ({} evidence items)",
                signal.name,
                signal.score,
                signal.evidence.len()
            );
        }

        let raw_score: f64 = signals.iter().map(|s| s.score).sum();
        let score = clamp_score(raw_score);

        // Only lexical evidence is surfaced as suspicious patterns
        let suspicious_elements: Vec<String> = {
            let mut seen = HashSet::new();
            signals[..2]
                .iter()
                .flat_map(|s| s.evidence.iter())
                .filter(|e| seen.insert(e.as_str()))
                .cloned()
                .collect()
        };

        let urls = url_assessments.iter().map(|a| a.url.clone()).collect();
        let malicious_urls = url_assessments
            .iter()
            .filter(|a| a.score > self.thresholds.malicious_url)
            .map(|a| a.url.clone())
            .collect();

        log::debug!("Email raw score {:.1}, clamped {:.1}", raw_score, score);

        EmailAnalysis {
            score,
            suspicious_elements,
            urls,
            malicious_urls,
            url_assessments,
            signals,
        }
    }

    fn keyword_signal(&self, lower_text: &str) -> SignalScore {
        let mut signal = SignalScore::new("keywords");
        for keyword in self.corpus.keywords() {
            if lower_text.contains(keyword.phrase.as_str()) {
                signal.score += keyword.weight as f64;
                signal.evidence.push(keyword.phrase.clone());
            }
        }
        signal
    }

    fn pattern_signal(&self, text: &str) -> SignalScore {
        let mut signal = SignalScore::new("patterns");
        for pattern in TEXT_PATTERNS.iter() {
            let matches: Vec<&str> = pattern.regex.find_iter(text).map(|m| m.as_str()).collect();
            if matches.is_empty() {
                continue;
            }
            signal.score += (matches.len() as u32 * pattern.weight) as f64;
            signal
                .evidence
                .push(format!("{}: {}", pattern.name, matches.join(", ")));
        }
        signal
    }

    fn url_signal(&self, text: &str) -> (SignalScore, Vec<UrlAssessment>) {
        let mut signal = SignalScore::new("urls");
        let scorer = UrlRiskScorer::new(self.corpus);

        let assessments: Vec<UrlAssessment> = URL_TOKEN
            .find_iter(text)
            .map(|m| {
                let url = m.as_str();
                let features = self.extractor.extract(url);
                let risk = scorer.score(&features, url);
                UrlAssessment {
                    url: url.to_string(),
                    score: risk.score,
                    factors: risk.factors,
                    features,
                }
            })
            .collect();

        for assessment in &assessments {
            signal.score += assessment.score as f64 * self.thresholds.url_weight;
            signal
                .evidence
                .push(format!("{} (score {})", assessment.url, assessment.score));
        }

        (signal, assessments)
    }

    fn heuristic_signal(&self, subject: &str, body: &str) -> SignalScore {
        let mut signal = SignalScore::new("heuristics");
        let subject_len = subject.chars().count();
        let body_len = body.chars().count();

        if subject_len > 100 {
            signal.score += 10.0;
            signal.evidence.push("Very long subject".to_string());
        }

        if subject_len < 10 && body_len < 50 {
            signal.score += 15.0;
            signal.evidence.push("Very short message".to_string());
        }

        let subject_lower = subject.to_lowercase();
        let body_lower = body.to_lowercase();
        let words: Vec<&str> = subject_lower
            .split_whitespace()
            .chain(body_lower.split_whitespace())
            .collect();
        if !words.is_empty() {
            let unique: HashSet<&str> = words.iter().copied().collect();
            let ratio = unique.len() as f64 / words.len() as f64;
            if ratio < 0.7 {
                signal.score += 10.0;
                signal
                    .evidence
                    .push(format!("High word repetition (unique ratio {:.2})", ratio));
            }
        }

        signal
    }

    fn phrase_signal(&self, lower_text: &str) -> SignalScore {
        let mut signal = SignalScore::new("phrases");
        for rule in self.corpus.phrase_rules() {
            if rule.matches(lower_text) {
                signal.score += rule.weight as f64;
                signal.evidence.push(rule.name.clone());
            }
        }
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusConfig, KeywordCategory, KeywordConfig};

    fn analyze(subject: &str, body: &str) -> EmailAnalysis {
        let corpus = Corpus::default();
        let thresholds = Thresholds::default();
        EmailContentAnalyzer::new(&corpus, &thresholds).analyze(subject, body)
    }

    fn signal<'s>(analysis: &'s EmailAnalysis, name: &str) -> &'s SignalScore {
        analysis.signals.iter().find(|s| s.name == name).unwrap()
    }

    #[test]
    fn test_phishing_email_vector() {
        let analysis = analyze(
            "URGENT: Your account will be suspended",
            "Click here to verify your account: http://suspicious-site.com/verify-account-now",
        );

        assert_eq!(analysis.score, 100.0);
        assert_eq!(
            analysis.urls,
            vec!["http://suspicious-site.com/verify-account-now".to_string()]
        );
        assert!(analysis.malicious_urls.is_empty());
        for keyword in ["urgent", "suspend", "suspended", "verify", "click here"] {
            assert!(
                analysis.suspicious_elements.contains(&keyword.to_string()),
                "missing {}",
                keyword
            );
        }
        assert!(analysis
            .suspicious_elements
            .contains(&"all_caps: URGENT".to_string()));
    }

    #[test]
    fn test_empty_input_is_near_zero() {
        let analysis = analyze("", "");
        // only the short-message heuristic applies
        assert_eq!(analysis.score, 15.0);
        assert!(analysis.suspicious_elements.is_empty());
        assert!(analysis.urls.is_empty());
    }

    #[test]
    fn test_benign_email() {
        let analysis = analyze(
            "Team lunch on Friday",
            "Hi all, we are having lunch at the usual place around noon. Bring your appetite and good stories.",
        );
        assert_eq!(analysis.score, 0.0);
    }

    #[test]
    fn test_pattern_counts_multiply_weight() {
        let analysis = analyze(
            "Invoice details for this month",
            "Please call 555-123-4567 or 555.987.6543 about it, thanks from everyone here today",
        );
        let patterns = signal(&analysis, "patterns");
        assert_eq!(patterns.score, 10.0);
        assert_eq!(
            patterns.evidence,
            vec!["phone_numbers: 555-123-4567, 555.987.6543".to_string()]
        );
    }

    #[test]
    fn test_money_and_grammar() {
        let analysis = analyze(
            "Your package is waiting",
            "You will recieve $500 once the fee of 20 dollars has been paid by you today ok",
        );
        let patterns = signal(&analysis, "patterns");
        // two money amounts (15 each) + one grammar mistake (12)
        assert_eq!(patterns.score, 42.0);
    }

    #[test]
    fn test_non_ascii_digits_are_not_patterns() {
        let analysis = analyze(
            "Meeting notes for today",
            "Room ٠١٢٣٤٥٦٧٨٩ booked, budget ١٢٣ dollars, ask the front desk for details please",
        );
        let patterns = signal(&analysis, "patterns");
        assert_eq!(patterns.score, 0.0);
        assert!(patterns.evidence.is_empty());
    }

    #[test]
    fn test_ascii_word_boundaries() {
        // "ÉLAN": a non-ASCII letter next to the caps run still leaves an ASCII boundary
        let analysis = analyze("Quick question about the plan", "ask ÉLAN and call 555-123-4567 soon");
        let patterns = signal(&analysis, "patterns");
        assert_eq!(
            patterns.evidence,
            vec![
                "all_caps: LAN".to_string(),
                "phone_numbers: 555-123-4567".to_string(),
            ]
        );
        assert_eq!(patterns.score, 13.0);
    }

    #[test]
    fn test_malicious_url_threshold() {
        let analysis = analyze(
            "Hello there friend",
            "See http://192.168.1.1/login and https://www.rust-lang.org/ for details about the plan",
        );
        assert_eq!(analysis.urls.len(), 2);
        assert_eq!(analysis.malicious_urls, vec!["http://192.168.1.1/login".to_string()]);

        let urls = signal(&analysis, "urls");
        let expected: f64 = analysis
            .url_assessments
            .iter()
            .map(|a| a.score as f64 * 0.8)
            .sum();
        assert!((urls.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_repetition_heuristic() {
        let analysis = analyze(
            "free free free free",
            "free free free free free free free free free free free free",
        );
        let heuristics = signal(&analysis, "heuristics");
        assert!(heuristics
            .evidence
            .iter()
            .any(|e| e.starts_with("High word repetition")));
    }

    #[test]
    fn test_phrase_rules() {
        let analysis = analyze(
            "Congratulations!",
            "You are the winner of our lottery. The government has approved your claim.",
        );
        let phrases = signal(&analysis, "phrases");
        assert_eq!(phrases.score, 75.0);
        assert_eq!(phrases.evidence.len(), 3);
    }

    #[test]
    fn test_adding_keyword_never_lowers_score() {
        let base_body = "We noticed a change on your profile settings last week, nothing else needed";
        let base = analyze("Profile notice", base_body).score;
        let with_keyword = analyze("Profile notice", &format!("{} urgent", base_body)).score;
        assert!(with_keyword >= base);
    }

    #[test]
    fn test_suspicious_elements_are_deduplicated() {
        let config = CorpusConfig {
            keywords: vec![
                KeywordConfig {
                    phrase: "refund".to_string(),
                    category: KeywordCategory::Financial,
                    weight: None,
                },
                KeywordConfig {
                    phrase: "REFUND".to_string(),
                    category: KeywordCategory::Financial,
                    weight: None,
                },
            ],
            ..CorpusConfig::default()
        };
        let corpus = Corpus::compile(&config).unwrap();
        let thresholds = Thresholds::default();
        let analyzer = EmailContentAnalyzer::new(&corpus, &thresholds);

        let first = analyzer.analyze("Your refund", "A refund is ready for you to look at soon enough");
        let second = analyzer.analyze("Your refund", "A refund is ready for you to look at soon enough");

        assert_eq!(first.suspicious_elements, vec!["refund".to_string()]);
        assert_eq!(first, second);
        // both entries still score
        assert_eq!(signal(&first, "keywords").score, 20.0);
    }
}
