use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Conceptual grouping of phishing keywords. Only affects the default weight
/// given to a keyword whose configuration omits one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Urgency,
    Verification,
    Threat,
    Financial,
    CallToAction,
}

impl KeywordCategory {
    pub fn default_weight(self) -> u32 {
        match self {
            KeywordCategory::Urgency => 20,
            KeywordCategory::Threat => 25,
            KeywordCategory::Verification => 15,
            KeywordCategory::CallToAction => 18,
            KeywordCategory::Financial => 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    pub phrase: String,
    pub category: KeywordCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainIndicatorConfig {
    Literal { value: String },
    Pattern { regex: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseRuleConfig {
    pub name: String,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub require_all: bool,
    pub weight: u32,
}

/// Serializable form of the corpus, as found in the YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub keywords: Vec<KeywordConfig>,
    /// Scanned in order; the first hit of either kind wins.
    pub suspicious_domains: Vec<DomainIndicatorConfig>,
    pub shorteners: Vec<String>,
    pub phrase_rules: Vec<PhraseRuleConfig>,
}

fn kw(phrase: &str, category: KeywordCategory, weight: u32) -> KeywordConfig {
    KeywordConfig {
        phrase: phrase.to_string(),
        category,
        weight: Some(weight),
    }
}

fn literal(value: &str) -> DomainIndicatorConfig {
    DomainIndicatorConfig::Literal {
        value: value.to_string(),
    }
}

fn phrase_rule(name: &str, patterns: &[&str], require_all: bool, weight: u32) -> PhraseRuleConfig {
    PhraseRuleConfig {
        name: name.to_string(),
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
        require_all,
        weight,
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        use KeywordCategory::*;

        let keywords = vec![
            // Urgency
            kw("urgent", Urgency, 20),
            kw("immediate", Urgency, 20),
            kw("asap", Urgency, 10),
            kw("expires today", Urgency, 10),
            kw("act now", Urgency, 10),
            kw("limited time", Urgency, 10),
            kw("deadline", Urgency, 10),
            kw("expires soon", Urgency, 10),
            kw("time sensitive", Urgency, 10),
            kw("hurry", Urgency, 10),
            kw("last chance", Urgency, 10),
            // Verification
            kw("verify", Verification, 15),
            kw("confirm", Verification, 15),
            kw("validate", Verification, 10),
            kw("authenticate", Verification, 10),
            kw("reactivate", Verification, 10),
            kw("update", Verification, 10),
            kw("verify account", Verification, 15),
            kw("confirm identity", Verification, 15),
            kw("update payment", Verification, 10),
            kw("verify now", Verification, 15),
            kw("confirm now", Verification, 15),
            kw("validate account", Verification, 10),
            kw("reconfirm", Verification, 15),
            kw("reverify", Verification, 15),
            // Threats
            kw("suspend", Threat, 25),
            kw("suspended", Threat, 25),
            kw("terminate", Threat, 25),
            kw("block", Threat, 10),
            kw("freeze", Threat, 10),
            kw("locked", Threat, 10),
            kw("disabled", Threat, 10),
            kw("restricted", Threat, 10),
            kw("limited", Threat, 10),
            kw("unauthorized", Threat, 10),
            kw("violation", Threat, 10),
            kw("breach", Threat, 10),
            kw("security alert", Threat, 10),
            kw("fraud alert", Threat, 10),
            kw("suspicious activity", Threat, 10),
            // Financial
            kw("refund", Financial, 10),
            kw("payment", Financial, 10),
            kw("billing", Financial, 10),
            kw("invoice", Financial, 10),
            kw("transaction", Financial, 10),
            kw("charge", Financial, 10),
            kw("money", Financial, 10),
            kw("cash", Financial, 10),
            kw("reward", Financial, 10),
            kw("prize", Financial, 10),
            kw("winner", Financial, 10),
            kw("lottery", Financial, 10),
            kw("jackpot", Financial, 10),
            kw("inheritance", Financial, 10),
            kw("million", Financial, 10),
            kw("deposit", Financial, 10),
            kw("transfer", Financial, 10),
            kw("claim", Financial, 10),
            // Call to action
            kw("click here", CallToAction, 18),
            kw("click now", CallToAction, 18),
            kw("download now", CallToAction, 18),
            kw("install now", CallToAction, 10),
            kw("open attachment", CallToAction, 10),
            kw("follow link", CallToAction, 10),
            kw("visit link", CallToAction, 10),
            kw("go to", CallToAction, 10),
            kw("proceed to", CallToAction, 10),
            kw("continue to", CallToAction, 10),
        ];

        let mut suspicious_domains: Vec<DomainIndicatorConfig> = [
            // URL shorteners
            "bit.ly",
            "tinyurl.com",
            "goo.gl",
            "t.co",
            "ow.ly",
            "is.gd",
            "buff.ly",
            "short.link",
            "tiny.cc",
            "rb.gy",
            "cutt.ly",
            "linktr.ee",
            // Known phishing domains
            "secure-bank.net",
            "paypal-secure.com",
            "amazon-security.org",
            "microsoft-update.net",
            "google-verify.com",
            "apple-id.net",
            "facebook-security.org",
            "instagram-help.com",
            "twitter-verify.net",
            // Suspicious TLDs
            ".tk",
            ".ml",
            ".ga",
            ".cf",
            ".click",
            ".download",
            ".loan",
            ".racing",
            ".review",
            ".science",
            ".work",
            ".date",
            ".stream",
            ".faith",
        ]
        .iter()
        .map(|value| literal(value))
        .collect();

        suspicious_domains.push(DomainIndicatorConfig::Pattern {
            regex: r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}".to_string(),
        });
        suspicious_domains.push(DomainIndicatorConfig::Pattern {
            regex: r"[a-z0-9]+-[a-z0-9]+-[a-z0-9]+\.".to_string(),
        });

        let shorteners = ["bit.ly", "tinyurl", "goo.gl", "t.co", "ow.ly", "is.gd"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let phrase_rules = vec![
            phrase_rule("Prize notification", &["congratulations", "winner"], true, 25),
            phrase_rule("Lottery or inheritance", &["inheritance", "lottery"], false, 30),
            phrase_rule(
                "Government agency mention",
                &[r"(?-u)\bfbi\b", r"(?-u)\birs\b", "government"],
                false,
                20,
            ),
        ];

        Self {
            keywords,
            suspicious_domains,
            shorteners,
            phrase_rules,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Keyword {
    /// Lowercased at compile time.
    pub phrase: String,
    pub category: KeywordCategory,
    pub weight: u32,
}

#[derive(Debug, Clone)]
pub enum DomainIndicator {
    Literal(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
pub struct PhraseRule {
    pub name: String,
    pub patterns: Vec<Regex>,
    pub require_all: bool,
    pub weight: u32,
}

impl PhraseRule {
    /// `text` is expected to be lowercased already.
    pub fn matches(&self, text: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        if self.require_all {
            self.patterns.iter().all(|p| p.is_match(text))
        } else {
            self.patterns.iter().any(|p| p.is_match(text))
        }
    }
}

/// Compiled, read-only matching data shared by every analyzer.
#[derive(Debug, Clone)]
pub struct Corpus {
    keywords: Vec<Keyword>,
    suspicious_domains: Vec<DomainIndicator>,
    shorteners: Vec<String>,
    phrase_rules: Vec<PhraseRule>,
}

impl Corpus {
    pub fn compile(config: &CorpusConfig) -> anyhow::Result<Self> {
        let keywords = config
            .keywords
            .iter()
            .filter(|k| !k.phrase.trim().is_empty())
            .map(|k| Keyword {
                phrase: k.phrase.to_lowercase(),
                category: k.category,
                weight: k.weight.unwrap_or_else(|| k.category.default_weight()),
            })
            .collect();

        let mut suspicious_domains = Vec::with_capacity(config.suspicious_domains.len());
        for indicator in &config.suspicious_domains {
            let compiled = match indicator {
                DomainIndicatorConfig::Literal { value } => {
                    DomainIndicator::Literal(value.to_lowercase())
                }
                DomainIndicatorConfig::Pattern { regex } => DomainIndicator::Pattern(
                    Regex::new(regex)
                        .with_context(|| format!("invalid suspicious domain pattern: {regex}"))?,
                ),
            };
            suspicious_domains.push(compiled);
        }

        let shorteners = config
            .shorteners
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect();

        let mut phrase_rules = Vec::with_capacity(config.phrase_rules.len());
        for rule in &config.phrase_rules {
            let patterns = rule
                .patterns
                .iter()
                .map(|p| {
                    Regex::new(p).with_context(|| {
                        format!("invalid pattern '{}' in phrase rule '{}'", p, rule.name)
                    })
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            phrase_rules.push(PhraseRule {
                name: rule.name.clone(),
                patterns,
                require_all: rule.require_all,
                weight: rule.weight,
            });
        }

        Ok(Self {
            keywords,
            suspicious_domains,
            shorteners,
            phrase_rules,
        })
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn keyword_count(&self, category: KeywordCategory) -> usize {
        self.keywords
            .iter()
            .filter(|k| k.category == category)
            .count()
    }

    pub fn suspicious_domains(&self) -> &[DomainIndicator] {
        &self.suspicious_domains
    }

    pub fn shorteners(&self) -> &[String] {
        &self.shorteners
    }

    pub fn phrase_rules(&self) -> &[PhraseRule] {
        &self.phrase_rules
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::compile(&CorpusConfig::default()).expect("built-in corpus patterns are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_corpus_compiles() {
        let corpus = Corpus::default();
        assert!(corpus.keywords().len() >= 50);
        assert_eq!(corpus.shorteners().len(), 6);
        assert_eq!(corpus.phrase_rules().len(), 3);
    }

    #[test]
    fn test_literals_precede_patterns() {
        let corpus = Corpus::default();
        let first_pattern = corpus
            .suspicious_domains()
            .iter()
            .position(|d| matches!(d, DomainIndicator::Pattern(_)))
            .unwrap();
        assert!(corpus.suspicious_domains()[first_pattern..]
            .iter()
            .all(|d| matches!(d, DomainIndicator::Pattern(_))));
    }

    #[test]
    fn test_keyword_weight_table() {
        let corpus = Corpus::default();
        let weight_of = |phrase: &str| {
            corpus
                .keywords()
                .iter()
                .find(|k| k.phrase == phrase)
                .map(|k| k.weight)
        };

        assert_eq!(weight_of("urgent"), Some(20));
        assert_eq!(weight_of("asap"), Some(10));
        assert_eq!(weight_of("suspended"), Some(25));
        assert_eq!(weight_of("reverify"), Some(15));
        assert_eq!(weight_of("validate"), Some(10));
        assert_eq!(weight_of("click here"), Some(18));
        assert_eq!(weight_of("install now"), Some(10));
        assert_eq!(weight_of("lottery"), Some(10));
    }

    #[test]
    fn test_keyword_count_by_category() {
        let config = CorpusConfig {
            keywords: vec![
                kw("act now", KeywordCategory::Urgency, 20),
                kw("right away", KeywordCategory::Urgency, 10),
                kw("wire transfer", KeywordCategory::Financial, 10),
            ],
            ..CorpusConfig::default()
        };
        let corpus = Corpus::compile(&config).unwrap();
        assert_eq!(corpus.keyword_count(KeywordCategory::Urgency), 2);
        assert_eq!(corpus.keyword_count(KeywordCategory::Financial), 1);
        assert_eq!(corpus.keyword_count(KeywordCategory::Threat), 0);

        let corpus = Corpus::default();
        let total: usize = [
            KeywordCategory::Urgency,
            KeywordCategory::Verification,
            KeywordCategory::Threat,
            KeywordCategory::Financial,
            KeywordCategory::CallToAction,
        ]
        .into_iter()
        .map(|c| corpus.keyword_count(c))
        .sum();
        assert_eq!(total, corpus.keywords().len());
    }

    #[test]
    fn test_missing_weight_uses_category_default() {
        let config = CorpusConfig {
            keywords: vec![KeywordConfig {
                phrase: "Act Fast".to_string(),
                category: KeywordCategory::Threat,
                weight: None,
            }],
            ..CorpusConfig::default()
        };
        let corpus = Corpus::compile(&config).unwrap();
        assert_eq!(corpus.keywords()[0].phrase, "act fast");
        assert_eq!(corpus.keywords()[0].weight, 25);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = CorpusConfig {
            suspicious_domains: vec![DomainIndicatorConfig::Pattern {
                regex: "([a-z".to_string(),
            }],
            ..CorpusConfig::default()
        };
        let err = Corpus::compile(&config).unwrap_err();
        assert!(err.to_string().contains("invalid suspicious domain pattern"));
    }

    #[test]
    fn test_phrase_rule_any_and_all() {
        let corpus = Corpus::default();
        let rules = corpus.phrase_rules();

        assert!(rules[0].matches("congratulations, you are the winner"));
        assert!(!rules[0].matches("you are the winner"));
        assert!(rules[1].matches("claim your lottery prize"));
        assert!(rules[2].matches("a message from the irs"));
        assert!(!rules[2].matches("first things first"));
    }
}
