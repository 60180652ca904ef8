use super::{FeatureSet, UrlFeatures};
use crate::domain_utils::DomainUtils;
use url::Url;

/// Lexical/structural URL feature extraction. Never touches the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlFeatureExtractor;

impl UrlFeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, url: &str) -> FeatureSet {
        let url_length = url.chars().count();

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("Unparsable URL '{}': {}", url, e);
                return FeatureSet::invalid(url_length);
            }
        };

        let host = parsed.host_str().unwrap_or("");
        // `search` semantics: the leading '?' counts, an empty query counts as nothing
        let params_length = match parsed.query() {
            Some(query) if !query.is_empty() => query.chars().count() + 1,
            _ => 0,
        };

        let count = |needle: char| url.chars().filter(|&c| c == needle).count();
        let hyphens_count = count('-');
        let subdomain_count = DomainUtils::subdomain_count(host);

        FeatureSet::Parsed(UrlFeatures {
            url_length,
            domain_length: host.chars().count(),
            path_length: parsed.path().chars().count(),
            params_length,

            dots_count: count('.'),
            hyphens_count,
            underscores_count: count('_'),
            slashes_count: count('/'),
            question_marks_count: count('?'),
            equals_count: count('='),
            ampersand_count: count('&'),
            at_count: count('@'),

            subdomain_count,
            is_ip: DomainUtils::is_dotted_quad(host),
            has_port: parsed.port().is_some(),
            uses_https: parsed.scheme() == "https",
            has_suspicious_words: DomainUtils::has_brand_or_security_term(host),
            has_numbers_in_domain: DomainUtils::has_digit(host),
            excessive_hyphens: hyphens_count > 3,
            multiple_subdomains: subdomain_count > 2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(url: &str) -> UrlFeatures {
        UrlFeatureExtractor::new()
            .extract(url)
            .parsed()
            .cloned()
            .expect("url should parse")
    }

    #[test]
    fn test_invalid_url_keeps_only_length() {
        let features = UrlFeatureExtractor::new().extract("not a url");
        assert!(features.is_invalid());
        assert_eq!(features.url_length(), 9);

        let json = serde_json::to_value(&features).unwrap();
        assert_eq!(json["invalid_url"], true);
        assert_eq!(json["url_length"], 9);
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_string_is_invalid() {
        assert!(UrlFeatureExtractor::new().extract("").is_invalid());
    }

    #[test]
    fn test_basic_lengths() {
        let f = parsed("https://www.google.com");
        assert_eq!(f.url_length, 22);
        assert_eq!(f.domain_length, 14);
        assert_eq!(f.path_length, 1);
        assert_eq!(f.params_length, 0);
        assert_eq!(f.subdomain_count, 1);
        assert!(f.uses_https);
        assert!(!f.is_ip);
        assert!(f.has_suspicious_words);
    }

    #[test]
    fn test_character_counts_scan_whole_url() {
        let f = parsed("http://a-b.example.com/x_y/z?a=1&b=2");
        assert_eq!(f.dots_count, 2);
        assert_eq!(f.hyphens_count, 1);
        assert_eq!(f.underscores_count, 1);
        assert_eq!(f.slashes_count, 4);
        assert_eq!(f.question_marks_count, 1);
        assert_eq!(f.equals_count, 2);
        assert_eq!(f.ampersand_count, 1);
        assert_eq!(f.params_length, 8);
    }

    #[test]
    fn test_ip_and_port() {
        let f = parsed("http://192.168.1.1:8080/login");
        assert!(f.is_ip);
        assert!(f.has_port);
        assert!(f.has_numbers_in_domain);
        assert!(!f.uses_https);
        assert_eq!(f.subdomain_count, 2);
    }

    #[test]
    fn test_default_port_is_not_custom() {
        assert!(!parsed("https://example.com:443/").has_port);
    }

    #[test]
    fn test_at_sign_and_hyphens() {
        let f = parsed("http://user@a-b-c-d-e.example.com");
        assert_eq!(f.at_count, 1);
        assert_eq!(f.hyphens_count, 4);
        assert!(f.excessive_hyphens);
    }

    #[test]
    fn test_deterministic() {
        let extractor = UrlFeatureExtractor::new();
        let url = "https://login.secure.bank.example.co.uk/path?q=1";
        assert_eq!(extractor.extract(url), extractor.extract(url));
    }
}
