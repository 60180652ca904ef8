use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOTTED_QUAD: Regex =
        Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$").unwrap();
    static ref BRAND_OR_SECURITY_TERM: Regex = Regex::new(
        r"(?i)secure|verify|update|login|account|bank|paypal|amazon|microsoft|apple|google"
    )
    .unwrap();
}

/// Minimal lexical host utilities
pub struct DomainUtils;

impl DomainUtils {
    /// Labels beyond the registrable `name.tld` pair
    pub fn subdomain_count(host: &str) -> usize {
        host.split('.').count().saturating_sub(2)
    }

    pub fn is_dotted_quad(host: &str) -> bool {
        DOTTED_QUAD.is_match(host)
    }

    pub fn has_brand_or_security_term(host: &str) -> bool {
        BRAND_OR_SECURITY_TERM.is_match(host)
    }

    pub fn has_digit(host: &str) -> bool {
        host.chars().any(|c| c.is_ascii_digit())
    }
}
