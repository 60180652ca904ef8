use clap::{Arg, Command};
use log::LevelFilter;
use phishguard::corpus::KeywordCategory;
use phishguard::{Config, EmailInput, EmailPrediction, PhishingDetector, UrlPrediction};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let matches = Command::new("phishguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rule-based phishing classifier for emails and URLs")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phishguard.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("URL")
                .help("Classify a single URL")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("subject")
                .long("subject")
                .value_name("TEXT")
                .help("Email subject to classify")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("body")
                .long("body")
                .value_name("TEXT")
                .help("Email body to classify")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-email")
                .long("test-email")
                .value_name("FILE")
                .help("Classify an email file (headers, blank line, body)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("Classify a JSON array of {subject, body} objects")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with per-signal scoring detail")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/phishguard.yaml");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    let detector = match PhishingDetector::new(&config) {
        Ok(detector) => detector,
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("🔍 Testing configuration...");
        println!("Keywords: {}", detector.corpus().keywords().len());
        for category in [
            KeywordCategory::Urgency,
            KeywordCategory::Verification,
            KeywordCategory::Threat,
            KeywordCategory::Financial,
            KeywordCategory::CallToAction,
        ] {
            println!(
                "  {:?}: {}",
                category,
                detector.corpus().keyword_count(category)
            );
        }
        println!(
            "Suspicious domain indicators: {}",
            detector.corpus().suspicious_domains().len()
        );
        println!("Shorteners: {}", detector.corpus().shorteners().len());
        println!("Phrase rules: {}", detector.corpus().phrase_rules().len());
        let thresholds = detector.thresholds();
        println!(
            "Thresholds: url > {}, email > {}, malicious link > {}",
            thresholds.url_phishing, thresholds.email_phishing, thresholds.malicious_url
        );
        println!("All regex patterns compiled successfully.");
        return;
    }

    let as_json = matches.get_flag("json");

    if let Some(url) = matches.get_one::<String>("url") {
        let prediction = detector.predict_url(url);
        if as_json {
            print_json(&prediction);
        } else {
            print_url_prediction(url, &prediction);
        }
        return;
    }

    if let Some(email_file) = matches.get_one::<String>("test-email") {
        let content = match std::fs::read_to_string(email_file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("❌ Error reading email file: {}", e);
                process::exit(1);
            }
        };
        let email = parse_email_file(&content);
        println!("🧪 Testing email file: {}", email_file);
        let prediction = detector.predict_email(&email.subject, &email.body);
        if as_json {
            print_json(&prediction);
        } else {
            print_email_prediction(&email.subject, &prediction);
        }
        return;
    }

    if let Some(batch_file) = matches.get_one::<String>("batch") {
        let emails = match load_batch(batch_file) {
            Ok(emails) => emails,
            Err(e) => {
                eprintln!("❌ Error reading batch file: {e}");
                process::exit(1);
            }
        };
        log::info!("Classifying {} emails from {}", emails.len(), batch_file);

        let subjects: Vec<String> = emails.iter().map(|e| e.subject.clone()).collect();
        let results = match Arc::new(detector).predict_batch_concurrent(emails).await {
            Ok(results) => results,
            Err(e) => {
                eprintln!("❌ Batch evaluation failed: {e}");
                process::exit(1);
            }
        };

        if as_json {
            print_json(&results);
        } else {
            for (subject, prediction) in subjects.iter().zip(&results) {
                print_email_prediction(subject, prediction);
            }
        }
        return;
    }

    if matches.contains_id("subject") || matches.contains_id("body") {
        let subject = matches
            .get_one::<String>("subject")
            .cloned()
            .unwrap_or_default();
        let body = matches
            .get_one::<String>("body")
            .cloned()
            .unwrap_or_default();
        let prediction = detector.predict_email(&subject, &body);
        if as_json {
            print_json(&prediction);
        } else {
            print_email_prediction(&subject, &prediction);
        }
        return;
    }

    eprintln!("Nothing to do: pass --url, --subject/--body, --test-email or --batch");
    process::exit(2);
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn load_batch(path: &str) -> anyhow::Result<Vec<EmailInput>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Headers up to the first blank line, body after it. Only `Subject` is used.
fn parse_email_file(content: &str) -> EmailInput {
    let mut subject = String::new();
    let mut body = String::new();
    let mut in_headers = true;
    let mut in_subject = false;

    for line in content.lines() {
        if in_headers {
            if line.trim().is_empty() {
                in_headers = false;
                continue;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if in_subject {
                    subject.push(' ');
                    subject.push_str(line.trim());
                }
                continue;
            }

            in_subject = false;
            if let Some((key, value)) = line.split_once(':') {
                if key.trim().eq_ignore_ascii_case("subject") {
                    subject = value.trim().to_string();
                    in_subject = true;
                }
            }
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }

    EmailInput { subject, body }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing result: {e}");
            process::exit(1);
        }
    }
}

fn print_url_prediction(url: &str, prediction: &UrlPrediction) {
    let icon = if prediction.is_phishing() { "🚨" } else { "✅" };
    println!("{} {}: {:?}", icon, url, prediction.prediction);
    println!("   Confidence: {}%", prediction.confidence);
    println!("   Threat score: {}", prediction.threat_score);
    println!(
        "   HTTPS: {}  Length risk: {:?}  Domain reputation: {:?}",
        prediction.security_indicators.uses_https,
        prediction.security_indicators.url_length_risk,
        prediction.security_indicators.domain_reputation
    );
    for factor in &prediction.risk_factors {
        println!("   • {factor}");
    }
}

fn print_email_prediction(subject: &str, prediction: &EmailPrediction) {
    let icon = if prediction.is_phishing() { "🚨" } else { "✅" };
    let verdict = if prediction.is_phishing() {
        "Phishing Email"
    } else {
        "Safe Email"
    };
    println!("{} {}: {}", icon, truncate_string(subject, 60), verdict);
    println!("   Confidence: {}%", prediction.confidence);
    println!("   Risk score: {}", prediction.risk_score);
    println!("   Reason: {}", prediction.reason);
    println!(
        "   Links: {} total, {} malicious",
        prediction.total_links,
        prediction.malicious_links.len()
    );
    for pattern in &prediction.suspicious_patterns {
        println!("   • {pattern}");
    }
    for url in &prediction.url_predictions {
        println!(
            "   🔗 {} - {:?} ({}%)",
            url.url, url.prediction, url.confidence
        );
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
