#![allow(clippy::uninlined_format_args)]

use phishguard::{Config, PhishingDetector};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Testing a typical account-suspension phishing email...");

    // Tighten the email threshold and add a local brand to the blacklist
    let config_yaml = r#"
thresholds:
  email_phishing: 45.0
corpus:
  suspicious_domains:
    - type: literal
      value: "examplebank-support.com"
    - type: pattern
      regex: "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}"
"#;

    let config: Config = serde_yaml::from_str(config_yaml)?;
    let detector = PhishingDetector::new(&config)?;

    let subject = "URGENT: Your account will be suspended";
    let body = "Dear customer,\n\
                We detected suspicious activity. Click here to verify your account:\n\
                http://examplebank-support.com/verify-account-now\n\
                Failure to confirm within 24 hours will terminate your access!!";

    let prediction = detector.predict_email(subject, body);

    println!("Prediction: {:?}", prediction.prediction);
    println!("Confidence: {}%", prediction.confidence);
    println!("Risk score: {}", prediction.risk_score);
    println!("Reason: {}", prediction.reason);
    println!("Suspicious patterns:");
    for pattern in &prediction.suspicious_patterns {
        println!("  - {}", pattern);
    }
    for url in &prediction.url_predictions {
        println!(
            "URL {} -> {:?} ({}%): {:?}",
            url.url, url.prediction, url.confidence, url.risk_factors
        );
    }

    if prediction.is_phishing() {
        println!("✅ SUCCESS: email classified as phishing");
    } else {
        println!("❌ FAILURE: email was not classified as phishing");
    }

    Ok(())
}
