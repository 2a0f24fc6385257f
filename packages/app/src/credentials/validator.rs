//! API key validation: provider detection, format rules and security heuristics.
//!
//! Everything here is offline; nothing is sent to the providers.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use super::crypto::fingerprint;

macro_rules! key_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

key_pattern!(RE_OPENAI, r"^sk-[A-Za-z0-9]{48}$");
key_pattern!(RE_ANTHROPIC, r"^sk-ant-[A-Za-z0-9\-_]{101}$");
key_pattern!(RE_GOOGLE, r"^AIza[A-Za-z0-9\-_]{35}$");
key_pattern!(RE_HUGGINGFACE, r"^hf_[A-Za-z0-9]{34}$");
key_pattern!(RE_COHERE, r"^[A-Za-z0-9]{40}$");

key_pattern!(RE_TEST_KEY, r"(?i)(test|demo|example|sample)");
key_pattern!(RE_PLACEHOLDER, r"(?i)(your-key-here|replace-me|xxx+)");
key_pattern!(RE_VCS_HOST, r"(?i)(github|gitlab|bitbucket)");
key_pattern!(RE_SUSPICIOUS_CHARS, r#"[<>"'`]"#);
key_pattern!(RE_SEQUENTIAL, r"(?i)(abc|123|xyz)");
key_pattern!(RE_COMMON_WORDS, r"(?i)(password|secret|key|admin|user|test)");
key_pattern!(RE_LONG_DIGITS, r"\d{4,}");

/// Below this Shannon entropy (bits per char) a key is flagged as predictable
const LOW_ENTROPY: f64 = 3.0;
const MODERATE_ENTROPY: f64 = 4.0;

/// Run of identical characters counted as a weak pattern
const SAME_CHAR_RUN: usize = 4;

const LEAK_MARKERS: [(&str, &str); 5] = [
    ("github.com", "May be exposed in GitHub repositories"),
    ("stackoverflow.com", "May be exposed in Stack Overflow posts"),
    ("pastebin.com", "May be exposed in Pastebin"),
    ("config.", "May be in configuration files"),
    (".env", "May be in environment files"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    HuggingFace,
    Cohere,
}

struct ProviderSpec {
    provider: Provider,
    prefix: &'static str,
    length: usize,
    regex: &'static LazyLock<Option<Regex>>,
    description: &'static str,
}

/// Prefixed providers first so the bare Cohere pattern is the last resort
static PROVIDERS: [ProviderSpec; 5] = [
    ProviderSpec {
        provider: Provider::Anthropic,
        prefix: "sk-ant-",
        length: 108,
        regex: &RE_ANTHROPIC,
        description: "Anthropic API key",
    },
    ProviderSpec {
        provider: Provider::OpenAi,
        prefix: "sk-",
        length: 51,
        regex: &RE_OPENAI,
        description: "OpenAI API key",
    },
    ProviderSpec {
        provider: Provider::Google,
        prefix: "AIza",
        length: 39,
        regex: &RE_GOOGLE,
        description: "Google AI API key",
    },
    ProviderSpec {
        provider: Provider::HuggingFace,
        prefix: "hf_",
        length: 37,
        regex: &RE_HUGGINGFACE,
        description: "Hugging Face API token",
    },
    ProviderSpec {
        provider: Provider::Cohere,
        prefix: "",
        length: 40,
        regex: &RE_COHERE,
        description: "Cohere API key",
    },
];

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::HuggingFace => "huggingface",
            Self::Cohere => "cohere",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "google" | "gemini" => Some(Self::Google),
            "huggingface" | "hf" => Some(Self::HuggingFace),
            "cohere" => Some(Self::Cohere),
            _ => None,
        }
    }

    /// Guess the provider from a credential name such as `openai_api_key`
    pub fn from_credential_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        PROVIDERS
            .iter()
            .map(|spec| spec.provider)
            .find(|p| name.contains(p.as_str()))
            .or_else(|| {
                matches!(name.as_str(), "api_key" | "openai_key").then_some(Self::OpenAi)
            })
    }

    fn spec(&self) -> &'static ProviderSpec {
        PROVIDERS
            .iter()
            .find(|spec| spec.provider == *self)
            .unwrap_or(&PROVIDERS[0])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Format only
    Basic,
    /// Format and security heuristics
    #[default]
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Warning,
    Invalid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// Fingerprint of the key, never the key itself
    pub key_id: String,
    pub provider: Option<Provider>,
    pub timestamp: DateTime<Utc>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub security_issues: Vec<String>,
    pub info: BTreeMap<String, serde_json::Value>,
}

impl ValidationResult {
    fn new(api_key: &str, provider: Option<Provider>) -> Self {
        Self {
            key_id: fingerprint(api_key),
            provider,
            timestamp: Utc::now(),
            errors: Vec::new(),
            warnings: Vec::new(),
            security_issues: Vec::new(),
            info: BTreeMap::new(),
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn security_issue(&mut self, issue: &str) {
        self.security_issues.push(issue.to_string());
        self.warnings.push(format!("Security concern: {}", issue));
    }

    pub fn status(&self) -> ValidationStatus {
        if !self.errors.is_empty() {
            ValidationStatus::Invalid
        } else if !self.warnings.is_empty() {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Valid
        }
    }

    /// Valid or merely warned about
    pub fn is_valid(&self) -> bool {
        self.status() != ValidationStatus::Invalid
    }
}

/// Provider whose pattern the key matches exactly
pub fn detect_provider(api_key: &str) -> Option<Provider> {
    PROVIDERS
        .iter()
        .find(|spec| spec.regex.as_ref().is_some_and(|re| re.is_match(api_key)))
        .map(|spec| spec.provider)
}

/// Validate a key, detecting the provider when `provider` is `None`
pub fn validate_key(
    api_key: &str,
    provider: Option<Provider>,
    level: ValidationLevel,
) -> ValidationResult {
    let Some(provider) = provider.or_else(|| detect_provider(api_key)) else {
        let mut result = ValidationResult::new(api_key, None);
        if api_key.is_empty() {
            result.error("API key is empty");
        } else {
            result.error("Could not detect API provider");
        }
        check_characters(api_key, &mut result);
        if level == ValidationLevel::Standard {
            check_security(api_key, &mut result);
        }
        return result;
    };

    let mut result = validate_format(api_key, provider);
    if level == ValidationLevel::Standard && !api_key.is_empty() {
        check_security(api_key, &mut result);
    }
    result
}

/// Checks for a credential that belongs to no known provider
pub fn validate_generic(value: &str) -> ValidationResult {
    let mut result = ValidationResult::new(value, None);
    if value.is_empty() {
        result.error("Credential is empty");
        return result;
    }
    if value != value.trim() {
        result.warning("Credential has leading/trailing whitespace");
    }
    result.info.insert("length".into(), value.chars().count().into());
    result
}

/// Length, prefix and pattern checks for one provider
pub fn validate_format(api_key: &str, provider: Provider) -> ValidationResult {
    let mut result = ValidationResult::new(api_key, Some(provider));
    if api_key.is_empty() {
        result.error("API key is empty");
        return result;
    }

    let spec = provider.spec();
    let length = api_key.chars().count();
    result.info.insert("expected_format".into(), spec.description.into());
    result.info.insert("key_length".into(), length.into());

    if length < spec.length {
        result.error(format!("Key too short (expected {} chars)", spec.length));
    } else if length > spec.length {
        result.error(format!("Key too long (expected {} chars)", spec.length));
    }
    if !spec.prefix.is_empty() && !api_key.starts_with(spec.prefix) {
        result.error(format!("Key should start with '{}'", spec.prefix));
    }
    if !spec.regex.as_ref().is_some_and(|re| re.is_match(api_key)) {
        result.error(format!("Key format doesn't match {} pattern", provider.as_str()));
    }

    check_characters(api_key, &mut result);

    if result.errors.is_empty() {
        result.info.insert("format_valid".into(), true.into());
        let prefix: String = api_key.chars().take(10).collect();
        result.info.insert("prefix".into(), format!("{}...", prefix).into());
    }
    result
}

fn check_characters(api_key: &str, result: &mut ValidationResult) {
    if api_key != api_key.trim() {
        result.warning("Key has leading/trailing whitespace");
    }
    if api_key.contains(' ') {
        result.warning("Key contains spaces");
    }
    if api_key.contains(['\t', '\n', '\r']) {
        result.error("Key contains invalid whitespace characters");
    }
    if matches(&RE_SUSPICIOUS_CHARS, api_key) {
        result.security_issue("Key contains potentially dangerous characters");
    }
}

/// Heuristics that flag keys which are likely fake, leaked or guessable
fn check_security(api_key: &str, result: &mut ValidationResult) {
    if matches(&RE_TEST_KEY, api_key) {
        result.security_issue("Appears to be a test or demo key");
    }
    if matches(&RE_PLACEHOLDER, api_key) {
        result.error("Key appears to be a placeholder value");
    }
    if matches(&RE_VCS_HOST, api_key) {
        result.security_issue("Key may have been exposed in version control");
    }

    let lowered = api_key.to_lowercase();
    for (marker, message) in LEAK_MARKERS {
        if lowered.contains(marker) {
            result.security_issue(message);
        }
    }

    let entropy = shannon_entropy(api_key);
    result
        .info
        .insert("entropy".into(), ((entropy * 100.0).round() / 100.0).into());
    if entropy < LOW_ENTROPY {
        result.security_issue("Key has low entropy (may be predictable)");
    } else if entropy < MODERATE_ENTROPY {
        result.warning("Key has moderate entropy");
    }

    if has_repeated_patterns(api_key) {
        result.security_issue("Key contains repeated patterns");
    }
    if has_weak_patterns(api_key) {
        result.security_issue("Key contains weak patterns");
    }
}

fn matches(regex: &LazyLock<Option<Regex>>, text: &str) -> bool {
    regex.as_ref().is_some_and(|re| re.is_match(text))
}

/// Shannon entropy in bits per character
pub fn shannon_entropy(text: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// The whole key is one unit repeated, or some 3..8 char substring recurs
fn has_repeated_patterns(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();

    for unit in 1..=n / 2 {
        if n % unit == 0 && chars.chunks(unit).all(|chunk| chunk == &chars[..unit]) {
            return true;
        }
    }

    for width in 3..(n / 2).min(8) {
        let mut seen = HashSet::new();
        if chars.windows(width).any(|window| !seen.insert(window)) {
            return true;
        }
    }
    false
}

fn has_weak_patterns(text: &str) -> bool {
    let mut run = 1;
    let mut previous = None;
    for c in text.chars() {
        if Some(c) == previous {
            run += 1;
            if run >= SAME_CHAR_RUN {
                return true;
            }
        } else {
            run = 1;
            previous = Some(c);
        }
    }

    matches(&RE_SEQUENTIAL, text) || matches(&RE_COMMON_WORDS, text) || matches(&RE_LONG_DIGITS, text)
}

// ==================== Reports ====================

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub valid: usize,
    pub invalid: usize,
    pub warnings: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderTally {
    pub total: usize,
    pub valid: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub total_keys: usize,
    pub summary: ReportSummary,
    pub provider_breakdown: BTreeMap<String, ProviderTally>,
    pub security_issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub results: Vec<ValidationResult>,
}

/// Aggregate several results into a single report with recommendations
pub fn create_report(results: Vec<ValidationResult>) -> ValidationReport {
    let mut summary = ReportSummary::default();
    let mut provider_breakdown: BTreeMap<String, ProviderTally> = BTreeMap::new();
    let mut security_issues = Vec::new();

    for result in &results {
        let status = result.status();
        match status {
            ValidationStatus::Valid => summary.valid += 1,
            ValidationStatus::Invalid => summary.invalid += 1,
            ValidationStatus::Warning => summary.warnings += 1,
        }
        summary.errors += result.errors.len();

        let provider = result.provider.map(|p| p.as_str()).unwrap_or("unknown");
        let tally = provider_breakdown.entry(provider.to_string()).or_default();
        tally.total += 1;
        if status == ValidationStatus::Valid {
            tally.valid += 1;
        }

        security_issues.extend(result.security_issues.iter().cloned());
    }

    let mut recommendations = Vec::new();
    if summary.invalid > 0 {
        recommendations.push("Review and replace invalid API keys".to_string());
    }
    if !security_issues.is_empty() {
        recommendations.push("Address security issues with flagged keys".to_string());
    }
    if summary.warnings > 0 {
        recommendations.push("Review keys with warnings for potential issues".to_string());
    }

    ValidationReport {
        timestamp: Utc::now(),
        total_keys: results.len(),
        summary,
        provider_breakdown,
        security_issues,
        recommendations,
        results,
    }
}
