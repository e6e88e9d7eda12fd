//! Dataset validator: checks every raw entry against every rule and aggregates the results.
//! Only missing required fields and unparseable website URLs fail the run.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::data::dataset::{parse_dataset, read_dataset, DatasetError};
use crate::data::fields::{canonical, is_blank, is_falsy, type_name, Field};

pub const REQUIRED_FIELDS: [Field; 2] = [Field::Name, Field::WebsiteUrl];

pub const OPTIONAL_FIELDS: [Field; 8] = [
    Field::Description,
    Field::City,
    Field::CompanySize,
    Field::Track,
    Field::IconUrl,
    Field::Language,
    Field::StatusCode,
    Field::Domain,
];

const EXAMPLE_LIMIT: usize = 5;

pub const EXIT_PASS: i32 = 0;
pub const EXIT_INPUT_FAILURE: i32 = 1;
pub const EXIT_RULE_FAILURE: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleSeverity {
    Fatal,
    Advisory,
}

impl RuleSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Advisory => "advisory",
        }
    }
}

impl fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    MissingRequired,
    InvalidUrl,
    InvalidIconUrl,
    Non200,
    EmptyDesc,
    DuplicateDomain,
    DomainMismatch,
    TypeIssue,
}

impl Rule {
    pub const ALL: [Rule; 8] = [
        Rule::MissingRequired,
        Rule::InvalidUrl,
        Rule::InvalidIconUrl,
        Rule::Non200,
        Rule::EmptyDesc,
        Rule::DuplicateDomain,
        Rule::DomainMismatch,
        Rule::TypeIssue,
    ];

    pub fn severity(self) -> RuleSeverity {
        match self {
            Self::MissingRequired | Self::InvalidUrl => RuleSeverity::Fatal,
            _ => RuleSeverity::Advisory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingRequired {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Value>,
    pub key: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidUrl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidIconUrl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    pub icon: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonSuccessStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    pub code: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateDomain {
    #[serde(rename = "dupeOf", skip_serializing_if = "Option::is_none")]
    pub dupe_of: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainMismatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(rename = "urlHost")]
    pub url_host: String,
    pub domain: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Value>,
    pub key: &'static str,
    #[serde(rename = "type")]
    pub type_name: &'static str,
}

/// Violation counter that keeps only the first few examples, in encounter order.
#[derive(Debug, Clone)]
struct Sample<T> {
    count: usize,
    examples: Vec<T>,
}

impl<T> Default for Sample<T> {
    fn default() -> Self {
        Self {
            count: 0,
            examples: Vec::new(),
        }
    }
}

impl<T> Sample<T> {
    fn push(&mut self, example: T) {
        self.count += 1;
        if self.examples.len() < EXAMPLE_LIMIT {
            self.examples.push(example);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub count: usize,
    pub keys: Vec<String>,
    pub required_keys: Vec<&'static str>,
    pub optional_keys_found: Vec<&'static str>,
    pub lang_values: Vec<Value>,
    pub missing_required_count: usize,
    pub missing_required_examples: Vec<MissingRequired>,
    pub invalid_url_count: usize,
    pub invalid_url_examples: Vec<InvalidUrl>,
    pub invalid_icon_url_count: usize,
    pub invalid_icon_url_examples: Vec<InvalidIconUrl>,
    pub non_200_count: usize,
    pub non_200_examples: Vec<NonSuccessStatus>,
    pub empty_desc_count: usize,
    pub empty_desc_examples: Vec<Option<Value>>,
    pub duplicate_domain_count: usize,
    pub duplicate_domain_examples: Vec<DuplicateDomain>,
    pub domain_mismatch_count: usize,
    pub domain_mismatch_examples: Vec<DomainMismatch>,
    pub type_issues_count: usize,
    pub type_issues_examples: Vec<TypeIssue>,
}

impl ValidationReport {
    pub fn violations(&self, rule: Rule) -> usize {
        match rule {
            Rule::MissingRequired => self.missing_required_count,
            Rule::InvalidUrl => self.invalid_url_count,
            Rule::InvalidIconUrl => self.invalid_icon_url_count,
            Rule::Non200 => self.non_200_count,
            Rule::EmptyDesc => self.empty_desc_count,
            Rule::DuplicateDomain => self.duplicate_domain_count,
            Rule::DomainMismatch => self.domain_mismatch_count,
            Rule::TypeIssue => self.type_issues_count,
        }
    }

    pub fn is_fatal(&self) -> bool {
        Rule::ALL
            .into_iter()
            .filter(|rule| rule.severity() == RuleSeverity::Fatal)
            .any(|rule| self.violations(rule) > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub report: ValidationReport,
}

impl ValidationOutcome {
    pub fn exit_code(&self) -> i32 {
        if self.ok {
            EXIT_PASS
        } else {
            EXIT_RULE_FAILURE
        }
    }
}

/// Parses an absolute URL; scheme-only forms such as `mailto:` have no host and are rejected.
pub fn parse_absolute_url(raw: &str) -> Option<Url> {
    Url::parse(raw).ok().filter(|url| url.host_str().is_some())
}

#[derive(Default)]
struct Collector {
    keys: BTreeSet<String>,
    langs: Vec<Value>,
    missing_required: Sample<MissingRequired>,
    invalid_urls: Sample<InvalidUrl>,
    invalid_icon_urls: Sample<InvalidIconUrl>,
    non_200: Sample<NonSuccessStatus>,
    empty_desc: Sample<Option<Value>>,
    duplicates: Sample<DuplicateDomain>,
    domain_mismatch: Sample<DomainMismatch>,
    type_issues: Sample<TypeIssue>,
    seen_domains: HashMap<String, Option<Value>>,
}

impl Collector {
    fn check(&mut self, entry: &Map<String, Value>) {
        self.keys.extend(entry.keys().cloned());

        let name = canonical(entry, Field::Name).cloned();
        let domain = canonical(entry, Field::Domain);
        let url = canonical(entry, Field::WebsiteUrl);

        for field in REQUIRED_FIELDS {
            if is_blank(canonical(entry, field)) {
                self.missing_required.push(MissingRequired {
                    name: name.clone(),
                    domain: domain.cloned(),
                    key: field.key(),
                });
            }
        }

        for field in Field::STRING_FIELDS {
            if let Some(value) = canonical(entry, field) {
                if !value.is_string() {
                    self.push_type_issue(&name, domain, field, value);
                }
            }
        }
        if let Some(code) = canonical(entry, Field::StatusCode) {
            if !code.is_number() {
                self.push_type_issue(&name, domain, Field::StatusCode, code);
            }
        }

        let parsed_url = url.and_then(Value::as_str).and_then(parse_absolute_url);
        if parsed_url.is_none() {
            self.invalid_urls.push(InvalidUrl {
                name: name.clone(),
                url: url.cloned(),
            });
        }

        let icon = canonical(entry, Field::IconUrl).filter(|icon| !is_falsy(Some(icon)));
        if let Some(icon) = icon {
            if icon.as_str().and_then(parse_absolute_url).is_none() {
                self.invalid_icon_urls.push(InvalidIconUrl {
                    name: name.clone(),
                    icon: icon.clone(),
                });
            }
        }

        if let Some(code) = canonical(entry, Field::StatusCode) {
            if code.as_f64() != Some(200.0) {
                self.non_200.push(NonSuccessStatus {
                    name: name.clone(),
                    code: code.clone(),
                });
            }
        }

        if is_blank(canonical(entry, Field::Description)) {
            self.empty_desc.push(name.clone());
        }

        let domain_text = domain
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty());
        if let Some(domain_text) = domain_text {
            let key = domain_text.to_lowercase();
            match self.seen_domains.get(&key) {
                Some(first) => self.duplicates.push(DuplicateDomain {
                    dupe_of: first.clone(),
                    name: name.clone(),
                    domain: key,
                }),
                None => {
                    self.seen_domains.insert(key, name.clone());
                }
            }

            if let Some(host) = parsed_url.as_ref().and_then(Url::host_str) {
                let host = host.to_lowercase();
                if host != domain_text.to_lowercase() {
                    self.domain_mismatch.push(DomainMismatch {
                        name: name.clone(),
                        url_host: host,
                        domain: Value::String(domain_text.to_string()),
                    });
                }
            }
        }

        if let Some(lang) = canonical(entry, Field::Language) {
            if !is_falsy(Some(lang)) && !self.langs.contains(lang) {
                self.langs.push(lang.clone());
            }
        }
    }

    fn push_type_issue(
        &mut self,
        name: &Option<Value>,
        domain: Option<&Value>,
        field: Field,
        value: &Value,
    ) {
        self.type_issues.push(TypeIssue {
            name: name.clone(),
            domain: domain.cloned(),
            key: field.key(),
            type_name: type_name(value),
        });
    }

    fn finish(self, count: usize) -> ValidationReport {
        let optional_keys_found = OPTIONAL_FIELDS
            .iter()
            .map(|field| field.key())
            .filter(|key| self.keys.contains(*key))
            .collect();

        ValidationReport {
            count,
            keys: self.keys.into_iter().collect(),
            required_keys: REQUIRED_FIELDS.iter().map(|field| field.key()).collect(),
            optional_keys_found,
            lang_values: self.langs,
            missing_required_count: self.missing_required.count,
            missing_required_examples: self.missing_required.examples,
            invalid_url_count: self.invalid_urls.count,
            invalid_url_examples: self.invalid_urls.examples,
            invalid_icon_url_count: self.invalid_icon_urls.count,
            invalid_icon_url_examples: self.invalid_icon_urls.examples,
            non_200_count: self.non_200.count,
            non_200_examples: self.non_200.examples,
            empty_desc_count: self.empty_desc.count,
            empty_desc_examples: self.empty_desc.examples,
            duplicate_domain_count: self.duplicates.count,
            duplicate_domain_examples: self.duplicates.examples,
            domain_mismatch_count: self.domain_mismatch.count,
            domain_mismatch_examples: self.domain_mismatch.examples,
            type_issues_count: self.type_issues.count,
            type_issues_examples: self.type_issues.examples,
        }
    }
}

/// Runs every rule over every entry. Non-object entries are checked as empty objects.
pub fn validate_entries(entries: &[Value]) -> ValidationOutcome {
    let empty = Map::new();
    let mut collector = Collector::default();
    for entry in entries {
        collector.check(entry.as_object().unwrap_or(&empty));
    }

    let report = collector.finish(entries.len());
    ValidationOutcome {
        ok: !report.is_fatal(),
        report,
    }
}

pub fn validate_str(raw: &str) -> Result<ValidationOutcome, DatasetError> {
    let entries = parse_dataset(raw)?;
    Ok(validate_entries(&entries))
}

pub fn validate_dataset(path: impl AsRef<Path>) -> Result<ValidationOutcome, DatasetError> {
    let entries = read_dataset(path)?;
    Ok(validate_entries(&entries))
}
