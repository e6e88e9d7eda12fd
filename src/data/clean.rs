//! Scrape cleaner: turns a page-scraper export into the nav-list dataset.
//! Single mode reads `data.metadata`; multi mode parses the listing in `data.markdown`.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::data::registry::{record_dataset, today_utc, DataSetEntry, RegistryError, NAV_LIST_DATASET};

pub const DEFAULT_INPUT_PATH: &str = "fancyteams.json";
pub const DEFAULT_OUTPUT_PATH: &str = "cleaned_nav.json";
const UNKNOWN_NAME: &str = "Unknown";
const SCRAPE_SOURCE: &str = "scrape_export";
const FAVICON_ENDPOINT: &str = "https://www.google.com/s2/favicons?domain=";
const DETAIL_SEARCH_LIMIT: usize = 12;
const ANCHORED_NAME_MAX_CHARS: usize = 60;
const FALLBACK_NAME_MAX_CHARS: usize = 30;

const CITY_CANDIDATES: &[&str] = &[
    "北京", "上海", "杭州", "深圳", "苏州", "远程", "广州", "成都", "武汉", "厦门", "南京", "西安",
    "重庆", "青岛", "天津", "合肥", "宁波", "杭州/北京", "北京/上海",
];

static IMAGE_MARKDOWN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").expect("image pattern"));
static WEBSITE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[官网[^\]]*\]\((https?://[^)]+)\)").expect("website link pattern")
});
static HEADCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,4}(?:[-–—]\d{1,4})?人\b").expect("headcount pattern")
});
static CITY_COMBO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\x{4e00}-\x{9fa5}A-Za-z]+(?:/[\x{4e00}-\x{9fa5}A-Za-z]+)+$")
        .expect("city combo pattern")
});
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IconMode {
    #[default]
    Google,
    DataUrl,
}

impl FromStr for IconMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "google" => Ok(Self::Google),
            "dataurl" => Ok(Self::DataUrl),
            other => Err(format!("invalid icon mode '{other}' (expected google or dataurl)")),
        }
    }
}

impl fmt::Display for IconMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::DataUrl => write!(f, "dataurl"),
        }
    }
}

/// One row of the nav-list dataset, keyed the way the validator expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedEntry {
    #[serde(rename = "名称")]
    pub name: String,
    #[serde(rename = "官网链接")]
    pub website_url: String,
    #[serde(rename = "一句话简介")]
    pub description: String,
    #[serde(rename = "城市")]
    pub city: String,
    #[serde(rename = "规模")]
    pub size: String,
    #[serde(rename = "赛道")]
    pub track: String,
    #[serde(rename = "图标链接")]
    pub icon_url: String,
    #[serde(rename = "语言")]
    pub language: String,
    #[serde(rename = "状态码")]
    pub status_code: Value,
    #[serde(rename = "域名")]
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownEntry {
    pub name: String,
    pub website_url: String,
    pub description: String,
    pub city: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub output_path: String,
    pub record_count: usize,
    pub multi: bool,
}

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("input file does not exist or cannot be read: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scrape export: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to write cleaned output {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub fn ensure_https(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let with_scheme = match trimmed.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => trimmed.to_string(),
    };
    let lower = with_scheme.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        with_scheme
    } else {
        format!("https://{with_scheme}")
    }
}

pub fn extract_domain(raw_url: &str) -> String {
    Url::parse(raw_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_default()
}

pub fn clean_text(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw.trim(), " ").into_owned()
}

/// Digit-only strings become integers; every other value passes through.
pub fn to_int_if_numeric(value: Option<&Value>) -> Value {
    match value {
        None => Value::Null,
        Some(Value::String(text))
            if !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit()) =>
        {
            text.parse::<u64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(text.clone()))
        }
        Some(other) => other.clone(),
    }
}

pub fn build_icon_link(domain: &str, favicon: &str, mode: IconMode) -> String {
    if mode == IconMode::DataUrl && !favicon.is_empty() {
        return favicon.to_string();
    }
    if !domain.is_empty() {
        return format!("{FAVICON_ENDPOINT}{domain}");
    }
    favicon.to_string()
}

fn non_empty_str<'a>(value: Option<&'a Value>) -> Option<&'a str> {
    value.and_then(Value::as_str).filter(|text| !text.is_empty())
}

/// Single-record mode: one entry describing the scraped page itself.
pub fn clean_entry(raw: &Value, mode: IconMode) -> CleanedEntry {
    let meta = raw.pointer("/data/metadata");
    let meta_field = |key: &str| meta.and_then(|meta| meta.get(key));
    let form_url = non_empty_str(raw.pointer("/formState/url"));

    let url = non_empty_str(meta_field("url"))
        .or_else(|| non_empty_str(meta_field("sourceURL")))
        .or(form_url)
        .unwrap_or_default();
    let url = ensure_https(url);
    let domain = extract_domain(&url);

    let title = non_empty_str(meta_field("title"))
        .or((!domain.is_empty()).then_some(domain.as_str()))
        .or(form_url)
        .unwrap_or_default();
    let name = clean_text(title);

    CleanedEntry {
        name: if name.is_empty() {
            UNKNOWN_NAME.to_string()
        } else {
            name
        },
        description: clean_text(non_empty_str(meta_field("description")).unwrap_or_default()),
        city: String::new(),
        size: String::new(),
        track: String::new(),
        icon_url: build_icon_link(
            &domain,
            non_empty_str(meta_field("favicon")).unwrap_or_default(),
            mode,
        ),
        language: clean_text(non_empty_str(meta_field("language")).unwrap_or_default()),
        status_code: to_int_if_numeric(meta_field("statusCode")),
        website_url: url,
        domain,
    }
}

fn is_image_or_link_line(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("![") || line.starts_with("[![") || line.starts_with('[') || line.starts_with('<')
}

fn is_size_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.contains("估值") && HEADCOUNT.is_match(line)
}

fn is_city_line(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.contains('人') || line.contains("估值") || is_image_or_link_line(line) {
        return false;
    }
    CITY_CANDIDATES.iter().any(|city| line.contains(city)) || CITY_COMBO.is_match(line)
}

fn is_founder_line(line: &str) -> bool {
    line.contains("Founder") || line.contains("CEO") || line.contains("创始")
}

fn extract_website(line: &str) -> Option<String> {
    let without_images = IMAGE_MARKDOWN.replace_all(line, "");
    WEBSITE_LINK
        .captures(&without_images)
        .and_then(|caps| caps.get(1))
        .map(|link| link.as_str().to_string())
}

/// Looks upward from the website line: first below the nearest image, then any short text line.
fn find_name(lines: &[&str], idx: usize) -> Option<String> {
    for j in (0..idx).rev() {
        if !lines[j].trim().starts_with("![") {
            continue;
        }
        for candidate in lines.iter().skip(j + 1).map(|line| line.trim()) {
            if candidate.is_empty() || is_image_or_link_line(candidate) || is_founder_line(candidate) {
                continue;
            }
            if candidate.chars().count() <= ANCHORED_NAME_MAX_CHARS {
                return Some(candidate.to_string());
            }
            break;
        }
    }

    (0..idx)
        .rev()
        .map(|j| lines[j].trim())
        .find(|line| {
            !line.is_empty()
                && !is_image_or_link_line(line)
                && !is_founder_line(line)
                && !line.contains("估值")
                && !line.contains('人')
                && line.chars().count() <= FALLBACK_NAME_MAX_CHARS
        })
        .map(str::to_string)
}

fn find_details(lines: &[&str], start: usize) -> (String, String, String) {
    let mut desc = String::new();
    let mut city = String::new();
    let mut size = String::new();

    for line in lines.iter().skip(start).take(DETAIL_SEARCH_LIMIT).map(|line| line.trim()) {
        if line.is_empty() || is_image_or_link_line(line) {
            continue;
        }
        if desc.is_empty() && !is_city_line(line) && !is_size_line(line) && !line.contains("估值") {
            desc = line.to_string();
            continue;
        }
        if city.is_empty() && is_city_line(line) {
            city = line.to_string();
            continue;
        }
        if size.is_empty() && is_size_line(line) {
            size = line.to_string();
            continue;
        }
        if !desc.is_empty() && (!city.is_empty() || !size.is_empty()) {
            break;
        }
    }

    (desc, city, size)
}

/// Multi-record mode: one entry per `[官网](…)` link in a scraped listing page.
pub fn parse_markdown_entries(markdown: &str) -> Vec<MarkdownEntry> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut entries = Vec::new();
    let mut used_urls = HashSet::new();

    for (idx, line) in lines.iter().enumerate() {
        if !line.contains("官网") {
            continue;
        }
        let Some(url) = extract_website(line) else {
            continue;
        };
        let url = ensure_https(&url);
        if used_urls.contains(&url) {
            continue;
        }
        let Some(name) = find_name(&lines, idx) else {
            continue;
        };

        let details_start = (0..idx)
            .rev()
            .find(|&j| lines[j].trim() == name)
            .map_or(idx, |j| j + 1);
        let (description, city, size) = find_details(&lines, details_start);

        entries.push(MarkdownEntry {
            name: clean_text(&name),
            website_url: url.clone(),
            description: clean_text(&description),
            city: clean_text(&city),
            size: clean_text(&size),
        });
        used_urls.insert(url);
    }

    entries
}

pub fn build_clean_item(
    item: &MarkdownEntry,
    language: &str,
    status_code: Option<&Value>,
    mode: IconMode,
) -> CleanedEntry {
    let url = ensure_https(&item.website_url);
    let domain = extract_domain(&url);
    let name = clean_text(&item.name);

    CleanedEntry {
        name: if name.is_empty() {
            UNKNOWN_NAME.to_string()
        } else {
            name
        },
        description: clean_text(&item.description),
        city: clean_text(&item.city),
        size: clean_text(&item.size),
        track: String::new(),
        icon_url: build_icon_link(&domain, "", mode),
        language: clean_text(language),
        status_code: to_int_if_numeric(status_code),
        website_url: url,
        domain,
    }
}

/// Multi mode falls back to the single page entry when the markdown yields nothing.
pub fn clean_scrape(raw: &Value, mode: IconMode, multi: bool) -> Vec<CleanedEntry> {
    if multi {
        let meta = raw.pointer("/data/metadata");
        let markdown = non_empty_str(raw.pointer("/data/markdown")).unwrap_or_default();
        let language = non_empty_str(meta.and_then(|meta| meta.get("language"))).unwrap_or_default();
        let status_code = meta.and_then(|meta| meta.get("statusCode"));

        let cleaned: Vec<_> = parse_markdown_entries(markdown)
            .iter()
            .map(|item| build_clean_item(item, language, status_code, mode))
            .collect();
        if !cleaned.is_empty() {
            return cleaned;
        }
    }
    vec![clean_entry(raw, mode)]
}

pub fn clean_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    registry_path: impl AsRef<Path>,
    mode: IconMode,
    multi: bool,
) -> Result<CleanSummary, CleanError> {
    let input = input.as_ref();
    let output = output.as_ref();

    let raw = fs::read_to_string(input).map_err(|source| CleanError::Read {
        path: input.display().to_string(),
        source,
    })?;
    let payload: Value = serde_json::from_str(&raw)?;
    let cleaned = clean_scrape(&payload, mode, multi);

    let write_err = |source| CleanError::Write {
        path: output.display().to_string(),
        source,
    };
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(output, serde_json::to_string_pretty(&cleaned)?).map_err(write_err)?;
    info!(path = %output.display(), records = cleaned.len(), multi, "wrote cleaned nav list");

    record_dataset(
        registry_path,
        NAV_LIST_DATASET,
        DataSetEntry {
            source: SCRAPE_SOURCE.to_string(),
            data_version: None,
            last_updated: Some(today_utc()),
            path: output.display().to_string(),
            record_count: Some(cleaned.len()),
        },
    )?;

    Ok(CleanSummary {
        output_path: output.display().to_string(),
        record_count: cleaned.len(),
        multi,
    })
}
