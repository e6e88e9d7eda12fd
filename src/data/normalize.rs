//! Record normalizer: maps raw entries to display-ready records with unique, URL-derived ids.
//! Entries without a name or URL are skipped; nothing here fails on a single bad entry.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::data::dataset::{read_dataset, DatasetError};
use crate::data::fields::{lookup, lookup_text, Field};

pub const META_SEPARATOR: &str = " · ";
pub const CITY_LABEL: &str = "城市";
pub const TRACK_LABEL: &str = "赛道";
pub const SIZE_LABEL: &str = "规模";
const PLACEHOLDER_ID_PREFIX: &str = "fancy-team";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Description with the `城市: … · 赛道: … · 规模: …` tags appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Lower-case, collapse every run outside `[a-z0-9]` to one hyphen, strip edge hyphens.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;
    for ch in raw.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Slug of the URL host without `www.`, or of the raw string when it does not parse.
pub fn id_from_url(raw_url: &str) -> String {
    match Url::parse(raw_url) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default().to_lowercase();
            slugify(host.strip_prefix("www.").unwrap_or(host.as_str()))
        }
        Err(_) => slugify(raw_url),
    }
}

pub fn derive_id(url: &str, name: &str, index: usize) -> String {
    let from_url = id_from_url(url);
    if !from_url.is_empty() {
        return from_url;
    }
    let from_name = slugify(name);
    if !from_name.is_empty() {
        return from_name;
    }
    format!("{PLACEHOLDER_ID_PREFIX}-{index}")
}

/// Joins the base description and the labelled metadata, skipping empty parts.
pub fn merge_description(base: &str, city: &str, track: &str, size: &str) -> Option<String> {
    let meta = [(CITY_LABEL, city), (TRACK_LABEL, track), (SIZE_LABEL, size)]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join(META_SEPARATOR);

    let merged = [base.trim(), meta.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(META_SEPARATOR);

    (!merged.is_empty()).then_some(merged)
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn build_record(entry: &Map<String, Value>, index: usize) -> Option<CanonicalRecord> {
    let name = lookup_text(entry, Field::Name);
    let url = lookup_text(entry, Field::WebsiteUrl);
    if name.is_empty() || url.is_empty() {
        debug!(index, "skipping entry without name or url");
        return None;
    }

    let city = lookup_text(entry, Field::City);
    let size = lookup_text(entry, Field::CompanySize);
    let track = lookup_text(entry, Field::Track);
    let base = lookup(entry, Field::Description)
        .and_then(Value::as_str)
        .unwrap_or_default();

    Some(CanonicalRecord {
        id: derive_id(&url, &name, index),
        desc: merge_description(base, &city, &track, &size),
        name,
        url,
        city: non_empty(city),
        track: non_empty(track),
        size: non_empty(size),
    })
}

/// Suffixes repeated ids with their 1-based occurrence number, in input order.
/// A suffix already taken by an earlier record advances to the next free number.
pub fn assign_unique_ids(records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    records
        .into_iter()
        .map(|mut record| {
            let count = occurrences.entry(record.id.clone()).or_insert(0);
            *count += 1;
            if *count > 1 || taken.contains(&record.id) {
                let mut n = (*count).max(2);
                while taken.contains(&format!("{}-{n}", record.id)) {
                    n += 1;
                }
                record.id = format!("{}-{n}", record.id);
            }
            taken.insert(record.id.clone());
            record
        })
        .collect()
}

pub fn normalize_entries(entries: &[Value]) -> Vec<CanonicalRecord> {
    let records = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| build_record(entry.as_object()?, index))
        .collect();
    assign_unique_ids(records)
}

/// Normalizes a parsed document; anything other than an array yields no records.
pub fn normalize_value(payload: &Value) -> Vec<CanonicalRecord> {
    payload
        .as_array()
        .map(|entries| normalize_entries(entries))
        .unwrap_or_default()
}

pub fn normalize_dataset_file(
    path: impl AsRef<Path>,
) -> Result<Vec<CanonicalRecord>, DatasetError> {
    let entries = read_dataset(path)?;
    Ok(normalize_entries(&entries))
}

#[cfg(test)]
mod tests {
    use super::{assign_unique_ids, derive_id, id_from_url, slugify, CanonicalRecord};

    fn record(id: &str) -> CanonicalRecord {
        CanonicalRecord {
            id: id.to_string(),
            name: id.to_string(),
            url: format!("https://{id}"),
            desc: None,
            city: None,
            track: None,
            size: None,
        }
    }

    #[test]
    fn slugify_collapses_runs_and_trims_edges() {
        assert_eq!(slugify("  Hello, World!! "), "hello-world");
        assert_eq!(slugify("--a__b--"), "a-b");
        assert_eq!(slugify("深度求索"), "");
        assert_eq!(slugify("AI 2.0 公司"), "ai-2-0");
    }

    #[test]
    fn id_from_url_strips_www() {
        assert_eq!(id_from_url("https://www.Example.com/x"), "example-com");
        assert_eq!(id_from_url("not a url"), "not-a-url");
    }

    #[test]
    fn derive_id_falls_back_to_name_then_index() {
        assert_eq!(derive_id("中文", "Moonshot AI", 3), "moonshot-ai");
        assert_eq!(derive_id("中文", "月之暗面", 3), "fancy-team-3");
    }

    #[test]
    fn third_occurrence_gets_suffix_three() {
        let ids: Vec<_> = assign_unique_ids(vec![record("a"), record("a"), record("b"), record("a")])
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec!["a", "a-2", "b", "a-3"]);
    }

    #[test]
    fn natural_id_matching_a_generated_suffix_moves_on() {
        let ids: Vec<_> = assign_unique_ids(vec![record("a"), record("a"), record("a-2"), record("a")])
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec!["a", "a-2", "a-2-2", "a-3"]);
    }
}
