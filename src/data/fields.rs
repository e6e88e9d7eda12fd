//! Semantic fields of a raw nav-list entry and the raw keys probed for each.
//! Cleaned datasets use Chinese keys; hand-written datasets may use the English aliases.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    WebsiteUrl,
    Description,
    City,
    CompanySize,
    Track,
    IconUrl,
    Language,
    StatusCode,
    Domain,
}

impl Field {
    /// Fields whose values must be strings when present, in report order.
    pub const STRING_FIELDS: [Field; 9] = [
        Field::Name,
        Field::WebsiteUrl,
        Field::Description,
        Field::City,
        Field::CompanySize,
        Field::Track,
        Field::IconUrl,
        Field::Language,
        Field::Domain,
    ];

    /// Key written by the scrape cleaner and checked by the validator.
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "名称",
            Self::WebsiteUrl => "官网链接",
            Self::Description => "一句话简介",
            Self::City => "城市",
            Self::CompanySize => "规模",
            Self::Track => "赛道",
            Self::IconUrl => "图标链接",
            Self::Language => "语言",
            Self::StatusCode => "状态码",
            Self::Domain => "域名",
        }
    }

    /// Every raw key accepted for this field, in probe order.
    pub fn raw_keys(self) -> &'static [&'static str] {
        match self {
            Self::Name => &["名称", "name"],
            Self::WebsiteUrl => &["官网链接", "url"],
            Self::Description => &["一句话简介", "desc"],
            Self::City => &["城市", "city"],
            Self::CompanySize => &["公司规模", "规模", "size"],
            Self::Track => &["赛道", "track"],
            Self::IconUrl => &["图标链接"],
            Self::Language => &["语言"],
            Self::StatusCode => &["状态码"],
            Self::Domain => &["域名"],
        }
    }
}

/// Value stored under the field's canonical key, with `null` treated as absent.
pub fn canonical<'a>(entry: &'a Map<String, Value>, field: Field) -> Option<&'a Value> {
    entry.get(field.key()).filter(|value| !value.is_null())
}

/// First non-null value among the field's raw keys.
pub fn lookup<'a>(entry: &'a Map<String, Value>, field: Field) -> Option<&'a Value> {
    field
        .raw_keys()
        .iter()
        .find_map(|key| entry.get(*key).filter(|value| !value.is_null()))
}

/// Trimmed text of the field. Numbers and booleans are rendered; arrays and objects are ignored.
pub fn lookup_text(entry: &Map<String, Value>, field: Field) -> String {
    lookup(entry, field)
        .and_then(scalar_text)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Loose emptiness: missing, null, false, zero, empty array, or whitespace-only string.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(_)) => false,
    }
}

/// Falsy in the JavaScript sense: missing, null, false, zero, or the empty string.
/// Whitespace-only strings and empty arrays count as present.
pub fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

/// JSON type name reported for type mismatches.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{is_blank, is_falsy, lookup, lookup_text, Field};

    #[test]
    fn lookup_prefers_first_non_null_key() {
        let entry = json!({ "公司规模": null, "规模": "11-50人", "size": "huge" });
        let entry = entry.as_object().unwrap();
        assert_eq!(lookup(entry, Field::CompanySize), Some(&json!("11-50人")));
    }

    #[test]
    fn lookup_text_falls_back_to_alias_and_trims() {
        let entry = json!({ "name": "  Acme  " });
        assert_eq!(lookup_text(entry.as_object().unwrap(), Field::Name), "Acme");
    }

    #[test]
    fn lookup_text_renders_numbers() {
        let entry = json!({ "名称": 42 });
        assert_eq!(lookup_text(entry.as_object().unwrap(), Field::Name), "42");
    }

    #[test]
    fn blank_values() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!("   "))));
        assert!(is_blank(Some(&json!(0))));
        assert!(is_blank(Some(&json!(false))));
        assert!(!is_blank(Some(&json!("x"))));
        assert!(!is_blank(Some(&json!(7))));
    }

    #[test]
    fn falsy_keeps_whitespace_and_empty_arrays() {
        assert!(is_falsy(None));
        assert!(is_falsy(Some(&json!(""))));
        assert!(is_falsy(Some(&json!(0))));
        assert!(!is_falsy(Some(&json!("   "))));
        assert!(!is_falsy(Some(&json!([]))));
    }
}
