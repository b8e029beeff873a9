// src/normalize.rs - Typed conversion of matched report strings
//
// Every function here returns `None` for input it cannot make sense of; callers
// store that as NULL and keep going.
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("entity regex")
});
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));
static NON_PRINTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x09\x0A\x0D\x20-\x7E]").expect("printable regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("ws regex"));
static API_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z-]").expect("api regex"));
static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([-+]?(?:\d+(?:\.\d*)?|\.\d+))\s*([A-Za-z][A-Za-z0-9/]*)?")
        .expect("quantity regex")
});
static COORDINATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([-+]?\d+(?:\.\d+)?)\s*°?\s*([NSEWnsew])?\b").expect("coordinate regex")
});

/// Accepted date layouts, tried in order. The shape check keeps `%Y` from
/// swallowing a two digit year.
static DATE_FORMATS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"^\d{1,2}/\d{1,2}/\d{4}$", "%m/%d/%Y"),
        (r"^\d{1,2}/\d{1,2}/\d{2}$", "%m/%d/%y"),
        (r"^\d{4}-\d{1,2}-\d{1,2}$", "%Y-%m-%d"),
    ]
    .into_iter()
    .map(|(shape, format)| (Regex::new(shape).expect("date shape regex"), format))
    .collect()
});

pub const NAME_MAX_LEN: usize = 255;
pub const CODE_MAX_LEN: usize = 64;
pub const UNIT_MAX_LEN: usize = 32;
pub const DETAILS_MAX_LEN: usize = 65_500;

/// A number with an optional unit suffix, e.g. `12,500 bbl`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Option<String>,
}

pub fn unescape_html(raw: &str) -> String {
    HTML_ENTITY
        .replace_all(raw, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Unescapes entities, strips markup and non-printable characters, and
/// collapses whitespace. Blank results become `None`.
pub fn clean_text(raw: &str) -> Option<String> {
    let unescaped = unescape_html(raw);
    let without_tags = HTML_TAG.replace_all(&unescaped, " ");
    let printable = NON_PRINTABLE.replace_all(&without_tags, " ");
    let collapsed = WHITESPACE.replace_all(&printable, " ");
    let cleaned = collapsed.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

pub fn limit_length(value: String, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => value[..cut].to_string(),
        None => value,
    }
}

pub fn clean_limited(raw: &str, max_chars: usize) -> Option<String> {
    clean_text(raw).map(|value| limit_length(value, max_chars))
}

/// API numbers keep only alphanumerics and dashes; typographic dashes are
/// folded to `-` first.
pub fn normalize_api(raw: &str) -> Option<String> {
    let cleaned = clean_text(&raw.replace(['\u{2013}', '\u{2014}'], "-"))?;
    let compact: String = cleaned.split_whitespace().collect();
    let api = API_DISALLOWED.replace_all(&compact, "");
    if api.is_empty() {
        None
    } else {
        Some(limit_length(api.into_owned(), CODE_MAX_LEN))
    }
}

pub fn parse_quantity(raw: &str) -> Option<Quantity> {
    let without_separators = raw.replace(',', "");
    let caps = QUANTITY.captures(&without_separators)?;
    let value: f64 = caps[1].parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let unit = caps
        .get(2)
        .map(|m| m.as_str().trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty())
        .map(|u| limit_length(u, UNIT_MAX_LEN));
    Some(Quantity { value, unit })
}

pub fn parse_float(raw: &str) -> Option<f64> {
    parse_quantity(raw).map(|q| q.value)
}

pub fn parse_int(raw: &str) -> Option<i64> {
    let value = parse_float(raw)?;
    if value.abs() > i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let token = raw.split_whitespace().next()?;
    let token = token.trim_end_matches([',', ';', '.']);
    DATE_FORMATS
        .iter()
        .filter(|(shape, _)| shape.is_match(token))
        .find_map(|(_, format)| NaiveDate::parse_from_str(token, format).ok())
}

pub fn is_valid_latitude(value: f64) -> bool {
    value.is_finite() && (-90.0..=90.0).contains(&value)
}

pub fn is_valid_longitude(value: f64) -> bool {
    value.is_finite() && (-180.0..=180.0).contains(&value)
}

fn parse_coordinate(raw: &str, negative_hemisphere: char) -> Option<f64> {
    let caps = COORDINATE.captures(raw)?;
    let mut value: f64 = caps[1].parse().ok()?;
    if let Some(hemisphere) = caps.get(2) {
        let hemisphere = hemisphere.as_str().to_ascii_uppercase();
        if hemisphere.starts_with(negative_hemisphere) && value > 0.0 {
            value = -value;
        }
    }
    Some(value)
}

pub fn parse_latitude(raw: &str) -> Option<f64> {
    parse_coordinate(raw, 'S').filter(|v| is_valid_latitude(*v))
}

pub fn parse_longitude(raw: &str) -> Option<f64> {
    parse_coordinate(raw, 'W').filter(|v| is_valid_longitude(*v))
}
