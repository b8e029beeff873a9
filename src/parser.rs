// src/parser.rs - Well header and stimulation stage parsing
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::fields::{FieldValue, FieldValues, STIMULATION_TABLE, WELL_TABLE};
use crate::models::{ParsedReport, StimulationRecord, WellRecord};
use crate::normalize::{self, DETAILS_MAX_LEN};

/// Start of a stimulation stage block.
static STAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Date[ \t]*Stimulated|Stimulated[ \t]*Date").expect("stage marker regex")
});

static LAT_LONG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Latitude[:#\s-]+?(-?\d+\.\d+).{0,40}?Longitude[:#\s-]+?(-?\d+\.\d+)")
        .expect("lat/long regex")
});

static DETAILS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Details[:#\s-]+").expect("details regex"));

/// A line that opens a new labelled field, e.g. `Type Treatment: ...`.
/// Case-sensitive and without whitespace as a separator, so prose
/// continuation lines such as `continued on page 2` stay inside a `Details`
/// block instead of ending it.
static LABEL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][^\n]{0,40}?[:#-]").expect("label line regex"));

static API_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\d[\s\-/\\]*){10,14}").expect("api run regex"));

static API_CONTIGUOUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{10,14}\b").expect("api contiguous regex"));

pub fn parse_report(text: &str) -> ParsedReport {
    let text = normalise_text(text);
    let report = ParsedReport {
        well: parse_well_info(&text),
        stimulations: parse_stimulations(&text),
    };
    debug!(
        "Parsed well {:?} with {} stimulation stage(s)",
        report.well.api,
        report.stimulations.len()
    );
    report
}

pub fn parse_well_info(text: &str) -> WellRecord {
    let mut values = WELL_TABLE.extract(text);

    // Coordinates printed together on one line take precedence.
    if let Some(caps) = LAT_LONG_LINE.captures(text) {
        let latitude = normalize::parse_latitude(&caps[1]);
        let longitude = normalize::parse_longitude(&caps[2]);
        if let (Some(lat), Some(lon)) = (latitude, longitude) {
            values.set("latitude", FieldValue::Float(lat));
            values.set("longitude", FieldValue::Float(lon));
        }
    }

    if values.text("api").is_none() {
        if let Some(api) = extract_api_fallback(text) {
            debug!("Recovered API number {} from unlabeled digits", api);
            values.set("api", FieldValue::Text(api));
        }
    }

    well_record_from(&values)
}

fn well_record_from(values: &FieldValues) -> WellRecord {
    WellRecord {
        api: values.text("api"),
        well_name: values.text("well_name"),
        operator: values.text("operator"),
        enseco_job: values.text("enseco_job"),
        job_type: values.text("job_type"),
        county_state: values.text("county_state"),
        shl: values.text("shl"),
        datum: values.text("datum"),
        latitude: values.float("latitude"),
        longitude: values.float("longitude"),
    }
}

/// Splits the text into stage blocks, each running from one stage marker up to
/// the next marker or the end of the text.
pub fn split_stage_blocks(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = STAGE_MARKER.find_iter(text).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect()
}

pub fn parse_stimulations(text: &str) -> Vec<StimulationRecord> {
    split_stage_blocks(text)
        .into_iter()
        .map(parse_stimulation_block)
        .filter(|record| !record.is_empty())
        .collect()
}

pub fn parse_stimulation_block(block: &str) -> StimulationRecord {
    let values = STIMULATION_TABLE.extract(block);
    let volume = values.quantity("volume");

    let volume_units = values
        .text("volume_units")
        .or_else(|| volume.and_then(|q| q.unit.clone()));

    let details = extract_multiline_block(block)
        .and_then(|raw| normalize::clean_limited(&raw, DETAILS_MAX_LEN))
        .or_else(|| values.text("details"));

    StimulationRecord {
        stimulated_formation: values.text("stimulated_formation"),
        date_stimulated: values.date("date_stimulated"),
        stimulation_stages: values.int("stimulation_stages"),
        top_ft: values.float("top_ft"),
        bottom_ft: values.float("bottom_ft"),
        volume: volume.map(|q| q.value),
        volume_units,
        type_treatment: values.text("type_treatment"),
        acid: values.text("acid"),
        lbs_proppant: values.float("lbs_proppant"),
        max_treatment_pressure: values.float("max_treatment_pressure"),
        max_treatment_rate: values.float("max_treatment_rate"),
        details,
    }
}

/// Text following the `Details` label, continuing over following lines until
/// one that looks like the start of another labelled field.
fn extract_multiline_block(text: &str) -> Option<String> {
    let label = DETAILS_LABEL.find(text)?;
    let mut lines = text[label.end()..].lines();
    let mut collected = vec![lines.next()?];
    collected.extend(lines.take_while(|line| !LABEL_LINE.is_match(line.trim_start())));

    let block = collected.join("\n");
    let block = block.trim();
    if block.is_empty() {
        None
    } else {
        Some(block.to_string())
    }
}

/// Recovers an API number from unlabeled digit runs of 10, 12 or 14 digits,
/// preferring the longest candidate.
pub fn extract_api_fallback(text: &str) -> Option<String> {
    let normalised = text.replace(['\u{2013}', '\u{2014}'], "-");

    let mut candidates: Vec<String> = API_DIGIT_RUN
        .find_iter(&normalised)
        .map(|m| m.as_str().chars().filter(char::is_ascii_digit).collect::<String>())
        .filter(|digits| (10..=14).contains(&digits.len()))
        .collect();
    candidates.extend(
        API_CONTIGUOUS
            .find_iter(&normalised)
            .map(|m| m.as_str().to_string()),
    );

    let mut ordered: Vec<String> = Vec::new();
    for candidate in candidates {
        if !ordered.contains(&candidate) {
            ordered.push(candidate);
        }
    }
    // Stable: equal lengths keep their order of appearance.
    ordered.sort_by(|a, b| b.len().cmp(&a.len()));

    ordered.iter().find_map(|digits| format_api(digits))
}

fn format_api(digits: &str) -> Option<String> {
    match digits.len() {
        10 => Some(format!("{}-{}-{}", &digits[..2], &digits[2..5], &digits[5..])),
        12 => Some(format!(
            "{}-{}-{}-{}",
            &digits[..2],
            &digits[2..5],
            &digits[5..10],
            &digits[10..]
        )),
        14 => Some(format!(
            "{}-{}-{}-{}-{}",
            &digits[..2],
            &digits[2..5],
            &digits[5..10],
            &digits[10..12],
            &digits[12..]
        )),
        _ => None,
    }
}

fn normalise_text(text: &str) -> String {
    text.replace('\r', "")
}
