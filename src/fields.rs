// src/fields.rs - Declarative field table: name -> patterns -> normalizer
use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::normalize::{self, Quantity, CODE_MAX_LEN, DETAILS_MAX_LEN, NAME_MAX_LEN, UNIT_MAX_LEN};

/// How a matched string becomes a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    /// Cleaned text truncated to the given number of characters.
    Text(usize),
    Api,
    Float,
    Int,
    Quantity,
    Date,
    Latitude,
    Longitude,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Float(f64),
    Int(i64),
    Quantity(Quantity),
    Date(NaiveDate),
}

impl Normalizer {
    pub fn apply(self, raw: &str) -> Option<FieldValue> {
        match self {
            Normalizer::Text(max) => normalize::clean_limited(raw, max).map(FieldValue::Text),
            Normalizer::Api => normalize::normalize_api(raw).map(FieldValue::Text),
            Normalizer::Float => normalize::parse_float(raw).map(FieldValue::Float),
            Normalizer::Int => normalize::parse_int(raw).map(FieldValue::Int),
            Normalizer::Quantity => normalize::parse_quantity(raw).map(FieldValue::Quantity),
            Normalizer::Date => normalize::parse_date(raw).map(FieldValue::Date),
            Normalizer::Latitude => normalize::parse_latitude(raw).map(FieldValue::Float),
            Normalizer::Longitude => normalize::parse_longitude(raw).map(FieldValue::Float),
        }
    }
}

/// One row of the field table. Patterns are tried in order and capture group 1
/// of the first one that matches with a non-blank capture wins.
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
    pub normalizer: Normalizer,
}

pub static WELL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "operator",
        patterns: &[r"Operator(?: Name)?[:#\s-]+(.+)", r"Operator\s+(.*)"],
        normalizer: Normalizer::Text(NAME_MAX_LEN),
    },
    FieldSpec {
        name: "well_name",
        patterns: &[
            r"Well(?: Name)?(?: & Number)?[:#\s-]+(.+)",
            r"Well\s+Name\s*/\s*Number[:#\s-]+(.+)",
        ],
        normalizer: Normalizer::Text(NAME_MAX_LEN),
    },
    FieldSpec {
        name: "api",
        patterns: &[
            r"\bAPI(?:\s*Number|\s*No\.?|\s*#)?[:#\s-]*([0-9\-]{5,})",
            r"\bAPI(?:\s*Number|\s*No\.?|\s*#)?[:#\s-]*([0-9\s\-]{5,})",
        ],
        normalizer: Normalizer::Api,
    },
    FieldSpec {
        name: "enseco_job",
        patterns: &[r"Enseco\s*Job\s*#[:#\s-]+(\S+)"],
        normalizer: Normalizer::Text(CODE_MAX_LEN),
    },
    FieldSpec {
        name: "job_type",
        patterns: &[r"Job\s*Type[:#\s-]+(.+)", r"Type of Job[:#\s-]+(.+)"],
        normalizer: Normalizer::Text(NAME_MAX_LEN),
    },
    FieldSpec {
        name: "county_state",
        patterns: &[r"County,?\s*State[:#\s-]+(.+)", r"County[:#\s-]+(.+)"],
        normalizer: Normalizer::Text(NAME_MAX_LEN),
    },
    FieldSpec {
        name: "shl",
        patterns: &[
            r"Surface\s*Hole\s*Location\s*\(SHL\)[:#\s-]+(.+)",
            r"Surface\s*Hole\s*Location[:#\s-]+(.+)",
            r"\bSHL[:#\s-]+(.+)",
        ],
        normalizer: Normalizer::Text(DETAILS_MAX_LEN),
    },
    FieldSpec {
        name: "latitude",
        patterns: &[
            r"Latitude[:#\s-]+?(-?\d+\.\d+(?:\s*[NS]\b)?)",
            r"\bLat(?:itude)?[:#\s-]+?(-?\d+\.\d+(?:\s*[NS]\b)?)",
        ],
        normalizer: Normalizer::Latitude,
    },
    FieldSpec {
        name: "longitude",
        patterns: &[
            r"Longitude[:#\s-]+?(-?\d+\.\d+(?:\s*[EW]\b)?)",
            r"\bLong?(?:itude)?[:#\s-]+?(-?\d+\.\d+(?:\s*[EW]\b)?)",
        ],
        normalizer: Normalizer::Longitude,
    },
    FieldSpec {
        name: "datum",
        patterns: &[r"Datum[:#\s-]+(.+)"],
        normalizer: Normalizer::Text(NAME_MAX_LEN),
    },
];

pub static STIMULATION_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "date_stimulated",
        patterns: &[
            r"Date[ \t]*Stimulated[:#\s-]+(.+)",
            r"Stimulated[ \t]*Date[:#\s-]+(.+)",
        ],
        normalizer: Normalizer::Date,
    },
    FieldSpec {
        name: "stimulated_formation",
        patterns: &[
            r"Stimulated\s*Formation[:#\s-]+(.+)",
            r"Formation[:#\s-]+(.+)",
        ],
        normalizer: Normalizer::Text(NAME_MAX_LEN),
    },
    FieldSpec {
        name: "top_ft",
        patterns: &[
            r"Top\s*\(ft\)[:#\s-]+([\d,]+(?:\.\d+)?)",
            r"\bTop[:#\s-]+([\d,]+(?:\.\d+)?)\s*(?:ft|feet)\b",
            r"\bTop[:#\s-]+([\d,]+(?:\.\d+)?)",
        ],
        normalizer: Normalizer::Float,
    },
    FieldSpec {
        name: "bottom_ft",
        patterns: &[
            r"Bottom\s*\(ft\)[:#\s-]+([\d,]+(?:\.\d+)?)",
            r"\bBottom[:#\s-]+([\d,]+(?:\.\d+)?)\s*(?:ft|feet)\b",
            r"\bBottom[:#\s-]+([\d,]+(?:\.\d+)?)",
        ],
        normalizer: Normalizer::Float,
    },
    FieldSpec {
        name: "stimulation_stages",
        patterns: &[
            r"Stimulation\s*Stages[:#\s-]+(\d+)",
            r"\bStages[:#\s-]+(\d+)",
        ],
        normalizer: Normalizer::Int,
    },
    FieldSpec {
        name: "volume",
        patterns: &[
            r"\bVolume\s*(?:\([^)]*\))?[:#\s-]+([\d,]+(?:\.\d+)?(?:[ \t]*[A-Za-z][A-Za-z0-9/]*)?)",
            r"Total\s*Volume[:#\s-]+([\d,]+(?:\.\d+)?(?:[ \t]*[A-Za-z][A-Za-z0-9/]*)?)",
        ],
        normalizer: Normalizer::Quantity,
    },
    FieldSpec {
        name: "volume_units",
        patterns: &[
            r"Volume\s*Units[:#\s-]+([A-Za-z0-9/]+)",
            r"Volume\s*\(([^)]+)\)",
        ],
        normalizer: Normalizer::Text(UNIT_MAX_LEN),
    },
    FieldSpec {
        name: "type_treatment",
        patterns: &[
            r"Type\s*Treatment[:#\s-]+(.+)",
            r"Treatment\s*Type[:#\s-]+(.+)",
        ],
        normalizer: Normalizer::Text(NAME_MAX_LEN),
    },
    FieldSpec {
        name: "acid",
        patterns: &[r"\bAcid[:#\s-]+(.+)", r"\bAcid\s*Type[:#\s-]+(.+)"],
        normalizer: Normalizer::Text(NAME_MAX_LEN),
    },
    FieldSpec {
        name: "lbs_proppant",
        patterns: &[
            r"Lbs?\.?\s*Proppant[:#\s-]+([\d,]+(?:\.\d+)?)",
            r"Proppant[:#\s-]+([\d,]+(?:\.\d+)?)",
        ],
        normalizer: Normalizer::Float,
    },
    FieldSpec {
        name: "max_treatment_pressure",
        patterns: &[
            r"Max(?:imum)?\s*Treatment\s*Pressure(?:\s*\([^)]*\))?[:#\s-]+([\d,]+(?:\.\d+)?)",
        ],
        normalizer: Normalizer::Float,
    },
    FieldSpec {
        name: "max_treatment_rate",
        patterns: &[
            r"Max(?:imum)?\s*Treatment\s*Rate(?:\s*\([^)]*\))?[:#\s-]+([\d,]+(?:\.\d+)?)",
        ],
        normalizer: Normalizer::Float,
    },
    FieldSpec {
        name: "details",
        patterns: &[r"Details[:#\s-]+(.+)"],
        normalizer: Normalizer::Text(DETAILS_MAX_LEN),
    },
];

pub static WELL_TABLE: LazyLock<FieldTable> =
    LazyLock::new(|| FieldTable::compile(WELL_FIELDS).expect("well field patterns compile"));

pub static STIMULATION_TABLE: LazyLock<FieldTable> = LazyLock::new(|| {
    FieldTable::compile(STIMULATION_FIELDS).expect("stimulation field patterns compile")
});

struct CompiledField {
    spec: &'static FieldSpec,
    patterns: Vec<Regex>,
}

impl CompiledField {
    fn first_match<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.patterns.iter().find_map(|re| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
                .filter(|captured| !captured.is_empty())
        })
    }
}

pub struct FieldTable {
    fields: Vec<CompiledField>,
}

impl FieldTable {
    pub fn compile(specs: &'static [FieldSpec]) -> Result<Self, regex::Error> {
        let fields = specs
            .iter()
            .map(|spec| {
                let patterns = spec
                    .patterns
                    .iter()
                    .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledField { spec, patterns })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { fields })
    }

    /// Raw (un-normalized) capture for a single field.
    pub fn raw_match<'t>(&self, name: &str, text: &'t str) -> Option<&'t str> {
        self.fields
            .iter()
            .find(|f| f.spec.name == name)
            .and_then(|f| f.first_match(text))
    }

    /// Matches and normalizes every field. Fields that do not match, or whose
    /// capture fails normalization, are absent from the result.
    pub fn extract(&self, text: &str) -> FieldValues {
        let values = self
            .fields
            .iter()
            .filter_map(|field| {
                let raw = field.first_match(text)?;
                let value = field.spec.normalizer.apply(raw)?;
                Some((field.spec.name, value))
            })
            .collect();
        FieldValues { values }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldValues {
    values: HashMap<&'static str, FieldValue>,
}

impl FieldValues {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &'static str, value: FieldValue) {
        self.values.insert(name, value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            FieldValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Quantity(q) => Some(q.value),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.get(name)? {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn quantity(&self, name: &str) -> Option<&Quantity> {
        match self.get(name)? {
            FieldValue::Quantity(q) => Some(q),
            _ => None,
        }
    }
}
