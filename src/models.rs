// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::{is_valid_latitude, is_valid_longitude};

/// Row of the `wells` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Well {
    pub id: i64,
    pub api: String,
    pub well_name: Option<String>,
    pub operator: Option<String>,
    pub enseco_job: Option<String>,
    pub job_type: Option<String>,
    pub county_state: Option<String>,
    pub shl: Option<String>,
    pub datum: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Well {
    /// Coordinates usable for a map marker, if both are present and in range.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if is_valid_latitude(lat) && is_valid_longitude(lon) => {
                Some((lat, lon))
            }
            _ => None,
        }
    }
}

/// Row of the `stimulation_data` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Stimulation {
    pub id: i64,
    pub well_id: i64,
    pub stimulated_formation: Option<String>,
    pub date_stimulated: Option<NaiveDate>,
    pub stimulation_stages: Option<i64>,
    pub top_ft: Option<f64>,
    pub bottom_ft: Option<f64>,
    pub volume: Option<f64>,
    pub volume_units: Option<String>,
    pub type_treatment: Option<String>,
    pub acid: Option<String>,
    pub lbs_proppant: Option<f64>,
    pub max_treatment_pressure: Option<f64>,
    pub max_treatment_rate: Option<f64>,
    pub details: Option<String>,
}

/// API representation: a well with its stimulation records nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellDetail {
    #[serde(flatten)]
    pub well: Well,
    pub mappable: bool,
    pub stimulations: Vec<Stimulation>,
}

impl WellDetail {
    pub fn new(well: Well, stimulations: Vec<Stimulation>) -> Self {
        let mappable = well.coordinates().is_some();
        Self {
            well,
            mappable,
            stimulations,
        }
    }
}

// Parser output, before persistence

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WellRecord {
    pub api: Option<String>,
    pub well_name: Option<String>,
    pub operator: Option<String>,
    pub enseco_job: Option<String>,
    pub job_type: Option<String>,
    pub county_state: Option<String>,
    pub shl: Option<String>,
    pub datum: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StimulationRecord {
    pub stimulated_formation: Option<String>,
    pub date_stimulated: Option<NaiveDate>,
    pub stimulation_stages: Option<i64>,
    pub top_ft: Option<f64>,
    pub bottom_ft: Option<f64>,
    pub volume: Option<f64>,
    pub volume_units: Option<String>,
    pub type_treatment: Option<String>,
    pub acid: Option<String>,
    pub lbs_proppant: Option<f64>,
    pub max_treatment_pressure: Option<f64>,
    pub max_treatment_rate: Option<f64>,
    pub details: Option<String>,
}

impl StimulationRecord {
    pub fn is_empty(&self) -> bool {
        *self == StimulationRecord::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedReport {
    pub well: WellRecord,
    pub stimulations: Vec<StimulationRecord>,
}
