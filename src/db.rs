// src/db.rs - SQLite persistence for wells and their stimulation records
use anyhow::{anyhow, Context, Result};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::{ParsedReport, Stimulation, StimulationRecord, Well, WellDetail, WellRecord};

pub type DbPool = SqlitePool;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const WELL_COLUMNS: &str = "id, api, well_name, operator, enseco_job, job_type, county_state, \
     shl, datum, latitude, longitude";

const STIMULATION_COLUMNS: &str = "id, well_id, stimulated_formation, date_stimulated, \
     stimulation_stages, top_ft, bottom_ft, volume, volume_units, type_treatment, acid, \
     lbs_proppant, max_treatment_pressure, max_treatment_rate, details";

/// Opens the pool and brings the schema up to date.
///
/// An in-memory URL gets a single connection that is never recycled, since
/// every new SQLite memory connection would see an empty database.
pub async fn connect(database_url: &str) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL: {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", database_url))?;

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to apply database migrations")?;

    info!("🗄️  Database ready: {}", database_url);
    Ok(pool)
}

/// Inserts the well, or fills the existing row's columns from every non-null
/// incoming field. Returns the row id either way.
pub async fn upsert_well(conn: &mut SqliteConnection, well: &WellRecord) -> Result<i64> {
    let api = well
        .api
        .as_deref()
        .ok_or_else(|| anyhow!("Well record has no API number"))?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO wells (api, well_name, operator, enseco_job, job_type, county_state,
                           shl, datum, latitude, longitude)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(api) DO UPDATE SET
            well_name    = COALESCE(excluded.well_name, wells.well_name),
            operator     = COALESCE(excluded.operator, wells.operator),
            enseco_job   = COALESCE(excluded.enseco_job, wells.enseco_job),
            job_type     = COALESCE(excluded.job_type, wells.job_type),
            county_state = COALESCE(excluded.county_state, wells.county_state),
            shl          = COALESCE(excluded.shl, wells.shl),
            datum        = COALESCE(excluded.datum, wells.datum),
            latitude     = COALESCE(excluded.latitude, wells.latitude),
            longitude    = COALESCE(excluded.longitude, wells.longitude)
        RETURNING id
        "#,
    )
    .bind(api)
    .bind(&well.well_name)
    .bind(&well.operator)
    .bind(&well.enseco_job)
    .bind(&well.job_type)
    .bind(&well.county_state)
    .bind(&well.shl)
    .bind(&well.datum)
    .bind(well.latitude)
    .bind(well.longitude)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("Failed to upsert well {}", api))?;

    debug!("Upserted well {} as id {}", api, id);
    Ok(id)
}

/// Deletes the well's stimulation rows and inserts `records` in order.
pub async fn replace_stimulations(
    conn: &mut SqliteConnection,
    well_id: i64,
    records: &[StimulationRecord],
) -> Result<()> {
    let removed = sqlx::query("DELETE FROM stimulation_data WHERE well_id = ?")
        .bind(well_id)
        .execute(&mut *conn)
        .await
        .context("Failed to clear stimulation data")?
        .rows_affected();

    for record in records {
        sqlx::query(
            r#"
            INSERT INTO stimulation_data (well_id, stimulated_formation, date_stimulated,
                stimulation_stages, top_ft, bottom_ft, volume, volume_units, type_treatment,
                acid, lbs_proppant, max_treatment_pressure, max_treatment_rate, details)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(well_id)
        .bind(&record.stimulated_formation)
        .bind(record.date_stimulated)
        .bind(record.stimulation_stages)
        .bind(record.top_ft)
        .bind(record.bottom_ft)
        .bind(record.volume)
        .bind(&record.volume_units)
        .bind(&record.type_treatment)
        .bind(&record.acid)
        .bind(record.lbs_proppant)
        .bind(record.max_treatment_pressure)
        .bind(record.max_treatment_rate)
        .bind(&record.details)
        .execute(&mut *conn)
        .await
        .context("Failed to insert stimulation data")?;
    }

    debug!(
        "Replaced stimulation data for well {} ({} removed, {} inserted)",
        well_id,
        removed,
        records.len()
    );
    Ok(())
}

/// Writes a parsed report in a single transaction. Nothing is kept if any
/// statement fails.
pub async fn store_report(pool: &DbPool, report: &ParsedReport) -> Result<i64> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let well_id = upsert_well(&mut tx, &report.well).await?;
    replace_stimulations(&mut tx, well_id, &report.stimulations).await?;

    tx.commit().await.context("Failed to commit transaction")?;
    Ok(well_id)
}

pub async fn list_wells_with_stimulations(pool: &DbPool) -> Result<Vec<WellDetail>, sqlx::Error> {
    let wells: Vec<Well> = sqlx::query_as(&format!("SELECT {} FROM wells ORDER BY id", WELL_COLUMNS))
        .fetch_all(pool)
        .await?;

    let stimulations: Vec<Stimulation> = sqlx::query_as(&format!(
        "SELECT {} FROM stimulation_data ORDER BY well_id, id",
        STIMULATION_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    let mut by_well: HashMap<i64, Vec<Stimulation>> = HashMap::new();
    for stimulation in stimulations {
        by_well.entry(stimulation.well_id).or_default().push(stimulation);
    }

    Ok(wells
        .into_iter()
        .map(|well| {
            let stimulations = by_well.remove(&well.id).unwrap_or_default();
            WellDetail::new(well, stimulations)
        })
        .collect())
}

pub async fn find_well_by_api(pool: &DbPool, api: &str) -> Result<Option<WellDetail>, sqlx::Error> {
    let well: Option<Well> =
        sqlx::query_as(&format!("SELECT {} FROM wells WHERE api = ?", WELL_COLUMNS))
            .bind(api)
            .fetch_optional(pool)
            .await?;

    let Some(well) = well else {
        return Ok(None);
    };

    let stimulations: Vec<Stimulation> = sqlx::query_as(&format!(
        "SELECT {} FROM stimulation_data WHERE well_id = ? ORDER BY id",
        STIMULATION_COLUMNS
    ))
    .bind(well.id)
    .fetch_all(pool)
    .await?;

    Ok(Some(WellDetail::new(well, stimulations)))
}
