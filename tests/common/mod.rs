#![allow(dead_code)]

use well_report_ingest::db::{self, DbPool};

pub const BAKKEN_REPORT: &str = "\
SUNDRY COMPLETION REPORT
Operator: Continental Resources, Inc.
Well Name: Atlanta 14-6H
API #: 42-001-12345
County, State: Williams, ND
Surface Hole Location (SHL): NE NE SEC 12
Latitude: 48.109444 Longitude: -103.730556
Datum: NAD83

Date Stimulated: 05/14/2019
Stimulated Formation: Bakken
Top (ft): 3500
Bottom (ft): 3,800
Stimulation Stages: 30
Volume: 12,500 bbl
Type Treatment: Sand Frac
Lbs Proppant: 4,250,000
";

pub const TWO_STAGE_REPORT: &str = "\
Operator: Oasis Petroleum
Well Name: Kline Federal 5300 11-18H
API: 33-053-02102
Latitude: 48.0612
Longitude: -103.4518

Date Stimulated: 01/02/2020
Stimulated Formation: Bakken
Top (ft): 10000
Bottom (ft): 20000
Date Stimulated: 2020-03-04
Stimulated Formation: Three Forks
Top (ft): 10500
Bottom (ft): 20500
";

/// Header only: no coordinates and no stimulation blocks.
pub const HEADER_ONLY_REPORT: &str = "\
Operator: Whiting Oil and Gas
Well Name: Tarpon Federal 21-4
API: 33-105-01234
";

pub async fn memory_pool() -> DbPool {
    db::connect("sqlite::memory:").await.expect("open in-memory database")
}
