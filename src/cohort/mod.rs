//! Per-sample cohort processing: file discovery, schema unification, event
//! association and risk aggregation, all backed by one analytic workspace.

pub mod aggregate;
pub mod dates;
pub mod events;
pub mod extract;
pub mod files;
pub mod unify;

use duckdb::Connection;
use tracing::debug;

use crate::error::Result;

/// Columns of the unified relation a caller may stratify by. Aggregation SQL
/// is assembled only from identifiers resolved through this list, so caller
/// strings never reach the query text.
pub const STRATIFIERS: &[&str] = &["sex", "race", "age_group"];

const DDL: &str = "
CREATE TABLE beneficiaries (
    year                INTEGER NOT NULL,
    bene_id             VARCHAR NOT NULL,
    birth_date          DATE    NOT NULL,
    death_date          DATE,
    sex                 VARCHAR,
    race                VARCHAR,
    state               VARCHAR,
    hmo_coverage_months VARCHAR,
    age                 INTEGER NOT NULL,
    age_group           VARCHAR NOT NULL
);
CREATE TABLE claims (
    clm_id         VARCHAR NOT NULL,
    bene_id        VARCHAR NOT NULL,
    admission_date DATE    NOT NULL,
    admission_year INTEGER NOT NULL
);
";

/// The transient in-memory relational engine backing one sample's processing.
///
/// Opened per sample and dropped before the next sample starts, so nothing
/// leaks across samples and peak memory stays bounded to one working set.
pub struct Workspace {
    conn: Connection,
    sample: u8,
}

impl Workspace {
    pub fn open(sample: u8) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(DDL)?;
        debug!(sample, "opened analytic workspace");
        Ok(Self { conn, sample })
    }

    pub fn sample(&self) -> u8 {
        self.sample
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Row count of the unified beneficiary relation.
    pub fn beneficiary_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM beneficiaries", [], |r| r.get(0))?;
        Ok(count)
    }

    /// Row count of the joined relation. Errors until the join has run.
    pub fn joined_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM joined", [], |r| r.get(0))?;
        Ok(count)
    }
}
