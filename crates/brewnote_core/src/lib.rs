//! Core domain logic for brewnote.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{CachedField, EntityCore, PersistentEntity};
pub use model::hop::{Hop, HopCollection};
pub use model::property::{ChangeHub, Property, PropertyChange, SubscriberId};
pub use model::table::{ColumnType, Table};
pub use model::text::{
    parse_bool, parse_date, parse_date_time, parse_double, parse_int, render_bool, render_date,
    render_date_time, render_double, render_int, ConversionError,
};
pub use model::value::Value;
pub use repo::record_store::{RecordStore, SqliteRecordStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
