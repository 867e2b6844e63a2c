//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `brewnote_core` linkage.
//! - Exercise the entity/store path end-to-end against an in-memory DB.
//! - Keep output deterministic for quick local sanity checks.

use brewnote_core::db::open_db_in_memory;
use brewnote_core::{ChangeHub, Hop, PersistentEntity, SqliteRecordStore};

fn main() {
    println!("brewnote_core ping={}", brewnote_core::ping());
    println!("brewnote_core version={}", brewnote_core::core_version());

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("smoke_db_open error={err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = smoke_insert_and_read(&conn) {
        eprintln!("smoke_entity error={err}");
        std::process::exit(1);
    }
}

fn smoke_insert_and_read(conn: &rusqlite::Connection) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteRecordStore::try_new(conn)?;
    let hub = ChangeHub::new();

    let mut hop = Hop::new("Cascade", true, "smoke");
    hop.set_alpha(&store, &hub, 5.5)?;
    let key = hop.insert_in_database(&store)?;

    let name = hop.core_mut().name(&store)?;
    println!("smoke_entity table=hop key={key} name={name}");
    Ok(())
}
