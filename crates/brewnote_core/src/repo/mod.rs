//! Persistence layer abstractions and implementations.
//!
//! # Responsibility
//! - Define the column-addressed store contract the entity layer mutates
//!   through.
//! - Isolate SQLite query details from domain code.
//!
//! # Invariants
//! - The store distinguishes "row absent" from "column null".
//! - Store APIs return semantic errors (`RowNotFound`, `UnknownColumn`) in
//!   addition to DB transport errors.

pub mod record_store;
