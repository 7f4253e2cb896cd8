//! Qibla Hub — document store adapters.
//!
//! [`memory::MemoryDocumentStore`] keeps everything in process and backs tests
//! and single-node runs. [`postgres::PgDocumentStore`] persists documents in
//! `PostgreSQL` and fans changes out with `LISTEN`/`NOTIFY`.

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
