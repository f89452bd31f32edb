//! SQLite-specific helpers: DSN cleaning, PRAGMA whitelist, path preparation.

pub(crate) mod dsn;
pub(crate) mod pragmas;

pub(crate) use dsn::{extract_sqlite_pragmas, is_memory_dsn, prepare_sqlite_path};
pub(crate) use pragmas::Pragmas;
