//! SQLite DSN helpers: memory detection, PRAGMA extraction and file path preparation.

use std::io;
use std::path::PathBuf;

/// Query keys that configure PRAGMAs and must not reach sqlx.
const PRAGMA_KEYS: &[&str] = &["wal", "synchronous", "busy_timeout", "journal_mode"];

/// True for `sqlite::memory:`, `sqlite://:memory:` and any DSN carrying `mode=memory`.
pub(crate) fn is_memory_dsn(dsn: &str) -> bool {
    let (base, query) = split_query(dsn);
    if base.ends_with(":memory:") {
        return true;
    }
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .any(|(k, v)| k.eq_ignore_ascii_case("mode") && v.eq_ignore_ascii_case("memory"))
        })
        .unwrap_or(false)
}

/// Split the DSN into a sqlx-compatible DSN and the PRAGMA pairs it carried.
///
/// Keys are lower-cased; non-PRAGMA query parameters are preserved in order.
pub(crate) fn extract_sqlite_pragmas(dsn: &str) -> (String, Vec<(String, String)>) {
    let (base, query) = split_query(dsn);
    let Some(query) = query else {
        return (dsn.to_string(), Vec::new());
    };

    let mut pragmas = Vec::new();
    let mut kept = url::form_urlencoded::Serializer::new(String::new());
    let mut kept_any = false;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let key_lower = key.to_ascii_lowercase();
        if PRAGMA_KEYS.contains(&key_lower.as_str()) {
            pragmas.push((key_lower, value.into_owned()));
        } else {
            kept.append_pair(&key, &value);
            kept_any = true;
        }
    }

    let clean = if kept_any {
        format!("{base}?{}", kept.finish())
    } else {
        base.to_string()
    };
    (clean, pragmas)
}

/// Create the parent directory of a file-backed SQLite DSN.
pub(crate) fn prepare_sqlite_path(dsn: &str, create_dirs: bool) -> io::Result<()> {
    if !create_dirs || is_memory_dsn(dsn) {
        return Ok(());
    }
    if let Some(parent) = file_path(dsn).as_ref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn file_path(dsn: &str) -> Option<PathBuf> {
    let (base, _) = split_query(dsn);
    let raw = base
        .strip_prefix("sqlite://")
        .or_else(|| base.strip_prefix("sqlite:"))?;
    // URI forms such as "file:memdb" have no directory to create.
    if raw.is_empty() || raw.starts_with("file:") {
        return None;
    }
    Some(PathBuf::from(raw))
}

fn split_query(dsn: &str) -> (&str, Option<&str>) {
    match dsn.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (dsn, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_memory_dsns() {
        assert!(is_memory_dsn("sqlite::memory:"));
        assert!(is_memory_dsn("sqlite://:memory:"));
        assert!(is_memory_dsn("sqlite::memory:?wal=true"));
        assert!(is_memory_dsn("sqlite:file:memdb1?mode=memory&cache=shared"));
        assert!(!is_memory_dsn("sqlite:///tmp/church.db"));
    }

    #[test]
    fn extracts_pragmas_and_keeps_other_params() {
        let (clean, pragmas) =
            extract_sqlite_pragmas("sqlite:///tmp/a.db?mode=rwc&WAL=true&busy_timeout=100");
        assert_eq!(clean, "sqlite:///tmp/a.db?mode=rwc");
        assert_eq!(
            pragmas,
            vec![
                ("wal".to_string(), "true".to_string()),
                ("busy_timeout".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn extract_without_query_is_identity() {
        let (clean, pragmas) = extract_sqlite_pragmas("sqlite::memory:");
        assert_eq!(clean, "sqlite::memory:");
        assert!(pragmas.is_empty());
    }

    #[test]
    fn creates_parent_directory_for_file_dsn() {
        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("nested/dir/church.db");
        let dsn = format!("sqlite://{}", db.to_string_lossy().replace('\\', "/"));

        prepare_sqlite_path(&dsn, true).unwrap();
        assert!(db.parent().unwrap().exists());
    }

    #[test]
    fn memory_dsn_needs_no_directory() {
        assert!(file_path("sqlite:file:memdb?mode=memory").is_none());
        prepare_sqlite_path("sqlite::memory:", true).unwrap();
    }
}
