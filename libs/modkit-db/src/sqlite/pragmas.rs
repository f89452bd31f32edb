//! Whitelisted SQLite PRAGMAs parsed from DSN query parameters.

/// SQLite journal mode options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum JournalMode {
    Delete,
    Wal,
    Memory,
    Truncate,
    Persist,
    Off,
}

impl JournalMode {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Wal => "WAL",
            JournalMode::Memory => "MEMORY",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Off => "OFF",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DELETE" => Some(JournalMode::Delete),
            "WAL" => Some(JournalMode::Wal),
            "MEMORY" => Some(JournalMode::Memory),
            "TRUNCATE" => Some(JournalMode::Truncate),
            "PERSIST" => Some(JournalMode::Persist),
            "OFF" => Some(JournalMode::Off),
            _ => None,
        }
    }
}

/// SQLite synchronous mode options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SyncMode {
    Off,
    Normal,
    Full,
    Extra,
}

impl SyncMode {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            SyncMode::Off => "OFF",
            SyncMode::Normal => "NORMAL",
            SyncMode::Full => "FULL",
            SyncMode::Extra => "EXTRA",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OFF" => Some(SyncMode::Off),
            "NORMAL" => Some(SyncMode::Normal),
            "FULL" => Some(SyncMode::Full),
            "EXTRA" => Some(SyncMode::Extra),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pragmas {
    pub journal_mode: Option<JournalMode>,
    pub synchronous: Option<SyncMode>,
    pub busy_timeout_ms: Option<u64>,
}

impl Pragmas {
    /// Invalid values are logged and ignored; `wal=true|false` maps onto `journal_mode`.
    pub(crate) fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut pragmas = Pragmas::default();
        for (key, value) in pairs {
            match key.as_str() {
                "journal_mode" => match JournalMode::parse(value) {
                    Some(mode) => pragmas.journal_mode = Some(mode),
                    None => tracing::warn!("Invalid 'journal_mode' PRAGMA value '{}', ignoring", value),
                },
                "wal" => match value.to_ascii_lowercase().as_str() {
                    "true" | "1" => pragmas.journal_mode = Some(JournalMode::Wal),
                    "false" | "0" => pragmas.journal_mode = Some(JournalMode::Delete),
                    _ => tracing::warn!("Invalid 'wal' PRAGMA value '{}', ignoring", value),
                },
                "synchronous" => match SyncMode::parse(value) {
                    Some(mode) => pragmas.synchronous = Some(mode),
                    None => tracing::warn!("Invalid 'synchronous' PRAGMA value '{}', ignoring", value),
                },
                "busy_timeout" => match value.parse::<u64>() {
                    Ok(ms) => pragmas.busy_timeout_ms = Some(ms),
                    Err(_) => tracing::warn!("Invalid 'busy_timeout' PRAGMA value '{}', ignoring", value),
                },
                other => tracing::debug!("Unknown SQLite PRAGMA parameter: {}", other),
            }
        }
        pragmas
    }

    /// Statements to run on every new connection.
    ///
    /// In-memory databases keep `DELETE` journaling and skip the busy timeout.
    pub(crate) fn statements(&self, is_memory: bool, default_busy_timeout_ms: u64) -> Vec<String> {
        let journal = match (self.journal_mode, is_memory) {
            (Some(mode), _) => mode,
            (None, true) => JournalMode::Delete,
            (None, false) => JournalMode::Wal,
        };
        let sync = self.synchronous.unwrap_or(SyncMode::Normal);

        let mut out = vec![
            format!("PRAGMA journal_mode = {}", journal.as_sql()),
            format!("PRAGMA synchronous = {}", sync.as_sql()),
            "PRAGMA foreign_keys = ON".to_string(),
        ];
        if !is_memory {
            let timeout = self.busy_timeout_ms.unwrap_or(default_busy_timeout_ms);
            out.push(format!("PRAGMA busy_timeout = {timeout}"));
        }
        out
    }
}
