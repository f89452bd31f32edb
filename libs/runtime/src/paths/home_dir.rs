//! Resolution of the server home directory.
//!
//! The home directory anchors every relative path the server uses (SQLite
//! files, log files). It is resolved once at config load and stored back as
//! an absolute path.

use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum HomeDirError {
    #[error("cannot determine the {0} directory for this platform")]
    Unavailable(&'static str),
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("failed to create home directory {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve `configured` into an absolute directory.
///
/// * `None` (or blank) falls back to `<platform base>/<default_subdir>`, where the
///   platform base is the roaming data dir on Windows and the user's home elsewhere.
/// * A leading `~` expands to the user's home directory.
/// * Other relative paths are resolved against the current directory.
///
/// With `create` set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let resolved = match configured.as_deref().map(str::trim) {
        None | Some("") => platform_base()?.join(default_subdir),
        Some(raw) => absolutize(expand_tilde(raw)?)?,
    };

    if create {
        std::fs::create_dir_all(&resolved).map_err(|source| HomeDirError::Create {
            path: resolved.to_string_lossy().to_string(),
            source,
        })?;
    }
    Ok(resolved)
}

#[cfg(target_os = "windows")]
fn platform_base() -> Result<PathBuf, HomeDirError> {
    dirs::data_dir().ok_or(HomeDirError::Unavailable("data"))
}

#[cfg(not(target_os = "windows"))]
fn platform_base() -> Result<PathBuf, HomeDirError> {
    user_home()
}

fn user_home() -> Result<PathBuf, HomeDirError> {
    dirs::home_dir().ok_or(HomeDirError::Unavailable("home"))
}

fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return user_home();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(user_home()?.join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}

fn absolutize(p: PathBuf) -> Result<PathBuf, HomeDirError> {
    if p.is_absolute() {
        return Ok(p);
    }
    let cwd = env::current_dir().map_err(HomeDirError::CurrentDir)?;
    Ok(normalize_dots(&cwd.join(p)))
}

// Lexical cleanup of "." and ".." components; does not touch the filesystem.
fn normalize_dots(p: &Path) -> PathBuf {
    use std::path::Component;
    let mut out = PathBuf::new();
    for c in p.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("church/home");
        let out = resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", true).unwrap();
        assert_eq!(out, target);
        assert!(out.is_dir());
    }

    #[test]
    fn create_false_does_not_touch_disk() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("not-created");
        let out =
            resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", false).unwrap();
        assert_eq!(out, target);
        assert!(!out.exists());
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let out = resolve_home_dir(Some("./some/../rel_home".into()), ".x", false).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with("rel_home"));
        assert!(!out.to_string_lossy().contains(".."));
    }

    #[test]
    fn tilde_expands_to_user_home() {
        let out = resolve_home_dir(Some("~/.church_tilde".into()), ".x", false).unwrap();
        assert!(out.is_absolute());
        assert!(!out.to_string_lossy().starts_with('~'));
        assert!(out.ends_with(".church_tilde"));
    }

    #[test]
    fn blank_falls_back_to_platform_base() {
        let out = resolve_home_dir(Some("  ".into()), ".church_default", false).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with(".church_default"));
        #[cfg(not(target_os = "windows"))]
        assert_eq!(out.parent(), dirs::home_dir().as_deref());
    }

    #[test]
    fn bare_tilde_is_the_user_home() {
        let out = resolve_home_dir(Some("~".into()), ".x", false).unwrap();
        assert_eq!(Some(out), dirs::home_dir());
    }

    #[test]
    fn normalize_dots_is_lexical() {
        let p = normalize_dots(Path::new("/a/./b/../c"));
        assert_eq!(p, PathBuf::from("/a/c"));
    }
}
