use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{FONT_ENV_VAR, SYSTEM_FONT_CANDIDATES, USER_FONT_NAMES};

#[derive(Error, Debug)]
pub enum FontResolveError {
    #[error("font file not found: {0}")]
    NotFound(PathBuf),

    #[error("no usable font found; set VIDEO_EDIT_FONT or pass --font <PATH>")]
    NoneAvailable,

    #[error("failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("overlay text requires a font")]
    Required,
}

/// Locates a TrueType/OpenType font for the text overlay.
///
/// Resolution order:
/// 1. `explicit` (from `--font` or settings), which must exist
/// 2. the `VIDEO_EDIT_FONT` environment variable, which must exist if set
/// 3. well-known names in the user font directory
/// 4. well-known system font paths
pub fn resolve(explicit: Option<&Path>) -> Result<PathBuf, FontResolveError> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = dirs::font_dir() {
        candidates.extend(USER_FONT_NAMES.iter().map(|name| dir.join(name)));
    }
    candidates.extend(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

    resolve_from(explicit, std::env::var_os(FONT_ENV_VAR), &candidates)
}

/// Resolution logic with the environment and candidate list injected.
pub fn resolve_from(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    candidates: &[PathBuf],
) -> Result<PathBuf, FontResolveError> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf());
    }

    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return existing(PathBuf::from(value));
    }

    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or(FontResolveError::NoneAvailable)
}

fn existing(path: PathBuf) -> Result<PathBuf, FontResolveError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(FontResolveError::NotFound(path))
    }
}

/// Reads and parses a font file.
pub fn load_font(path: &Path) -> Result<fontdue::Font, FontResolveError> {
    let bytes = std::fs::read(path).map_err(|source| FontResolveError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(|reason| {
        FontResolveError::Parse {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("mine.ttf");
        let other = dir.path().join("other.ttf");
        std::fs::write(&explicit, b"x").unwrap();
        std::fs::write(&other, b"x").unwrap();

        let found = resolve_from(
            Some(&explicit),
            Some(other.clone().into_os_string()),
            &[other],
        )
        .unwrap();
        assert_eq!(found, explicit);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("fallback.ttf");
        std::fs::write(&fallback, b"x").unwrap();

        let err = resolve_from(Some(&dir.path().join("nope.ttf")), None, &[fallback]).unwrap_err();
        assert!(matches!(err, FontResolveError::NotFound(_)));
    }

    #[test]
    fn test_env_value_used_before_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let env_font = dir.path().join("env.ttf");
        let candidate = dir.path().join("cand.ttf");
        std::fs::write(&env_font, b"x").unwrap();
        std::fs::write(&candidate, b"x").unwrap();

        let found =
            resolve_from(None, Some(env_font.clone().into_os_string()), &[candidate]).unwrap();
        assert_eq!(found, env_font);
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("cand.ttf");
        std::fs::write(&candidate, b"x").unwrap();

        let found = resolve_from(None, Some(OsString::new()), &[candidate.clone()]).unwrap();
        assert_eq!(found, candidate);
    }

    #[test]
    fn test_first_existing_candidate_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ttf");
        let present = dir.path().join("present.ttf");
        std::fs::write(&present, b"x").unwrap();

        let found = resolve_from(None, None, &[missing, present.clone()]).unwrap();
        assert_eq!(found, present);
    }

    #[test]
    fn test_no_candidates_is_an_error() {
        let err = resolve_from(None, None, &[]).unwrap_err();
        assert!(matches!(err, FontResolveError::NoneAvailable));
        assert!(err.to_string().contains(FONT_ENV_VAR));
    }

    #[test]
    fn test_load_font_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(
            load_font(&path),
            Err(FontResolveError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_font_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_font(&dir.path().join("gone.ttf")),
            Err(FontResolveError::Read { .. })
        ));
    }
}
