//! Env-style key=value file reader.
//!
//! Used for the workspace `.faunarc` credentials file. Values are
//! treated as secrets and are never logged.

use std::path::Path;

use tracing::warn;

/// Reads a single key from an env-style file.
///
/// Returns `None` when the file does not exist, cannot be parsed, or
/// does not define the key. A missing file is not an error, only a
/// fallback-not-available signal.
pub fn read_key(path: &Path, key: &str) -> Option<String> {
    if !path.exists() {
        return None;
    }

    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read credentials file");
            return None;
        }
    };

    for item in iter {
        match item {
            Ok((k, v)) if k == key => return Some(v),
            Ok(_) => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed line in credentials file");
            }
        }
    }

    None
}
