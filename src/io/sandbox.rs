//! Confines attacker-influenced file names to a base directory.

use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Resolves `candidate` below `base_dir`.
///
/// Returns the resolved path when it lies strictly inside the canonical
/// base directory, and `None` for anything that escapes it (`..` segments,
/// absolute overrides, symlinks pointing elsewhere) or cannot be resolved.
/// The target file does not need to exist, but its parent directory must.
/// An existing symlink must resolve; dangling links are rejected.
pub fn resolve(base_dir: &Path, candidate: &str) -> Option<PathBuf> {
    let base = match base_dir.canonicalize() {
        Ok(base) => base,
        Err(err) => {
            warn!(base = %base_dir.display(), error = %err, "Cannot canonicalize sandbox base");
            return None;
        }
    };

    let joined = base.join(candidate);
    let file_name = match joined.components().next_back() {
        Some(Component::Normal(name)) => name.to_owned(),
        _ => {
            debug!(candidate, "Rejected candidate without a plain file name");
            return None;
        }
    };

    // `symlink_metadata` sees dangling links, which `exists` reports as absent.
    let resolved = if std::fs::symlink_metadata(&joined).is_ok() {
        match joined.canonicalize() {
            Ok(path) => path,
            Err(err) => {
                warn!(candidate, error = %err, "Rejected unresolvable existing entry");
                return None;
            }
        }
    } else {
        joined.parent()?.canonicalize().ok()?.join(file_name)
    };

    if resolved.starts_with(&base) && resolved != base {
        Some(resolved)
    } else {
        warn!(candidate, "Rejected path escaping sandbox");
        None
    }
}
