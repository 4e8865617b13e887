//! Patcher module - In-place identifier rewrites in third-party sources

use std::path::Path;

use regex::{NoExpand, Regex};

use crate::core::error::PatchError;

/// ImGuizmo still calls the ImGui draw-list API by its pre-1.80 name
pub mod imguizmo {
    pub const FROM: &str = "AddBezierCurve";
    pub const TO: &str = "AddBezierCubic";
}

/// Replace every match of `pattern` in `text`, returning the new text and
/// the number of replacements
pub fn patch_text(text: &str, pattern: &Regex, replacement: &str) -> (String, usize) {
    let count = pattern.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    let patched = pattern.replace_all(text, NoExpand(replacement));
    (patched.into_owned(), count)
}

/// Count the matches `patch_file` would replace, without writing
pub fn count_matches(path: &Path, pattern: &Regex) -> Result<usize, PatchError> {
    let text = read(path)?;
    Ok(pattern.find_iter(&text).count())
}

/// Rewrite `path` in place. The file is truncated and rewritten even when
/// nothing matched; there is no backup and the write is not atomic.
pub fn patch_file(path: &Path, pattern: &Regex, replacement: &str) -> Result<usize, PatchError> {
    let text = read(path)?;
    let (patched, count) = patch_text(&text, pattern, replacement);

    std::fs::write(path, patched).map_err(|e| PatchError::from_io(path.to_path_buf(), e))?;

    log::debug!(
        "patched {}: {} occurrence(s) of /{}/",
        path.display(),
        count,
        pattern.as_str()
    );
    Ok(count)
}

fn read(path: &Path) -> Result<String, PatchError> {
    std::fs::read_to_string(path).map_err(|e| PatchError::from_io(path.to_path_buf(), e))
}
