// tidyguard-core/src/domain/diff.rs

use diffy::DiffOptions;

use crate::error::TidyError;

/// Unified diff between two captures of the same file.
pub struct DiffRenderer;

impl DiffRenderer {
    /// Renders `before` → `after` as a unified diff with `a/<label>` and
    /// `b/<label>` headers. Identical inputs render as an empty string.
    ///
    /// Uses a Myers line diff, so output is minimal and deterministic.
    pub fn render(label: &str, before: &[u8], after: &[u8]) -> Result<String, TidyError> {
        if before == after {
            return Ok(String::new());
        }

        let original = decode(label, before)?;
        let modified = decode(label, after)?;

        let mut options = DiffOptions::new();
        options
            .set_original_filename(format!("a/{label}"))
            .set_modified_filename(format!("b/{label}"));

        Ok(options.create_patch(original, modified).to_string())
    }
}

fn decode<'a>(label: &str, bytes: &'a [u8]) -> Result<&'a str, TidyError> {
    std::str::from_utf8(bytes).map_err(|e| TidyError::DiffRenderFailed {
        label: label.to_string(),
        reason: e.to_string(),
    })
}
