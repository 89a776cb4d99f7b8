//! Writes pipeline artifacts under an output directory.

use crate::error::MedskyError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Artifact writer rooted at one directory. Parent directories are created
/// on demand.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes UTF-8 text to `relative` and returns the full path.
    ///
    /// # Errors
    /// Returns `MedskyError::Io` if the directory or file cannot be written.
    pub fn write_text(&self, relative: impl AsRef<Path>, text: &str) -> Result<PathBuf, MedskyError> {
        let path = self.prepare(relative.as_ref())?;
        std::fs::write(&path, text)?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "Wrote text artifact");
        Ok(path)
    }

    /// Writes `value` as 2-space indented JSON. Non-ASCII text is kept as is.
    ///
    /// # Errors
    /// Returns `MedskyError::Json` or `MedskyError::Io`.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        relative: impl AsRef<Path>,
        value: &T,
    ) -> Result<PathBuf, MedskyError> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_text(relative, &json)
    }

    fn prepare(&self, relative: &Path) -> Result<PathBuf, MedskyError> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_nested_json_with_literal_hangul() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let path = store
            .write_json(
                "validation_results/creative_activities_red_line.json",
                &json!({ "type": "red_line", "Feedbacks": [{ "sentence": "문장", "feedback": "좋음" }] }),
            )
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"sentence\": \"문장\""));
        assert!(written.contains("\n  \"type\""));
        assert!(!written.contains("\\u"));
    }

    #[test]
    fn writes_text_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("out"));

        let path = store.write_text("1_creative_activities.txt", "6. 창의적 체험활동상황").unwrap();

        assert_eq!(path, dir.path().join("out/1_creative_activities.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "6. 창의적 체험활동상황");
    }
}
