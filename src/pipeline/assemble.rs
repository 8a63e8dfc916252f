//! Fragment concatenation and the final Markdown write.

use crate::error::Pdf2MdError;
use std::path::Path;
use tracing::debug;

/// Join fragments in order with no separator.
pub fn assemble(fragments: &[String]) -> String {
    fragments.concat()
}

/// Write `markdown` to `path` as UTF-8, creating parent directories.
///
/// Uses atomic write (temp file + rename) so a crash mid-write never leaves
/// a truncated `.md` that a batch run would mistake for a finished document.
pub fn write_markdown(path: &Path, markdown: &str) -> Result<(), Pdf2MdError> {
    let write_err = |source| Pdf2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp_path = path.with_extension("md.tmp");
    std::fs::write(&tmp_path, markdown).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(write_err)?;

    debug!("Wrote {} bytes to {}", markdown.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_adds_nothing() {
        let parts = vec!["\n# A\n".to_string(), "b\n".to_string(), "- c\n".to_string()];
        assert_eq!(assemble(&parts), "\n# A\nb\n- c\n");
        assert_eq!(assemble(&[]), "");
    }

    #[test]
    fn write_creates_parents_and_leaves_no_temp() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/out/doc.md");
        write_markdown(&path, "# 見出し\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# 見出し\n");
        assert!(!path.with_extension("md.tmp").exists());
    }
}
