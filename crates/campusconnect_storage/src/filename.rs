//! Filename sanitization.

use campusconnect_error::StorageError;

/// Reduce a client-supplied filename to a safe final path segment.
///
/// Drops directory components, joins whitespace runs with `_`, keeps only
/// ASCII alphanumerics plus `.`, `-` and `_`, and trims leading/trailing
/// dots and underscores.
///
/// # Errors
///
/// Returns an invalid-input error when nothing usable remains.
///
/// # Examples
///
/// ```
/// use campusconnect_storage::sanitize_filename;
///
/// assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
/// assert_eq!(sanitize_filename("My Lecture Notes.pdf").unwrap(), "My_Lecture_Notes.pdf");
/// assert!(sanitize_filename("../..").is_err());
/// ```
#[track_caller]
pub fn sanitize_filename(raw: &str) -> Result<String, StorageError> {
    let last_segment = raw.rsplit(['/', '\\']).next().unwrap_or_default();

    let joined = last_segment.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        return Err(StorageError::invalid_input(format!(
            "filename '{}' has no usable characters",
            raw
        )));
    }

    Ok(trimmed.to_string())
}

/// Lowercase extension after the final `.`, if any.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_windows_paths() {
        assert_eq!(
            sanitize_filename(r"C:\Users\sam\Desktop\résumé final.docx").unwrap(),
            "rsum_final.docx"
        );
    }

    #[test]
    fn trims_hidden_file_dots() {
        assert_eq!(sanitize_filename(".profile.png").unwrap(), "profile.png");
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension("Photo.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(extension("README"), None);
        assert_eq!(extension("trailing."), None);
    }
}
