use anyhow::{Result, anyhow};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Sanitizes a client-supplied filename to a plain basename so it can be
/// joined under the upload directory without escaping it.
/// Returns the sanitized filename or an error if nothing usable remains.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    // Get only the filename component (remove any path)
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() || name == "." || name == ".." {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: "Filename cannot be empty".to_string(),
        }));
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    // Replace path separators and reserved characters
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == '/'
                || c == '\\'
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    Ok(sanitized)
}

/// Checks whether a download path segment is a plain filename.
/// Axum percent-decodes path parameters, so an encoded separator or a ".."
/// component shows up here and must be refused.
pub fn is_safe_path_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains('/')
        && !segment.contains('\\')
        && !segment.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test.pdf").unwrap(), "test.pdf");
        assert_eq!(sanitize_filename("my file.doc").unwrap(), "my file.doc");
        assert_eq!(
            sanitize_filename("test<script>.txt").unwrap(),
            "test_script_.txt"
        );
        assert_eq!(sanitize_filename("测试.txt").unwrap(), "测试.txt");

        // Path traversal collapses to the basename
        assert_eq!(sanitize_filename("../../../etc/passwd").unwrap(), "passwd");

        // Backslash is not a separator on Unix; the whole name survives with
        // the backslashes replaced, confined to a single path segment
        assert_eq!(
            sanitize_filename("..\\..\\windows\\system32").unwrap(),
            ".._.._windows_system32"
        );

        // A trailing separator still yields the basename
        assert_eq!(sanitize_filename("dir/").unwrap(), "dir");

        // Nothing usable left
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("/").is_err());
    }

    #[test]
    fn test_sanitize_filename_length_limit() {
        let long = "a".repeat(300) + ".txt";
        let sanitized = sanitize_filename(&long).unwrap();
        assert_eq!(sanitized.len(), 255);
    }

    #[test]
    fn test_is_safe_path_segment() {
        assert!(is_safe_path_segment("vulns.txt"));
        assert!(is_safe_path_segment("juice_subs.txt"));

        assert!(!is_safe_path_segment(""));
        assert!(!is_safe_path_segment("."));
        assert!(!is_safe_path_segment(".."));
        assert!(!is_safe_path_segment("../etc/passwd"));
        assert!(!is_safe_path_segment("a/b.txt"));
        assert!(!is_safe_path_segment("a\\b.txt"));
    }
}
