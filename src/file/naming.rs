//! Storage filename generation.

use std::path::Path;

use rand::Rng;

/// Generate a collision-resistant storage filename from an original
/// filename and a millisecond timestamp.
///
/// Format: `{millis}-{hex6}-{stem}{ext}`. The random component keeps two
/// uploads of the same name distinct even inside one millisecond.
pub fn storage_name(original_name: &str, timestamp_millis: i64) -> String {
    let path = Path::new(original_name);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("file");
    let stem = sanitize(stem);

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", sanitize(e)))
        .unwrap_or_default();

    let suffix: u32 = rand::rng().random_range(0..0x0100_0000);

    format!("{timestamp_millis}-{suffix:06x}-{stem}{ext}")
}

/// Replace any character the filesystem might interpret with `_`.
///
/// The sanitized stem only ever appears as the tail of a generated
/// filename, so the stored path cannot be influenced by the uploader.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_name_format() {
        let name = storage_name("report.pdf", 1700000000000);

        assert!(name.starts_with("1700000000000-"));
        assert!(name.ends_with("-report.pdf"));
    }

    #[test]
    fn test_storage_name_distinct_within_same_millisecond() {
        let a = storage_name("report.pdf", 1700000000000);
        let b = storage_name("report.pdf", 1700000000000);

        assert_ne!(a, b);
    }

    #[test]
    fn test_storage_name_no_extension() {
        let name = storage_name("README", 42);

        assert!(name.starts_with("42-"));
        assert!(name.ends_with("-README"));
        assert!(!name.contains("README."));
    }

    #[test]
    fn test_storage_name_empty_original() {
        let name = storage_name("", 42);

        assert!(name.ends_with("-file"));
    }

    #[test]
    fn test_storage_name_strips_directories() {
        let name = storage_name("../../etc/passwd", 42);

        assert!(!name.contains('/'));
        assert!(name.ends_with("-passwd"));
    }

    #[test]
    fn test_storage_name_sanitizes_stem() {
        let name = storage_name("my report (final).txt", 42);

        assert!(name.ends_with("-my_report__final_.txt"));
    }

    #[test]
    fn test_storage_name_unicode_stem() {
        let name = storage_name("日本語ファイル.txt", 42);

        assert!(name.ends_with(".txt"));
        assert!(!name.contains('日'));
    }

    #[test]
    fn test_storage_name_multiple_dots() {
        let name = storage_name("archive.tar.gz", 42);

        assert!(name.ends_with("-archive.tar.gz"));
    }
}
