//! Local file names for downloaded URLs.

/// Used when the URL has no usable last segment.
pub const FALLBACK_NAME: &str = "download.zip";

/// Take the final path segment of a URL as a file name.
///
/// Query string and fragment are ignored, as is the authority of a URL that
/// has no path at all.
///
/// # Example
/// ```ignore
/// assert_eq!(file_name_from_url("https://zips.put.io/zipstream/42.zip?token=x"), "42.zip");
/// assert_eq!(file_name_from_url("http://127.0.0.1:8080"), "download.zip");
/// ```
pub fn file_name_from_url(url: &str) -> String {
    let clean = url.split(['?', '#']).next().unwrap_or(url);
    let path = match clean.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or(""),
        None => clean,
    };

    path.rsplit('/')
        .next()
        .map(sanitize_filename)
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Sanitize a filename for safe filesystem use.
///
/// Replaces problematic characters and handles special names.
pub fn sanitize_filename(name: &str) -> String {
    if name.is_empty() || name == "." || name == ".." {
        return FALLBACK_NAME.to_string();
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim().trim_matches('.');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_segment() {
        assert_eq!(
            file_name_from_url("https://zips.put.io/zipstream/123456.zip"),
            "123456.zip"
        );
    }

    #[test]
    fn test_strips_query_and_fragment() {
        assert_eq!(
            file_name_from_url("https://zips.put.io/zipstream/42.zip?oauth_token=abc#frag"),
            "42.zip"
        );
    }

    #[test]
    fn test_no_path_falls_back() {
        assert_eq!(file_name_from_url("http://127.0.0.1:8080"), FALLBACK_NAME);
        assert_eq!(file_name_from_url("http://127.0.0.1:8080/"), FALLBACK_NAME);
    }

    #[test]
    fn test_dot_segments_fall_back() {
        assert_eq!(file_name_from_url("https://host/a/.."), FALLBACK_NAME);
        assert_eq!(file_name_from_url("https://host/a/."), FALLBACK_NAME);
    }

    #[test]
    fn test_sanitize_replaces_hostile_characters() {
        assert_eq!(sanitize_filename("a:b*c.zip"), "a_b_c.zip");
        assert_eq!(sanitize_filename("  ..hidden.zip.. "), "hidden.zip");
    }
}
