//! Textual search-path manipulation.
//!
//! Entries are compared case-insensitively after stripping trailing
//! separators, so `C:\Tools\`, `c:\tools` and `C:\TOOLS` are the same entry.
//! Values are edited textually so an unchanged entry list round-trips
//! byte-for-byte.

use crate::shell::PATH_SEPARATOR;

/// Split a search-path value into its non-empty entries.
pub fn split_entries(value: &str) -> Vec<&str> {
    value
        .split(PATH_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Canonical comparison form of an entry.
pub fn normalize_entry(entry: &str) -> String {
    let trimmed = entry.trim().trim_end_matches(['/', '\\']);
    // A bare root ("/" or "C:\") trims to nothing or a drive letter; keep the root.
    let kept = if trimmed.is_empty() { entry.trim() } else { trimmed };
    kept.to_lowercase()
}

/// Whether `value` already lists `dir`.
pub fn contains_entry(value: &str, dir: &str) -> bool {
    let wanted = normalize_entry(dir);
    split_entries(value)
        .into_iter()
        .any(|entry| normalize_entry(entry) == wanted)
}

/// Append `dir` to `value` unless it is already present.
///
/// Returns the value unchanged when the entry exists.
pub fn append_entry(value: &str, dir: &str) -> String {
    if contains_entry(value, dir) {
        return value.to_string();
    }
    if value.trim().is_empty() {
        dir.to_string()
    } else if value.ends_with(PATH_SEPARATOR) {
        format!("{}{}", value, dir)
    } else {
        format!("{}{}{}", value, PATH_SEPARATOR, dir)
    }
}

/// Move `dir` to the front of `value`, dropping any later occurrence.
pub fn promote_entry(value: &str, dir: &str) -> String {
    let wanted = normalize_entry(dir);
    let rest: Vec<&str> = split_entries(value)
        .into_iter()
        .filter(|entry| normalize_entry(entry) != wanted)
        .collect();
    if rest.is_empty() {
        dir.to_string()
    } else {
        format!("{}{}{}", dir, PATH_SEPARATOR, rest.join(&PATH_SEPARATOR.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(parts: &[&str]) -> String {
        parts.join(&PATH_SEPARATOR.to_string())
    }

    #[test]
    fn split_skips_empty_segments() {
        let value = format!("{}{}{}", "/a", PATH_SEPARATOR.to_string().repeat(2), "/b");
        assert_eq!(split_entries(&value), vec!["/a", "/b"]);
    }

    #[test]
    fn normalize_ignores_case_and_trailing_separators() {
        assert_eq!(normalize_entry("C:\\Program Files\\PuTTY\\"), "c:\\program files\\putty");
        assert_eq!(normalize_entry("/opt/Tool/"), "/opt/tool");
        assert_eq!(normalize_entry("/"), "/");
    }

    #[test]
    fn contains_matches_case_variants() {
        let value = join(&["/usr/bin", "/Opt/PuTTY/"]);
        assert!(contains_entry(&value, "/opt/putty"));
        assert!(contains_entry(&value, "/OPT/PUTTY"));
        assert!(!contains_entry(&value, "/opt/putty/bin"));
    }

    #[test]
    fn contains_is_exact_segment_not_substring() {
        let value = join(&["/opt/putty-old"]);
        assert!(!contains_entry(&value, "/opt/putty"));
    }

    #[test]
    fn append_leaves_existing_value_untouched() {
        let value = join(&["/usr/bin", "/OPT/PUTTY"]);
        assert_eq!(append_entry(&value, "/opt/putty/"), value);
    }

    #[test]
    fn append_adds_once() {
        let value = join(&["/usr/bin"]);
        let once = append_entry(&value, "/opt/putty");
        assert_eq!(once, join(&["/usr/bin", "/opt/putty"]));
        assert_eq!(append_entry(&once, "/opt/putty"), once);
    }

    #[test]
    fn append_to_empty_and_trailing_separator() {
        assert_eq!(append_entry("", "/opt/x"), "/opt/x");
        let trailing = format!("/usr/bin{}", PATH_SEPARATOR);
        assert_eq!(append_entry(&trailing, "/opt/x"), join(&["/usr/bin", "/opt/x"]));
    }

    #[test]
    fn promote_moves_existing_entry_to_front() {
        let value = join(&["/usr/bin", "/env/bin", "/bin"]);
        assert_eq!(
            promote_entry(&value, "/env/bin"),
            join(&["/env/bin", "/usr/bin", "/bin"])
        );
    }

    #[test]
    fn promote_into_empty_value() {
        assert_eq!(promote_entry("", "/env/bin"), "/env/bin");
    }
}
