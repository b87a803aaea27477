use sha2::{Digest, Sha256};

/// Deterministic store filename for a query label: `{sanitized_label}--{short_hash(label)}.csv`.
///
/// Distinct labels that sanitise alike still get distinct files.
pub fn store_filename(label: &str) -> String {
    let sanitized = sanitize_label(label);
    let hash = short_hash(label);
    format!("{sanitized}--{hash}.csv")
}

fn sanitize_label(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| if is_forbidden(c) || c.is_whitespace() { '_' } else { c })
        .collect();
    let cleaned = replaced.trim_matches(&['_', '.', '@'][..]);
    if cleaned.is_empty() {
        return "query".to_string();
    }

    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let mut name: String = compacted.chars().take(60).collect();
    if is_reserved_windows_name(&name) {
        name.push('_');
    }
    name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    use std::fmt::Write;

    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_and_separators_become_single_underscores() {
        let name = store_filename("funny  cats/dogs");
        assert!(name.starts_with("funny_cats_dogs--"), "{name}");
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn channel_label_drops_leading_at() {
        assert!(store_filename("@some.user").starts_with("some.user--"));
    }

    #[test]
    fn labels_that_sanitise_alike_get_distinct_names() {
        assert_ne!(store_filename("a/b"), store_filename("a:b"));
    }

    #[test]
    fn empty_label_falls_back() {
        assert!(store_filename("???").starts_with("query--"));
    }

    #[test]
    fn reserved_names_are_suffixed() {
        assert!(store_filename("con").starts_with("con_--"));
    }
}
