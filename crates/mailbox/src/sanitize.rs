// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mailbox message name sanitization.

const MAX_LEN: usize = 50;

/// Replaces `/\:*?"<>|` and any whitespace with `-`, strips leading/trailing
/// `-` and `.`, truncates to 50 chars, and falls back to `message` if the
/// result is empty. The caller appends the `.md` extension separately.
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\n' | '\r' => '-',
            c if c.is_whitespace() => '-',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim_matches(|c| c == '-' || c == '.');
    let truncated = if trimmed.len() > MAX_LEN {
        &trimmed[..MAX_LEN]
    } else {
        trimmed
    };
    let truncated = truncated.trim_matches(|c| c == '-' || c == '.');
    if truncated.is_empty() {
        "message".to_string()
    } else {
        truncated.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_forbidden_characters() {
        assert_eq!(sanitize_name("a/b\\c:d*e?f\"g<h>i|j"), "a-b-c-d-e-f-g-h-i-j");
    }

    #[test]
    fn replaces_whitespace() {
        assert_eq!(sanitize_name("hello world\tthere\n"), "hello-world-there");
    }

    #[test]
    fn strips_leading_and_trailing_dashes_and_dots() {
        assert_eq!(sanitize_name("--.foo.bar.--"), "foo.bar");
    }

    #[test]
    fn truncates_to_fifty_chars() {
        let long = "a".repeat(80);
        assert_eq!(sanitize_name(&long).len(), MAX_LEN);
    }

    #[test]
    fn falls_back_to_message_when_empty() {
        assert_eq!(sanitize_name(""), "message");
        assert_eq!(sanitize_name("---"), "message");
        assert_eq!(sanitize_name("   "), "message");
    }
}
