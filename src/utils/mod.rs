//! Utility functions and helpers.

use std::sync::OnceLock;

use regex::Regex;

/// Split a string at whitespace, honoring double-quoted tokens.
///
/// A token wrapped in `"` may contain spaces; within a quoted token, a
/// literal double quote is escaped as two apostrophes (`''`). This is the
/// inverse of [`join_quoting`].
pub fn split_at_spaces(input: &str) -> Vec<String> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let token = TOKEN.get_or_init(|| {
        Regex::new(r#"([^"\s]\S*|".*?")\s*"#).unwrap_or_else(|e| panic!("token pattern: {e}"))
    });

    token
        .captures_iter(input)
        .map(|caps| {
            let raw = &caps[1];
            match raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
                Some(inner) => inner.replace("''", "\""),
                None => raw.to_string(),
            }
        })
        .collect()
}

/// Join tokens with spaces, quoting tokens that contain spaces or quotes.
pub fn join_quoting<'a>(tokens: impl IntoIterator<Item = &'a str>) -> String {
    let mut result = String::new();
    for token in tokens {
        if !result.is_empty() {
            result.push(' ');
        }
        if token.contains(' ') || token.contains('"') || token.is_empty() {
            result.push('"');
            result.push_str(&token.replace('"', "''"));
            result.push('"');
        } else {
            result.push_str(token);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_tokens() {
        assert_eq!(split_at_spaces("a bb  ccc"), vec!["a", "bb", "ccc"]);
        assert!(split_at_spaces("").is_empty());
        assert!(split_at_spaces("   ").is_empty());
    }

    #[test]
    fn test_split_quoted_tokens() {
        assert_eq!(
            split_at_spaces(r#"Morgen "Morgen Ausgabe" Abend"#),
            vec!["Morgen", "Morgen Ausgabe", "Abend"]
        );
    }

    #[test]
    fn test_split_unescapes_quotes() {
        assert_eq!(
            split_at_spaces(r#""The ''Daily'' Paper""#),
            vec![r#"The "Daily" Paper"#]
        );
    }

    #[test]
    fn test_join_round_trips() {
        let tokens = vec!["Morgen", "Morgen Ausgabe", r#"The "Daily" Paper"#];
        let joined = join_quoting(tokens.iter().copied());
        assert_eq!(
            joined,
            r#"Morgen "Morgen Ausgabe" "The ''Daily'' Paper""#
        );
        assert_eq!(split_at_spaces(&joined), tokens);
    }

    #[test]
    fn test_join_quotes_empty_token() {
        assert_eq!(join_quoting(["a", "", "b"]), r#"a "" b"#);
    }
}
