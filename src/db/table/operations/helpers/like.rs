use regex::RegexBuilder;

use crate::error::{DbError, Result};

pub const DEFAULT_ESCAPE: char = '\\';

/// Translates a LIKE pattern into an anchored regex.
pub fn like_to_regex(pattern: &str, escape: char) -> String {
    let mut regex = String::from("^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == escape {
            match chars.next() {
                Some(next) => regex.push_str(&regex::escape(&next.to_string())),
                None => regex.push_str(&regex::escape(&c.to_string())),
            }
            continue;
        }
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            _ => regex.push_str(&regex::escape(&c.to_string())),
        }
    }
    regex.push('$');
    regex
}

/// Case-insensitive LIKE match.
pub fn like_matches(value: &str, pattern: &str, escape: Option<char>) -> Result<bool> {
    let regex = RegexBuilder::new(&like_to_regex(pattern, escape.unwrap_or(DEFAULT_ESCAPE)))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|error| DbError::Syntax(format!("Invalid LIKE pattern '{}': {}", pattern, error)))?;
    Ok(regex.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_matches_any_run() {
        assert!(like_matches("Alice", "A%", None).unwrap());
        assert!(like_matches("alice", "A%", None).unwrap());
        assert!(like_matches("A", "A%", None).unwrap());
        assert!(!like_matches("Bob", "A%", None).unwrap());
    }

    #[test]
    fn underscore_matches_exactly_one_char() {
        assert!(like_matches("cat", "c_t", None).unwrap());
        assert!(!like_matches("cart", "c_t", None).unwrap());
        assert!(!like_matches("ct", "c_t", None).unwrap());
    }

    #[test]
    fn pattern_is_fully_anchored() {
        assert!(!like_matches("xAlice", "A%", None).unwrap());
        assert!(!like_matches("Bob!", "Bob", None).unwrap());
    }

    #[test]
    fn escape_character_makes_wildcards_literal() {
        assert!(like_matches("50%", "50\\%", None).unwrap());
        assert!(!like_matches("500", "50\\%", None).unwrap());
        assert!(like_matches("a_b", "a!_b", Some('!')).unwrap());
        assert!(!like_matches("axb", "a!_b", Some('!')).unwrap());
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(like_matches("a.c", "a.c", None).unwrap());
        assert!(!like_matches("abc", "a.c", None).unwrap());
        assert!(like_matches("(x)", "(%)", None).unwrap());
    }
}
