// src/common/identifiers.rs

use uuid::Uuid;

const WR_PREFIX: &str = "WR-";
const WO_PREFIX: &str = "WO-";

/// `WR-` followed by 6 uppercase hex chars taken from a v4 UUID.
pub fn new_wr_number() -> String {
    format!("{}{}", WR_PREFIX, random_hex(6))
}

/// `WO-` followed by 8 uppercase hex chars.
pub fn new_wo_number() -> String {
    format!("{}{}", WO_PREFIX, random_hex(8))
}

fn random_hex(len: usize) -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(len);
    hex.to_ascii_uppercase()
}

/// Legacy orders carry 6 hex chars, current ones 8.
pub fn is_wo_number(value: &str) -> bool {
    matches_pattern(value, WO_PREFIX, &[6, 8])
}

fn matches_pattern(value: &str, prefix: &str, lengths: &[usize]) -> bool {
    match value.strip_prefix(prefix) {
        Some(rest) => {
            lengths.contains(&rest.len())
                && rest
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_wr_number(value: &str) -> bool {
        matches_pattern(value, WR_PREFIX, &[6])
    }

    #[test]
    fn wr_numbers_follow_the_public_format() {
        for _ in 0..200 {
            let n = new_wr_number();
            assert!(is_wr_number(&n), "bad wr_number {n}");
            assert_eq!(n.len(), 9);
        }
    }

    #[test]
    fn wo_numbers_use_eight_hex_chars() {
        let n = new_wo_number();
        assert!(is_wo_number(&n));
        assert_eq!(n.len(), 11);
    }

    #[test]
    fn legacy_six_char_wo_numbers_are_accepted() {
        assert!(is_wo_number("WO-1A2B3C"));
        assert!(!is_wo_number("WO-1a2b3c"));
        assert!(!is_wo_number("WO-1A2B3C4"));
        assert!(!is_wr_number("WO-1A2B3C"));
    }

    #[test]
    fn generated_numbers_do_not_repeat_in_practice() {
        let seen: HashSet<String> = (0..1000).map(|_| new_wr_number()).collect();
        // 16^6 space; a handful of collisions would still be caught by the UNIQUE index
        assert!(seen.len() > 990);
    }
}
