//! Employee badge numbers.
//!
//! Badges are printed with zero padding and sometimes a trailing `A`
//! ("0179A"), while the credentials table may hold "179". Both sides are
//! normalized before comparing.

use regex::Regex;
use std::sync::LazyLock;

static LEADING_ZEROS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0+").unwrap());
static TRAILING_A: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[Aa]$").unwrap());

/// Trim, strip leading zeros, then strip one trailing `A`/`a`.
pub fn normalize_badge(raw: &str) -> String {
    let trimmed = raw.trim();
    let no_zeros = LEADING_ZEROS.replace(trimmed, "");
    TRAILING_A.replace(&no_zeros, "").into_owned()
}

/// True when both badges designate the same employee.
pub fn same_badge(a: &str, b: &str) -> bool {
    normalize_badge(a) == normalize_badge(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_and_suffixed_badges_normalize_alike() {
        for raw in ["0179A", "179", "0179a", "179A", "  00179  "] {
            assert_eq!(normalize_badge(raw), "179", "input {raw:?}");
        }
    }

    #[test]
    fn only_one_trailing_suffix_is_removed() {
        assert_eq!(normalize_badge("12AA"), "12A");
    }

    #[test]
    fn inner_zeros_are_kept() {
        assert_eq!(normalize_badge("01050"), "1050");
        assert!(same_badge("001050A", "1050"));
        assert!(!same_badge("105", "1050"));
    }
}
