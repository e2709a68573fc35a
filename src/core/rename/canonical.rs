//! Rules for names that are already in final numeric form.

use crate::core::scanner::ImageFile;

/// Longest all-digit base name that counts as already renamed.
pub const MAX_CANONICAL_DIGITS: usize = 6;

/// Numeric base names at or above this value never seed the counter.
pub const SEED_LIMIT: u64 = 1_000_000;

fn is_all_digits(base: &str) -> bool {
    !base.is_empty() && base.bytes().all(|b| b.is_ascii_digit())
}

/// A base name of at most six ASCII digits.
///
/// `0000007` is seven characters long and therefore not canonical, even
/// though its value is small.
pub fn is_canonical(base: &str) -> bool {
    is_all_digits(base) && base.len() <= MAX_CANONICAL_DIGITS
}

/// The value an all-digit base name contributes to the counter seed.
///
/// Names that overflow or reach [`SEED_LIMIT`] contribute nothing.
pub fn seed_value(base: &str) -> Option<u64> {
    if !is_all_digits(base) {
        return None;
    }
    base.parse::<u64>().ok().filter(|n| *n < SEED_LIMIT)
}

/// Largest seed value among the images, or `0` when there is none.
pub fn max_num(images: &[ImageFile]) -> u64 {
    images
        .iter()
        .filter_map(|image| seed_value(&image.base_name))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn image(name: &str) -> ImageFile {
        ImageFile::from_path(Path::new(name)).unwrap()
    }

    #[test]
    fn short_digit_names_are_canonical() {
        assert!(is_canonical("1"));
        assert!(is_canonical("42"));
        assert!(is_canonical("999999"));
        assert!(is_canonical("000123"));
    }

    #[test]
    fn long_or_mixed_names_are_not_canonical() {
        assert!(!is_canonical("1234567"));
        assert!(!is_canonical("0000007"));
        assert!(!is_canonical("IMG_0001"));
        assert!(!is_canonical("12a"));
        assert!(!is_canonical(""));
        assert!(!is_canonical("-5"));
    }

    #[test]
    fn non_ascii_digits_are_not_canonical() {
        assert!(!is_canonical("١٢٣"));
        assert_eq!(seed_value("١٢٣"), None);
    }

    #[test]
    fn seed_value_respects_limit() {
        assert_eq!(seed_value("10"), Some(10));
        assert_eq!(seed_value("999999"), Some(999_999));
        assert_eq!(seed_value("1000000"), None);
        assert_eq!(seed_value("1234567"), None);
        assert_eq!(seed_value("99999999999999999999999"), None);
    }

    #[test]
    fn leading_zero_name_seeds_by_value() {
        assert_eq!(seed_value("0000007"), Some(7));
    }

    #[test]
    fn max_num_ignores_non_numeric_and_large_names() {
        let images = vec![image("3.jpg"), image("10.png"), image("abc.png"), image("1234567.png")];
        assert_eq!(max_num(&images), 10);
    }

    #[test]
    fn max_num_is_zero_without_numeric_names() {
        let images = vec![image("abc.png"), image("cover.jpg")];
        assert_eq!(max_num(&images), 0);
        assert_eq!(max_num(&[]), 0);
    }
}
