//! Property tests for filename sanitizing.

use proptest::prelude::*;
use torrent_storage::{INVALID_NAME, MAX_NAME_BYTES, is_valid_name, sanitize_name};

proptest! {
    #[test]
    fn sanitize_is_idempotent(s in any::<String>()) {
        let once = sanitize_name(&s);
        prop_assert_eq!(sanitize_name(&once), once);
    }

    #[test]
    fn validity_matches_round_trip(s in any::<String>()) {
        prop_assert_eq!(is_valid_name(&s), sanitize_name(&s) == s);
    }

    #[test]
    fn sanitized_fits_byte_limit(s in ".{0,600}") {
        prop_assert!(sanitize_name(&s).len() <= MAX_NAME_BYTES);
    }

    #[test]
    fn wide_characters_fit_byte_limit(s in "[\u{4e00}-\u{9fff}\u{1f600}-\u{1f64f}]{60,200}") {
        let out = sanitize_name(&s);
        prop_assert!(out.len() <= MAX_NAME_BYTES);
        prop_assert!(is_valid_name(&out));
    }

    #[test]
    fn sanitized_has_no_reserved_chars(s in any::<String>()) {
        let out = sanitize_name(&s);
        prop_assert!(!out.chars().any(|c| c.is_control() && (c as u32) < 0x80));
        prop_assert!(!out.contains(['"', '*', '/', ':', '<', '>', '?', '\\', '|']));
    }
}

#[test]
fn special_names_map_to_sentinel() {
    for name in ["", ".", ".."] {
        assert_eq!(sanitize_name(name), INVALID_NAME);
        assert!(!is_valid_name(name));
    }
    assert!(is_valid_name(INVALID_NAME));
}
