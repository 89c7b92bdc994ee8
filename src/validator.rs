// 🔎 Code Validator - pure checks on SWIFT/BIC code shape
//
// Two acceptance patterns exist and stay separate:
// - lookup/delete: grouped pattern (institution and country letters only)
// - creation: flat pattern (any 11 uppercase letters or digits)
//
// None of these functions fail; callers decide how to surface invalidity.

use regex::Regex;
use std::sync::OnceLock;

/// Length of a storable code
pub const CODE_LENGTH: usize = 11;

/// Length of the institution + country + location prefix
pub const BASE_CODE_LENGTH: usize = 8;

/// Branch suffix marking a headquarter
pub const HEADQUARTER_SUFFIX: &str = "XXX";

fn grouped_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z]{4}[A-Z]{2}[A-Z0-9]{2}([A-Z0-9]{3})?$").expect("valid grouped pattern")
    })
}

fn flat_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9]{11}$").expect("valid flat pattern"))
}

/// Upper-case a code without trimming or otherwise changing its length.
pub fn normalize(code: &str) -> String {
    code.to_uppercase()
}

/// Number of characters (not bytes) in `code`.
pub fn code_length(code: &str) -> usize {
    code.chars().count()
}

/// Grouped-letter check used by lookup and delete.
pub fn is_structurally_valid(code: &str) -> bool {
    code_length(code) == CODE_LENGTH && grouped_pattern().is_match(code)
}

/// Flat alphanumeric check used by creation.
pub fn is_simple_alnum11(code: &str) -> bool {
    code_length(code) == CODE_LENGTH && flat_pattern().is_match(code)
}

/// True iff the code's last three characters are `XXX` (case-insensitive).
pub fn derived_is_headquarter(code: &str) -> bool {
    normalize(code).ends_with(HEADQUARTER_SUFFIX)
}

/// First 8 characters of an 11-character code, shared by a headquarter and its branches.
pub fn base_code(code: &str) -> Option<&str> {
    if code_length(code) != CODE_LENGTH {
        return None;
    }
    code.get(..BASE_CODE_LENGTH)
}
