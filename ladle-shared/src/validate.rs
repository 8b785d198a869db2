/// Input validation rules
///
/// Field-level validation that goes beyond what `validator` derive covers on
/// the request DTOs: the username policy, tag colors, embedded image
/// payloads, and the lenient list-limit parameter.
///
/// Limits that used to live in ambient settings (the reserved-username list,
/// the cooking-time ceiling) are carried in an explicit [`ValidationLimits`]
/// value that callers pass into the validation functions.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use std::sync::LazyLock;

/// Usernames: word characters plus `. @ + -`, nothing else.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("hardcoded pattern"));

/// Tag colors: `#` followed by exactly six hex digits.
static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("hardcoded pattern"));

/// Validation limits and reserved words
///
/// Passed explicitly into validation functions; the API server builds one
/// from its environment configuration.
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    /// Usernames that cannot be registered (route names, impersonation bait)
    pub reserved_usernames: Vec<String>,

    /// Inclusive cooking-time bounds, in minutes
    pub min_cooking_time: i32,
    pub max_cooking_time: i32,

    /// Inclusive per-line ingredient amount bounds
    pub min_ingredient_amount: i32,
    pub max_ingredient_amount: i32,

    /// Maximum field lengths
    pub max_username_length: usize,
    pub max_recipe_name_length: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            reserved_usernames: ["me", "admin", "administrator", "root", "support"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_cooking_time: 1,
            max_cooking_time: 1440,
            min_ingredient_amount: 1,
            max_ingredient_amount: 10_000,
            max_username_length: 150,
            max_recipe_name_length: 250,
        }
    }
}

/// Validates a username against the character-class pattern and the
/// reserved-word list
///
/// # Errors
///
/// Returns a description of the first rule violated.
pub fn validate_username(username: &str, limits: &ValidationLimits) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username must not be empty".to_string());
    }

    if username.chars().count() > limits.max_username_length {
        return Err(format!(
            "Username must be at most {} characters",
            limits.max_username_length
        ));
    }

    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username may only contain letters, digits and . @ + - characters".to_string(),
        );
    }

    if limits
        .reserved_usernames
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
    {
        return Err("This username is reserved".to_string());
    }

    Ok(())
}

/// Validates a tag color as a `#rrggbb` hex string
pub fn validate_hex_color(color: &str) -> Result<(), String> {
    if HEX_COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err("Color must be a hex color like #49B64E".to_string())
    }
}

/// Validates a cooking time against the configured bounds
pub fn validate_cooking_time(minutes: i32, limits: &ValidationLimits) -> Result<(), String> {
    if minutes < limits.min_cooking_time {
        return Err(format!(
            "Cooking time must be at least {} minute(s)",
            limits.min_cooking_time
        ));
    }
    if minutes > limits.max_cooking_time {
        return Err(format!(
            "Cooking time must be at most {} minutes",
            limits.max_cooking_time
        ));
    }
    Ok(())
}

/// Validates a per-line ingredient amount against the configured bounds
pub fn validate_ingredient_amount(amount: i32, limits: &ValidationLimits) -> Result<(), String> {
    if amount < limits.min_ingredient_amount || amount > limits.max_ingredient_amount {
        return Err(format!(
            "Amount must be between {} and {}",
            limits.min_ingredient_amount, limits.max_ingredient_amount
        ));
    }
    Ok(())
}

/// Decodes an embedded image payload into raw bytes
///
/// Accepts either a `data:<mime>;base64,<payload>` URI or a bare base64
/// string. An undecodable or empty payload is a validation error, not a
/// stored blob.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, String> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        Some(_) => return Err("Image payload has an invalid data URI prefix".to_string()),
        None => payload,
    };

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|_| "Image payload is not valid base64".to_string())?;

    if bytes.is_empty() {
        return Err("Image payload decoded to zero bytes".to_string());
    }

    Ok(bytes)
}

/// Parses a list-limit query parameter leniently
///
/// An absent, non-numeric, or negative value means "no limit" rather than a
/// failed request.
pub fn lenient_limit(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|limit| *limit >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_accepts_word_chars_and_punctuation() {
        let limits = ValidationLimits::default();
        for name in ["chef_anna", "anna.k", "anna+test", "a-b@c"] {
            assert!(validate_username(name, &limits).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_username_rejects_bad_characters() {
        let limits = ValidationLimits::default();
        for name in ["", "anna k", "anna!", "anna/k"] {
            assert!(validate_username(name, &limits).is_err(), "{name:?}");
        }
    }

    #[test]
    fn test_username_rejects_reserved_case_insensitively() {
        let limits = ValidationLimits::default();
        assert!(validate_username("me", &limits).is_err());
        assert!(validate_username("Admin", &limits).is_err());
        assert!(validate_username("mead", &limits).is_ok());
    }

    #[test]
    fn test_username_length_bound() {
        let limits = ValidationLimits::default();
        let long = "a".repeat(151);
        assert!(validate_username(&long, &limits).is_err());
        let ok = "a".repeat(150);
        assert!(validate_username(&ok, &limits).is_ok());
    }

    #[test]
    fn test_hex_color() {
        assert!(validate_hex_color("#49B64E").is_ok());
        assert!(validate_hex_color("#abcdef").is_ok());
        assert!(validate_hex_color("49B64E").is_err());
        assert!(validate_hex_color("#49B64").is_err());
        assert!(validate_hex_color("#49B64G").is_err());
        assert!(validate_hex_color("green").is_err());
    }

    #[test]
    fn test_cooking_time_boundaries() {
        let limits = ValidationLimits::default();
        assert!(validate_cooking_time(0, &limits).is_err());
        assert!(validate_cooking_time(1, &limits).is_ok());
        assert!(validate_cooking_time(1440, &limits).is_ok());
        assert!(validate_cooking_time(1441, &limits).is_err());
    }

    #[test]
    fn test_ingredient_amount_boundaries() {
        let limits = ValidationLimits::default();
        assert!(validate_ingredient_amount(0, &limits).is_err());
        assert!(validate_ingredient_amount(1, &limits).is_ok());
        assert!(validate_ingredient_amount(10_000, &limits).is_ok());
        assert!(validate_ingredient_amount(10_001, &limits).is_err());
    }

    #[test]
    fn test_decode_image_payload_data_uri() {
        let bytes = decode_image_payload("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_image_payload_bare_base64() {
        let bytes = decode_image_payload("aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_image_payload_rejects_garbage_and_empty() {
        assert!(decode_image_payload("not base64!!!").is_err());
        assert!(decode_image_payload("data:image/png;base64,").is_err());
        assert!(decode_image_payload("").is_err());
    }

    #[test]
    fn test_lenient_limit() {
        assert_eq!(lenient_limit(Some("3")), Some(3));
        assert_eq!(lenient_limit(Some(" 10 ")), Some(10));
        assert_eq!(lenient_limit(Some("abc")), None);
        assert_eq!(lenient_limit(Some("-1")), None);
        assert_eq!(lenient_limit(None), None);
    }
}
