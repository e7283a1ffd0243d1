//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::services::room_code;

/// Validates that a room code is exactly 6 characters from the unambiguous
/// code alphabet.
///
/// # Examples
///
/// ```ignore
/// validate_room_code("BRKT7Q") // Ok
/// validate_room_code("brkt7q") // Err - lowercase
/// validate_room_code("BRKT0Q") // Err - ambiguous symbol
/// ```
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != room_code::CODE_LENGTH {
        let mut err = ValidationError::new("room_code_length");
        err.message = Some(
            format!(
                "Room code must be exactly {} characters (got {})",
                room_code::CODE_LENGTH,
                code.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !room_code::is_valid_code(code) {
        let mut err = ValidationError::new("room_code_format");
        err.message =
            Some("Room code must only use digits 2-9 and uppercase letters except I and O".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_room_code_valid() {
        assert!(validate_room_code("BRKT7Q").is_ok());
        assert!(validate_room_code("222222").is_ok());
        assert!(validate_room_code("ZZZZZZ").is_ok());
    }

    #[test]
    fn test_validate_room_code_invalid_length() {
        assert!(validate_room_code("BRKT7").is_err()); // too short
        assert!(validate_room_code("BRKT7QX").is_err()); // too long
        assert!(validate_room_code("").is_err()); // empty
    }

    #[test]
    fn test_validate_room_code_invalid_format() {
        assert!(validate_room_code("brkt7q").is_err()); // lowercase
        assert!(validate_room_code("BRKT0Q").is_err()); // ambiguous zero
        assert!(validate_room_code("BRKT1Q").is_err()); // ambiguous one
        assert!(validate_room_code("BRK T7").is_err()); // space
    }
}
