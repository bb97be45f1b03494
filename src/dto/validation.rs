//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_LABEL_LEN: usize = 64;

/// Validates that a mode or item name is non-blank and reasonably short.
///
/// # Examples
///
/// ```ignore
/// validate_label("Auto")   // Ok
/// validate_label("   ")    // Err - blank
/// ```
pub fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.trim().is_empty() {
        let mut err = ValidationError::new("label_blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }

    if label.chars().count() > MAX_LABEL_LEN {
        let mut err = ValidationError::new("label_length");
        err.message = Some(
            format!("Name must be at most {MAX_LABEL_LEN} characters (got {})", label.chars().count())
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_label_valid() {
        assert!(validate_label("Auto").is_ok());
        assert!(validate_label("Coral L4").is_ok());
    }

    #[test]
    fn test_validate_label_blank() {
        assert!(validate_label("").is_err());
        assert!(validate_label("  \t").is_err());
    }

    #[test]
    fn test_validate_label_too_long() {
        assert!(validate_label(&"x".repeat(65)).is_err());
        assert!(validate_label(&"x".repeat(64)).is_ok());
    }
}
