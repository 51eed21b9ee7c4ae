//! Rules every roster write passes before touching the store.

use crate::error::RosterError;
use crate::model::Strength;
use strum::VariantNames;

pub const MIN_DESCRIPTION_CHARS: usize = 20;

/// Parses `value` as a [`Strength`]. Case-sensitive and untrimmed.
///
/// # Errors
/// [`RosterError::InvalidValue`] listing the accepted values.
pub fn validate_strength(value: &str) -> Result<Strength, RosterError> {
    value.parse::<Strength>().map_err(|_| {
        RosterError::invalid(format!("Strength must be one of: {}", Strength::VARIANTS.join(", ")))
    })
}

/// Accepts descriptions of at least [`MIN_DESCRIPTION_CHARS`] characters.
///
/// # Errors
/// [`RosterError::InvalidValue`] when empty or too short.
pub fn validate_description(value: &str) -> Result<&str, RosterError> {
    if value.is_empty() {
        return Err(RosterError::invalid("Description must be present"));
    }
    if value.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(RosterError::invalid(format!(
            "Description must be at least {MIN_DESCRIPTION_CHARS} characters long"
        )));
    }
    Ok(value)
}

/// Non-empty text rule for hero and power names.
///
/// # Errors
/// [`RosterError::InvalidValue`] naming `field` when `value` is blank.
pub fn validate_name<'a>(field: &'static str, value: &'a str) -> Result<&'a str, RosterError> {
    if value.trim().is_empty() {
        return Err(RosterError::invalid(format!("{field} must be present")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strength_accepts_exact_variants_only() {
        assert_eq!(validate_strength("Average").ok(), Some(Strength::Average));
        assert_eq!(validate_strength("Strong").ok(), Some(Strength::Strong));
        assert_eq!(validate_strength("Weak").ok(), Some(Strength::Weak));

        for bad in ["Invalid", "strong", " Weak", "Average ", ""] {
            let err = validate_strength(bad).unwrap_err();
            assert_eq!(err.to_string(), "Strength must be one of: Strong, Weak, Average");
        }
    }

    #[test]
    fn description_messages() {
        assert_eq!(validate_description("").unwrap_err().to_string(), "Description must be present");
        assert_eq!(
            validate_description("Too short").unwrap_err().to_string(),
            "Description must be at least 20 characters long"
        );
        assert!(validate_description("Updated description with more than twenty characters").is_ok());
    }

    #[test]
    fn description_counts_characters_not_bytes() {
        let nineteen = "é".repeat(19);
        assert!(validate_description(&nineteen).is_err());
        assert!(validate_description(&"é".repeat(20)).is_ok());
    }

    #[test]
    fn name_must_not_be_blank() {
        assert_eq!(validate_name("name", "Storm").ok(), Some("Storm"));
        assert_eq!(validate_name("super_name", "  ").unwrap_err().to_string(), "super_name must be present");
    }

    proptest! {
        #[test]
        fn short_descriptions_always_fail(value in "\\PC{0,19}") {
            prop_assert!(validate_description(&value).is_err());
        }

        #[test]
        fn long_descriptions_always_pass(value in "\\PC{20,80}") {
            prop_assert_eq!(validate_description(&value).ok(), Some(value.as_str()));
        }

        #[test]
        fn strength_outside_the_set_fails(value in "\\PC*") {
            let accepted = Strength::VARIANTS.contains(&value.as_str());
            prop_assert_eq!(validate_strength(&value).is_ok(), accepted);
        }
    }
}
