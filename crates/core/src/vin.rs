//! Vehicle identification number normalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// 17 characters, digits and capitals except I, O and Q.
const VIN_PATTERN: &str = r"^[A-HJ-NPR-Z0-9]{17}$";

static VIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(VIN_PATTERN).expect("valid regex"));

/// Trim and upper-case a VIN, then check its shape.
pub fn normalize_vin(raw: &str) -> Result<String, CoreError> {
    let vin = raw.trim().to_ascii_uppercase();
    if VIN_RE.is_match(&vin) {
        Ok(vin)
    } else {
        Err(CoreError::Validation(format!(
            "Invalid VIN '{}': expected 17 characters from A-Z (excluding I, O, Q) and 0-9",
            raw.trim()
        )))
    }
}

/// Normalize an optional VIN; blank strings count as absent.
pub fn normalize_optional_vin(raw: Option<&str>) -> Result<Option<String>, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => normalize_vin(v).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn accepts_and_uppercases_valid_vin() {
        assert_eq!(
            normalize_vin(" jn1tcat32u0123456 ").unwrap(),
            "JN1TCAT32U0123456"
        );
    }

    #[test]
    fn rejects_wrong_length_and_forbidden_letters() {
        assert_matches!(normalize_vin("ABC123"), Err(CoreError::Validation(_)));
        assert_matches!(
            normalize_vin("JN1TCAT32U012345O"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            normalize_vin("JN1TCAT32U0123456Z"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn blank_optional_vin_is_absent() {
        assert_eq!(normalize_optional_vin(None).unwrap(), None);
        assert_eq!(normalize_optional_vin(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_optional_vin(Some("JN1TCAT32U0123456")).unwrap().as_deref(),
            Some("JN1TCAT32U0123456")
        );
    }
}
