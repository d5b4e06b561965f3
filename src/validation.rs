//! Resource invariants checked before any write reaches the primary store.

use crate::error::ValidationError;

/// A required text field must contain something other than whitespace.
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingRequiredField(field))
    }
    else {
        Ok(value)
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    }
    else {
        Err(ValidationError::InvalidArea { field, value })
    }
}

/// Farm areas: every value is a non-negative number and `arable + vegetation <= total`.
pub fn check_areas(total: f64, arable: f64, vegetation: f64) -> Result<(), ValidationError> {
    non_negative("totalArea", total)?;
    non_negative("arableArea", arable)?;
    non_negative("vegetationArea", vegetation)?;

    if arable + vegetation > total {
        return Err(ValidationError::AreaInvariantViolated {
            total,
            arable,
            vegetation,
        });
    }

    Ok(())
}

/// Crop years are stored as four ASCII digits.
pub fn check_year(year: &str) -> Result<u16, ValidationError> {
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        year.parse::<u16>()
            .map_err(|_| ValidationError::InvalidYear(year.to_string()))
    }
    else {
        Err(ValidationError::InvalidYear(year.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_invariant() {
        assert!(check_areas(100.0, 60.0, 40.0).is_ok());
        assert!(check_areas(100.0, 0.0, 0.0).is_ok());
        assert_eq!(
            check_areas(100.0, 60.0, 50.0),
            Err(ValidationError::AreaInvariantViolated {
                total:      100.0,
                arable:     60.0,
                vegetation: 50.0,
            })
        );
        assert!(matches!(
            check_areas(100.0, -1.0, 0.0),
            Err(ValidationError::InvalidArea { field: "arableArea", .. })
        ));
        assert!(matches!(
            check_areas(f64::NAN, 0.0, 0.0),
            Err(ValidationError::InvalidArea { field: "totalArea", .. })
        ));
    }

    #[test]
    fn required_fields() {
        assert_eq!(require("name", "Soja").unwrap(), "Soja");
        assert_eq!(require("name", "  "), Err(ValidationError::MissingRequiredField("name")));
    }

    #[test]
    fn years() {
        assert_eq!(check_year("2024").unwrap(), 2024);
        assert!(check_year("24").is_err());
        assert!(check_year("20a4").is_err());
        assert!(check_year("+202").is_err());
    }
}
