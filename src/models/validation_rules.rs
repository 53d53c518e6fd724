use std::borrow::Cow;

use validator::ValidationError;

pub fn validate_positive(val: f64) -> Result<(), ValidationError> {
    if val.is_finite() && val > 0f64 {
        Ok(())
    } else {
        let mut error = ValidationError::new("value");
        error.message = Some(Cow::from("Value must be positive."));
        Err(error)
    }
}

pub fn validate_range_u64(val: u64, min: u64, max: u64) -> Result<(), ValidationError> {
    if val >= min && val <= max {
        Ok(())
    } else {
        let mut error = ValidationError::new("range");
        error.message = Some(Cow::from(format!("Value must lie within [{}, {}].", min, max)));
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(100.0).is_ok());
        assert!(validate_positive(0.0).is_err());
        assert!(validate_positive(-1.0).is_err());
        assert!(validate_positive(::std::f64::NAN).is_err());
    }

    #[test]
    fn test_validate_range_u64() {
        assert!(validate_range_u64(100, 1, 10_000).is_ok());
        assert!(validate_range_u64(0, 1, 10_000).is_err());
    }
}
