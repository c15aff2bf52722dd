//! Validation utilities for GreenFund request payloads

use rust_decimal::Decimal;

/// Minimum password length for new and changed passwords
pub const MIN_PASSWORD_LENGTH: usize = 8;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || domain.contains('@') {
        return Err("Invalid email format");
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

// ============================================================================
// Farm Validations
// ============================================================================

pub fn validate_farm_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Farm name cannot be empty");
    }
    if name.chars().count() > 100 {
        return Err("Farm name must be at most 100 characters");
    }
    Ok(())
}

/// Validate latitude and longitude are within WGS84 bounds
pub fn validate_coordinates(latitude: Decimal, longitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

pub fn validate_farm_size(size_acres: Decimal) -> Result<(), &'static str> {
    if size_acres <= Decimal::ZERO {
        return Err("Farm size must be greater than zero");
    }
    Ok(())
}

// ============================================================================
// Activity and Soil Validations
// ============================================================================

pub fn validate_activity_type(activity_type: &str) -> Result<(), &'static str> {
    if activity_type.trim().is_empty() {
        return Err("Activity type cannot be empty");
    }
    Ok(())
}

/// Validate soil pH is on the 0-14 scale
pub fn validate_soil_ph(ph: Decimal) -> Result<(), &'static str> {
    if ph < Decimal::ZERO || ph > Decimal::from(14) {
        return Err("Soil pH must be between 0 and 14");
    }
    Ok(())
}

/// Validate a nutrient (ppm) or moisture (%) reading
pub fn validate_soil_measurement(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("Soil measurements cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("farmer@example.com").is_ok());
        assert!(validate_email("jane.wanjiru@greenfund.co.ke").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b@example.com").is_err());
        assert!(validate_email("user@example.").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(Decimal::new(-1286, 3), Decimal::new(36817, 3)).is_ok());
        assert!(validate_coordinates(Decimal::from(91), Decimal::ZERO).is_err());
        assert!(validate_coordinates(Decimal::ZERO, Decimal::from(-181)).is_err());
    }

    #[test]
    fn test_validate_farm_fields() {
        assert!(validate_farm_name("Shamba Kubwa").is_ok());
        assert!(validate_farm_name("   ").is_err());
        assert!(validate_farm_size(Decimal::new(25, 1)).is_ok());
        assert!(validate_farm_size(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_soil_validations() {
        assert!(validate_soil_ph(Decimal::new(65, 1)).is_ok());
        assert!(validate_soil_ph(Decimal::from(15)).is_err());
        assert!(validate_soil_measurement(Decimal::ZERO).is_ok());
        assert!(validate_soil_measurement(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_activity_type() {
        assert!(validate_activity_type("Planting").is_ok());
        assert!(validate_activity_type("").is_err());
    }
}
