use crate::error::{ReportError, Result};

/// Location string for a coordinate pair, five decimals each.
pub fn format_coordinates(latitude: f64, longitude: f64) -> Result<String> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ReportError::validation(format!("latitude out of range: {}", latitude)));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ReportError::validation(format!("longitude out of range: {}", longitude)));
    }
    Ok(format!("{:.5}, {:.5}", latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coordinates() {
        assert_eq!(format_coordinates(52.52, 13.405).unwrap(), "52.52000, 13.40500");
        assert_eq!(format_coordinates(-33.8688197, 151.2092955).unwrap(), "-33.86882, 151.20930");
        assert_eq!(format_coordinates(90.0, -180.0).unwrap(), "90.00000, -180.00000");
    }

    #[test]
    fn test_format_coordinates_out_of_range() {
        assert!(matches!(format_coordinates(91.0, 0.0), Err(ReportError::Validation(_))));
        assert!(matches!(format_coordinates(0.0, 180.5), Err(ReportError::Validation(_))));
        assert!(format_coordinates(f64::NAN, 0.0).is_err());
        assert!(format_coordinates(0.0, f64::INFINITY).is_err());
    }
}
