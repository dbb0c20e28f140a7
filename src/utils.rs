//! Utility helpers for RustyPlayer

/// Format a position in seconds as zero-padded `mm:ss`.
///
/// Missing, NaN, infinite and negative inputs render as `00:00`. Minutes
/// are never rolled into hours, so 3661 seconds is `61:01`.
pub fn format_time(seconds: impl Into<Option<f64>>) -> String {
    let seconds = match seconds.into() {
        Some(value) if value.is_finite() && value >= 0.0 => value,
        _ => return "00:00".to_string(),
    };

    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{:02}:{:02}", minutes, secs)
}

/// Replace non-finite and negative values with zero.
pub fn non_negative_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn format_time_known_values() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(59.0), "00:59");
        assert_eq!(format_time(60.0), "01:00");
        assert_eq!(format_time(185.4), "03:05");
        assert_eq!(format_time(3661.0), "61:01");
    }

    #[test]
    fn format_time_degrades_to_zero() {
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(None::<f64>), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
        assert_eq!(format_time(-3.0), "00:00");
    }

    #[test]
    fn non_negative_or_zero_filters_bad_input() {
        assert_eq!(non_negative_or_zero(12.5), 12.5);
        assert_eq!(non_negative_or_zero(-1.0), 0.0);
        assert_eq!(non_negative_or_zero(f64::NAN), 0.0);
        assert_eq!(non_negative_or_zero(f64::NEG_INFINITY), 0.0);
    }

    proptest! {
        #[test]
        fn format_time_is_always_padded(seconds in 0.0f64..360_000.0) {
            let text = format_time(seconds);
            let (minutes, secs) = text.split_once(':').unwrap();
            prop_assert!(minutes.len() >= 2);
            prop_assert_eq!(secs.len(), 2);
            prop_assert!(secs.parse::<u32>().unwrap() < 60);
            prop_assert_eq!(minutes.parse::<u64>().unwrap(), (seconds / 60.0).floor() as u64);
        }
    }
}
