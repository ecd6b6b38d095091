//! Heart-rate readings as delivered by the API.

use alloc::string::String;

/// A heart-rate reading in beats per minute, as supplied by the API.
///
/// The stored value is untrusted: depending on how the assessment was
/// submitted it may be a JSON number, a numeric string, or something else
/// entirely. Use [`HeartRate::bpm`] to obtain a usable value.
#[derive(Debug, Clone, PartialEq)]
pub enum HeartRate {
    /// A JSON number.
    Number(f64),
    /// A string that may or may not contain a number.
    Text(String),
    /// Any other JSON value (boolean, array, object).
    Invalid,
}

impl HeartRate {
    /// The reading as a finite number of beats per minute.
    ///
    /// Numeric strings are trimmed and parsed. NaN, infinities, empty strings
    /// and non-numeric values all yield `None`.
    pub fn bpm(&self) -> Option<f64> {
        let value = match self {
            HeartRate::Number(n) => *n,
            HeartRate::Text(s) => s.trim().parse::<f64>().ok()?,
            HeartRate::Invalid => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Returns true if [`bpm`](Self::bpm) would yield a value.
    pub fn is_valid(&self) -> bool {
        self.bpm().is_some()
    }
}

impl From<f64> for HeartRate {
    fn from(value: f64) -> Self {
        HeartRate::Number(value)
    }
}

impl From<u32> for HeartRate {
    fn from(value: u32) -> Self {
        HeartRate::Number(value as f64)
    }
}

impl From<&str> for HeartRate {
    fn from(value: &str) -> Self {
        HeartRate::Text(value.into())
    }
}

impl From<String> for HeartRate {
    fn from(value: String) -> Self {
        HeartRate::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_valid() {
        assert_eq!(HeartRate::Number(72.0).bpm(), Some(72.0));
        assert_eq!(HeartRate::from(64u32).bpm(), Some(64.0));
    }

    #[test]
    fn numeric_strings_are_parsed() {
        assert_eq!(HeartRate::from("88").bpm(), Some(88.0));
        assert_eq!(HeartRate::from(" 71.5 ").bpm(), Some(71.5));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(HeartRate::from("fast").bpm(), None);
        assert_eq!(HeartRate::from("").bpm(), None);
        assert_eq!(HeartRate::Invalid.bpm(), None);
    }

    #[test]
    fn non_finite_is_rejected() {
        assert_eq!(HeartRate::Number(f64::NAN).bpm(), None);
        assert_eq!(HeartRate::Number(f64::INFINITY).bpm(), None);
        assert_eq!(HeartRate::from("inf").bpm(), None);
        assert!(!HeartRate::from("NaN").is_valid());
    }
}
