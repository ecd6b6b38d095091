//! Risk categories assigned by the remote risk model.

use core::fmt;

/// Cardiovascular risk category of an assessment.
///
/// The API stores the category as free-form text. Only the exact spellings
/// `"Low"`, `"Medium"` and `"High"` are recognised; anything else is treated
/// as unknown by [`RiskLevel::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// All categories, lowest first.
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    /// Parse the API's spelling of a risk category (case-sensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(RiskLevel::Low),
            "Medium" => Some(RiskLevel::Medium),
            "High" => Some(RiskLevel::High),
            _ => None,
        }
    }

    /// The API's spelling of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Ten-year coronary heart disease outlook shown alongside a result.
    pub fn ten_year_outlook(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low probability of developing heart disease in next 10 years",
            RiskLevel::Medium => {
                "Moderate probability of developing heart disease in next 10 years"
            }
            RiskLevel::High => "High probability of developing heart disease in next 10 years",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(RiskLevel::parse("High"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse("high"), None);
        assert_eq!(RiskLevel::parse("HIGH"), None);
        assert_eq!(RiskLevel::parse(" High"), None);
    }

    #[test]
    fn parse_round_trips_known_spellings() {
        for level in RiskLevel::ALL {
            assert_eq!(RiskLevel::parse(level.as_str()), Some(level));
        }
    }

    #[test]
    fn outlook_matches_category() {
        assert!(RiskLevel::Low.ten_year_outlook().starts_with("Low"));
        assert!(RiskLevel::Medium.ten_year_outlook().starts_with("Moderate"));
        assert!(RiskLevel::High.ten_year_outlook().starts_with("High"));
    }
}
