use crate::domain::shared::BusinessRule;

// ============================================================================
// Restaurant Business Rules
// ============================================================================

/// Opening/closing hour check.
///
/// Broken when either hour falls outside `0..=24`, or when the opening hour
/// is earlier than the closing hour. Note the direction of the second
/// check: a 9-to-22 schedule is broken, 22-to-9 is not.
#[derive(Debug, Clone, Copy)]
pub struct OpeningAndClosingHoursAreValid {
    opening_hour: i32,
    closing_hour: i32,
}

impl OpeningAndClosingHoursAreValid {
    pub fn new(opening_hour: i32, closing_hour: i32) -> Self {
        Self {
            opening_hour,
            closing_hour,
        }
    }
}

impl BusinessRule for OpeningAndClosingHoursAreValid {
    fn is_broken(&self) -> bool {
        let in_range = |hour: i32| (0..=24).contains(&hour);

        !in_range(self.opening_hour)
            || !in_range(self.closing_hour)
            || self.opening_hour < self.closing_hour
    }

    fn message(&self) -> String {
        "opening and closing hours must be valid".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daytime_schedule_is_reported_broken() {
        assert!(OpeningAndClosingHoursAreValid::new(9, 22).is_broken());
    }

    #[test]
    fn test_opening_after_closing_passes() {
        assert!(!OpeningAndClosingHoursAreValid::new(22, 9).is_broken());
        assert!(!OpeningAndClosingHoursAreValid::new(12, 12).is_broken());
        assert!(!OpeningAndClosingHoursAreValid::new(24, 0).is_broken());
    }

    #[test]
    fn test_out_of_range_hours() {
        assert!(OpeningAndClosingHoursAreValid::new(-1, 0).is_broken());
        assert!(OpeningAndClosingHoursAreValid::new(25, 3).is_broken());
        assert!(OpeningAndClosingHoursAreValid::new(20, -3).is_broken());
        assert!(OpeningAndClosingHoursAreValid::new(30, 25).is_broken());
    }

    #[test]
    fn test_message() {
        let rule = OpeningAndClosingHoursAreValid::new(9, 22);
        assert_eq!(rule.message(), "opening and closing hours must be valid");
    }
}
