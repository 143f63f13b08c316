//! Priority scoring for cases awaiting moderation.
//!
//! `priority = (age_hours + severity) * duplicates` rewards both staleness
//! and corroboration: a case that several independent reporters filed against
//! the same content outranks a lone report of the same age, and even a
//! zero-severity, unduplicated case eventually surfaces purely from age.

/// Compute a case's queue priority.
///
/// `duplicates` is the number of active awaiting-moderation cases sharing the
/// case's content reference (including the case itself) and is clamped to a
/// minimum of 1.
pub fn priority(age_hours: f64, severity: f64, duplicates: usize) -> f64 {
    (age_hours + severity) * duplicates.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_everything_is_zero() {
        assert_eq!(priority(0.0, 0.0, 0), 0.0);
    }

    #[test]
    fn test_age_alone_surfaces_a_case() {
        assert!(priority(5.0, 0.0, 1) > priority(1.0, 0.0, 1));
    }

    #[test]
    fn test_duplicates_clamped_to_one() {
        assert_eq!(priority(2.0, 0.5, 0), priority(2.0, 0.5, 1));
    }

    proptest! {
        #[test]
        fn prop_strictly_increasing_in_age(
            age in 0.0f64..10_000.0,
            extra in 0.001f64..100.0,
            severity in 0.0f64..=1.0,
            dup in 1usize..50,
        ) {
            prop_assert!(priority(age + extra, severity, dup) > priority(age, severity, dup));
        }

        #[test]
        fn prop_strictly_increasing_in_severity(
            age in 0.0f64..10_000.0,
            severity in 0.0f64..0.9,
            extra in 0.001f64..0.1,
            dup in 1usize..50,
        ) {
            prop_assert!(priority(age, severity + extra, dup) > priority(age, severity, dup));
        }

        #[test]
        fn prop_linear_in_duplicate_count(
            age in 0.0f64..10_000.0,
            severity in 0.0f64..=1.0,
            dup in 1usize..25,
            factor in 2usize..5,
        ) {
            let single = priority(age, severity, dup);
            let scaled = priority(age, severity, dup * factor);
            prop_assert!((scaled - single * factor as f64).abs() < 1e-9 * scaled.abs().max(1.0));
        }
    }
}
