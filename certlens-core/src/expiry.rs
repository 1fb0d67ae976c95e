//! Remaining-validity arithmetic and status classification.

use chrono::{DateTime, Utc};

use crate::check::CheckStatus;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Outcome of evaluating a certificate's `notAfter` against a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryEvaluation {
    /// Never [`CheckStatus::Error`].
    pub status: CheckStatus,
    pub days_remaining: u32,
}

/// Classify a certificate expiring at `not_after` as seen at `now`.
///
/// A certificate whose `not_after` equals `now` is already expired. While
/// still valid, remaining days round up, so any positive remainder reports
/// at least one day.
pub fn evaluate(not_after: DateTime<Utc>, now: DateTime<Utc>, expiring_days: u32) -> ExpiryEvaluation {
    if not_after <= now {
        return ExpiryEvaluation {
            status: CheckStatus::Expired,
            days_remaining: 0,
        };
    }

    let days_remaining = days_remaining_ceil(not_after, now);
    let status = if days_remaining <= expiring_days {
        CheckStatus::Expiring
    } else {
        CheckStatus::Ok
    };

    ExpiryEvaluation {
        status,
        days_remaining,
    }
}

fn days_remaining_ceil(not_after: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let millis = (not_after - now).num_milliseconds();
    let days = millis / MILLIS_PER_DAY + i64::from(millis % MILLIS_PER_DAY != 0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_past_certificates_are_expired_with_zero_days() {
        for offset in [Duration::milliseconds(1), Duration::days(1), Duration::days(4000)] {
            let eval = evaluate(now() - offset, now(), 7);
            assert_eq!(eval.status, CheckStatus::Expired);
            assert_eq!(eval.days_remaining, 0);
        }
    }

    #[test]
    fn test_not_after_equal_to_now_is_expired() {
        let eval = evaluate(now(), now(), 7);
        assert_eq!(eval.status, CheckStatus::Expired);
        assert_eq!(eval.days_remaining, 0);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let eval = evaluate(now() + Duration::days(7), now(), 7);
        assert_eq!(eval.days_remaining, 7);
        assert_eq!(eval.status, CheckStatus::Expiring);
    }

    #[test]
    fn test_one_millisecond_past_a_day_rounds_up() {
        let not_after = now() + Duration::days(7) + Duration::milliseconds(1);

        let eval = evaluate(not_after, now(), 7);
        assert_eq!(eval.days_remaining, 8);
        assert_eq!(eval.status, CheckStatus::Ok);

        let eval = evaluate(not_after, now(), 8);
        assert_eq!(eval.days_remaining, 8);
        assert_eq!(eval.status, CheckStatus::Expiring);
    }

    #[test]
    fn test_fraction_of_a_day_reports_one_day() {
        let eval = evaluate(now() + Duration::hours(2), now(), 7);
        assert_eq!(eval.days_remaining, 1);
        assert_eq!(eval.status, CheckStatus::Expiring);
    }

    #[test]
    fn test_far_future_is_ok() {
        let eval = evaluate(now() + Duration::days(90), now(), 30);
        assert_eq!(eval.days_remaining, 90);
        assert_eq!(eval.status, CheckStatus::Ok);
    }
}
