//! SLA clock.
//!
//! SLA position is derived state: it is computed from
//! `(created_at, sla_hours, status, now)` on every read and never stored.
//! Tracking stops permanently once a request reaches a terminal status, using
//! the status at evaluation time.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{RequestStatus, SlaBucket};

/// Default SLA budget for new requests, in hours.
pub const DEFAULT_SLA_HOURS: f64 = 48.0;

/// Fraction of the budget after which an open request counts as at risk.
pub const DEFAULT_AT_RISK_RATIO: f64 = 0.8;

const NANOS_PER_HOUR: f64 = 3_600_000_000_000.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// SLA position of an open request at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SlaView {
    pub sla_hours: f64,
    pub elapsed_hours: f64,
    /// Negative once the budget is exceeded.
    pub remaining_hours: f64,
    pub breached: bool,
    pub bucket: SlaBucket,
}

/// Evaluates SLA views with a configurable at-risk threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaClock {
    at_risk_ratio: f64,
}

impl Default for SlaClock {
    fn default() -> Self {
        Self {
            at_risk_ratio: DEFAULT_AT_RISK_RATIO,
        }
    }
}

impl SlaClock {
    /// `at_risk_ratio` is expected in `(0, 1]`; config validation enforces it.
    #[must_use]
    pub const fn new(at_risk_ratio: f64) -> Self {
        Self { at_risk_ratio }
    }

    /// Compute the SLA view, or `None` when `status` is terminal.
    #[must_use]
    pub fn evaluate(
        &self,
        created_at: DateTime<Utc>,
        sla_hours: f64,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> Option<SlaView> {
        if status.is_terminal() {
            return None;
        }

        let elapsed_hours = hours_between(created_at, now);
        let breached = elapsed_hours > sla_hours;
        let bucket = if breached {
            SlaBucket::Breached
        } else if elapsed_hours >= sla_hours * self.at_risk_ratio {
            SlaBucket::AtRisk
        } else {
            SlaBucket::OnTrack
        };

        Some(SlaView {
            sla_hours,
            elapsed_hours,
            remaining_hours: sla_hours - elapsed_hours,
            breached,
            bucket,
        })
    }
}

/// Compute the SLA view with the default at-risk threshold.
#[must_use]
pub fn compute_sla(
    created_at: DateTime<Utc>,
    sla_hours: f64,
    status: RequestStatus,
    now: DateTime<Utc>,
) -> Option<SlaView> {
    SlaClock::default().evaluate(created_at, sla_hours, status, now)
}

/// Hours from `start` to `end` without rounding. Negative if `end` precedes `start`.
#[allow(clippy::cast_precision_loss)]
fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let delta = end - start;
    delta.num_nanoseconds().map_or_else(
        || delta.num_milliseconds() as f64 / MILLIS_PER_HOUR,
        |nanos| nanos as f64 / NANOS_PER_HOUR,
    )
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn breached_after_budget() {
        let now = now();
        let view = compute_sla(now - Duration::hours(10), 8.0, RequestStatus::New, now).unwrap();
        assert!(view.breached);
        assert_eq!(view.elapsed_hours, 10.0);
        assert_eq!(view.remaining_hours, -2.0);
        assert_eq!(view.bucket, SlaBucket::Breached);
    }

    #[test]
    fn on_track_early() {
        let now = now();
        let view = compute_sla(now - Duration::hours(1), 48.0, RequestStatus::New, now).unwrap();
        assert!(!view.breached);
        assert_eq!(view.remaining_hours, 47.0);
        assert_eq!(view.bucket, SlaBucket::OnTrack);
    }

    #[rstest]
    #[case(RequestStatus::Repaired)]
    #[case(RequestStatus::Scrap)]
    fn none_for_terminal_status(#[case] status: RequestStatus) {
        let now = now();
        // Long past breach: terminal status still hides the view.
        assert_eq!(compute_sla(now - Duration::days(30), 8.0, status, now), None);
        assert_eq!(compute_sla(now, 8.0, status, now), None);
        assert_eq!(compute_sla(now + Duration::hours(3), 8.0, status, now), None);
    }

    #[test]
    fn in_progress_is_still_tracked() {
        let now = now();
        let view = compute_sla(now - Duration::hours(9), 8.0, RequestStatus::InProgress, now);
        assert!(view.is_some_and(|v| v.breached));
    }

    #[test]
    fn exactly_at_budget_is_at_risk_not_breached() {
        let now = now();
        let view = compute_sla(now - Duration::hours(8), 8.0, RequestStatus::New, now).unwrap();
        assert!(!view.breached);
        assert_eq!(view.remaining_hours, 0.0);
        assert_eq!(view.bucket, SlaBucket::AtRisk);
    }

    #[test]
    fn one_second_past_budget_breaches() {
        let now = now();
        let created = now - Duration::hours(8) - Duration::seconds(1);
        let view = compute_sla(created, 8.0, RequestStatus::New, now).unwrap();
        assert!(view.breached);
        assert!(view.remaining_hours < 0.0);
    }

    #[rstest]
    #[case(0, SlaBucket::OnTrack)]
    #[case(37, SlaBucket::OnTrack)]
    #[case(38, SlaBucket::AtRisk)] // 38.4h is the threshold for 48h
    #[case(47, SlaBucket::AtRisk)]
    #[case(49, SlaBucket::Breached)]
    fn buckets_for_default_budget(#[case] elapsed: i64, #[case] expected: SlaBucket) {
        let now = now();
        let minutes = elapsed * 60 + if elapsed == 38 { 30 } else { 0 };
        let view = compute_sla(
            now - Duration::minutes(minutes),
            DEFAULT_SLA_HOURS,
            RequestStatus::New,
            now,
        )
        .unwrap();
        assert_eq!(view.bucket, expected);
    }

    #[test]
    fn custom_ratio_moves_threshold() {
        let now = now();
        let clock = SlaClock::new(0.5);
        let view = clock
            .evaluate(now - Duration::hours(5), 8.0, RequestStatus::New, now)
            .unwrap();
        assert_eq!(view.bucket, SlaBucket::AtRisk);
    }

    #[test]
    fn fractional_hours_keep_precision() {
        let now = now();
        let view = compute_sla(now - Duration::minutes(90), 2.0, RequestStatus::New, now).unwrap();
        assert_eq!(view.elapsed_hours, 1.5);
        assert_eq!(view.remaining_hours, 0.5);
    }
}
