//! Urgency classification for meeting display.
//!
//! # Invariants
//! - Pure: no side effects, consumed only for visual signaling. Lifecycle
//!   transitions use the archival grace period instead, never this tier.
//! - Tier edges are inclusive at the upper bound; ties go to the more
//!   urgent tier.

use chrono::NaiveDateTime;

const DAY_MS: i64 = 86_400_000;

/// Discrete urgency tier for a scheduled meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrgencyTier {
    /// Start time already passed.
    Expired,
    /// Within the next 2 days.
    Urgent,
    /// Within the next 7 days.
    Soon,
    /// More than a week out.
    Normal,
}

impl UrgencyTier {
    /// Card accent color shared with the presentation layer.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Urgent => "#dc3545",
            Self::Soon => "#fd7e14",
            Self::Normal => "#28a745",
            Self::Expired => "#6c757d",
        }
    }
}

/// Classifies a meeting start instant against `now`.
///
/// Integer millisecond arithmetic keeps the boundary cases exact: a
/// meeting exactly 2 days out is `Urgent`, one millisecond later is
/// `Soon`.
pub fn classify(instant: NaiveDateTime, now: NaiveDateTime) -> UrgencyTier {
    let diff_ms = (instant - now).num_milliseconds();
    if diff_ms < 0 {
        UrgencyTier::Expired
    } else if diff_ms <= 2 * DAY_MS {
        UrgencyTier::Urgent
    } else if diff_ms <= 7 * DAY_MS {
        UrgencyTier::Soon
    } else {
        UrgencyTier::Normal
    }
}
