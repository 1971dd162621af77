//! # Reconciliation Decisioning
//!
//! The delta-vs-full decision table, as a pure function.
//!
//! ## Decision Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   previous snapshot P   │   delta D = V - P   │   action              │
//! │─────────────────────────┼─────────────────────┼───────────────────────│
//! │   absent                │   -                 │   Full { value: V }   │
//! │   present               │   0                 │   NoOp                │
//! │   present               │   != 0              │   Delta { delta: D }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Target Prediction
//! After a successful write the engine predicts the target's new quantity
//! locally instead of waiting for the return notification, so the next
//! genuine event on either side diffs against a consistent baseline.

use serde::{Deserialize, Serialize};

use crate::types::SyncKind;

/// What the engine should do with a settled observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum SyncAction {
    /// No baseline exists: write the absolute value.
    Full { value: i64 },
    /// Baseline exists and moved: apply the signed change.
    Delta { delta: i64 },
    /// Baseline exists and is unchanged.
    NoOp,
}

impl SyncAction {
    /// Log kind for actions that write, `None` for [`SyncAction::NoOp`].
    pub fn kind(&self) -> Option<SyncKind> {
        match self {
            SyncAction::Full { .. } => Some(SyncKind::Full),
            SyncAction::Delta { .. } => Some(SyncKind::Delta),
            SyncAction::NoOp => None,
        }
    }

    /// Value recorded in the sync log: the delta or the absolute quantity.
    pub fn logged_value(&self) -> Option<i64> {
        match *self {
            SyncAction::Full { value } => Some(value),
            SyncAction::Delta { delta } => Some(delta),
            SyncAction::NoOp => None,
        }
    }

    #[inline]
    pub fn is_noop(&self) -> bool {
        matches!(self, SyncAction::NoOp)
    }
}

/// Applies the decision table to a previous snapshot and an observed value.
///
/// ```rust
/// use stockbridge_core::decision::{decide, SyncAction};
///
/// assert_eq!(decide(None, 7), SyncAction::Full { value: 7 });
/// assert_eq!(decide(Some(7), 7), SyncAction::NoOp);
/// assert_eq!(decide(Some(7), 10), SyncAction::Delta { delta: 3 });
/// ```
pub fn decide(previous: Option<i64>, observed: i64) -> SyncAction {
    match previous {
        None => SyncAction::Full { value: observed },
        Some(prev) => match observed.saturating_sub(prev) {
            0 => SyncAction::NoOp,
            delta => SyncAction::Delta { delta },
        },
    }
}

/// Predicts the target store's snapshot after `action` was applied.
///
/// - Full: the written value, regardless of any prior snapshot.
/// - Delta with a prior target snapshot: prior + delta.
/// - Delta without one: the observed absolute value.
/// - NoOp: the prior snapshot is kept.
pub fn predict_target_snapshot(
    action: SyncAction,
    prior_target: Option<i64>,
    observed: i64,
) -> Option<i64> {
    match action {
        SyncAction::Full { value } => Some(value),
        SyncAction::Delta { delta } => Some(
            prior_target
                .map(|prior| prior.saturating_add(delta))
                .unwrap_or(observed),
        ),
        SyncAction::NoOp => prior_target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_snapshot_always_full() {
        for observed in [-3, 0, 5, 1_000] {
            assert_eq!(decide(None, observed), SyncAction::Full { value: observed });
        }
    }

    #[test]
    fn test_zero_delta_is_noop() {
        assert!(decide(Some(0), 0).is_noop());
        assert!(decide(Some(42), 42).is_noop());
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(decide(Some(5), 3), SyncAction::Delta { delta: -2 });
        assert_eq!(decide(Some(-1), 4), SyncAction::Delta { delta: 5 });
    }

    #[test]
    fn test_predict_delta_against_prior() {
        let action = SyncAction::Delta { delta: -2 };
        assert_eq!(predict_target_snapshot(action, Some(10), 3), Some(8));
        assert_eq!(predict_target_snapshot(action, None, 3), Some(3));
    }

    #[test]
    fn test_predict_full_ignores_prior() {
        let action = SyncAction::Full { value: 9 };
        assert_eq!(predict_target_snapshot(action, Some(100), 9), Some(9));
        assert_eq!(predict_target_snapshot(action, None, 9), Some(9));
    }

    #[test]
    fn test_action_log_fields() {
        assert_eq!(SyncAction::Full { value: 4 }.kind(), Some(SyncKind::Full));
        assert_eq!(SyncAction::Delta { delta: -1 }.logged_value(), Some(-1));
        assert_eq!(SyncAction::NoOp.kind(), None);
    }
}
