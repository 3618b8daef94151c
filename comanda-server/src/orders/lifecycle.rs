//! Order status transition rules
//!
//! The transition graph in one place. Everything that mutates an order's
//! status goes through [`check`]; nothing else in the crate compares
//! status values.
//!
//! ```text
//! pending ──▶ live ──▶ done
//!    │         │         │
//!    │         │         └──▶ paid ⟲ (idempotent re-confirmation)
//!    │         ├─────────────▶ paid
//!    ├───────────────────────▶ paid
//!    │         │
//!    └─────────┴──▶ canceled   (fixed terminal, requires a reason)
//! ```

use shared::OrderStatus;
use thiserror::Error;

/// Rule violations raised by [`check`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The transition graph has no edge from `from` to `to`
    #[error("illegal transition: {from} -> {to}")]
    Illegal {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Canceling requires a non-empty reason
    #[error("cancel requires a non-empty cancelReason")]
    MissingCancelReason,
}

/// What a legal transition amounts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The status changes: persist, then broadcast
    Applied,
    /// Re-confirming an already paid order: keep state, skip broadcast
    AlreadyPaid,
}

/// Extra data accompanying a transition request
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
    pub cancel_reason: Option<String>,
}

/// Validate a transition from `current` to `target`
///
/// A reason supplied for a non-cancel target is ignored rather than
/// rejected; clients routinely post the whole form.
pub fn check(
    current: OrderStatus,
    target: OrderStatus,
    cancel_reason: Option<&str>,
) -> Result<TransitionOutcome, TransitionError> {
    use OrderStatus::*;

    if target == Canceled && cancel_reason.is_none_or(|r| r.trim().is_empty()) {
        return Err(TransitionError::MissingCancelReason);
    }

    let legal = match (current, target) {
        (Paid, Paid) => return Ok(TransitionOutcome::AlreadyPaid),
        (Pending, Live) | (Live, Done) => true,
        (Pending | Live, Canceled) => true,
        (Pending | Live | Done, Paid) => true,
        _ => false,
    };

    if legal {
        Ok(TransitionOutcome::Applied)
    } else {
        Err(TransitionError::Illegal {
            from: current,
            to: target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::OrderStatus::*;

    #[test]
    fn forward_progression_is_legal() {
        assert_eq!(check(Pending, Live, None), Ok(TransitionOutcome::Applied));
        assert_eq!(check(Live, Done, None), Ok(TransitionOutcome::Applied));
        assert_eq!(check(Done, Paid, None), Ok(TransitionOutcome::Applied));
    }

    #[test]
    fn paid_is_reachable_from_every_open_status() {
        for from in [Pending, Live, Done] {
            assert_eq!(check(from, Paid, None), Ok(TransitionOutcome::Applied));
        }
    }

    #[test]
    fn repay_is_an_idempotent_noop() {
        assert_eq!(check(Paid, Paid, None), Ok(TransitionOutcome::AlreadyPaid));
    }

    #[test]
    fn pending_cannot_skip_to_done() {
        assert_eq!(
            check(Pending, Done, None),
            Err(TransitionError::Illegal {
                from: Pending,
                to: Done
            })
        );
    }

    #[test]
    fn cancel_requires_a_reason() {
        assert_eq!(
            check(Live, Canceled, None),
            Err(TransitionError::MissingCancelReason)
        );
        assert_eq!(
            check(Live, Canceled, Some("   ")),
            Err(TransitionError::MissingCancelReason)
        );
        assert_eq!(
            check(Live, Canceled, Some("customer left")),
            Ok(TransitionOutcome::Applied)
        );
    }

    #[test]
    fn reason_on_other_targets_is_ignored() {
        assert_eq!(
            check(Pending, Live, Some("whatever")),
            Ok(TransitionOutcome::Applied)
        );
    }

    #[test]
    fn canceled_is_a_fixed_terminal() {
        for target in [Pending, Live, Done, Paid] {
            assert_eq!(
                check(Canceled, target, Some("reason")),
                Err(TransitionError::Illegal {
                    from: Canceled,
                    to: target
                })
            );
        }
    }

    #[test]
    fn done_and_paid_reject_regressions() {
        assert!(check(Done, Live, None).is_err());
        assert!(check(Done, Canceled, Some("late")).is_err());
        assert!(check(Paid, Canceled, Some("late")).is_err());
        assert!(check(Paid, Done, None).is_err());
    }
}
