//! Order progress shown on the tracking page.

use serde::Serialize;

use crate::types::OrderStatus;

/// Steps an order moves through, in order.
pub const TRACKING_STEPS: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
];

/// Position of `status` in [`TRACKING_STEPS`].
///
/// `Completed` counts as delivered. `Cancelled` has no position.
#[must_use]
pub fn progress_index(status: OrderStatus) -> Option<usize> {
    let status = match status {
        OrderStatus::Completed => OrderStatus::Delivered,
        OrderStatus::Cancelled => return None,
        other => other,
    };
    TRACKING_STEPS.iter().position(|step| *step == status)
}

/// One rendered step of the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackingStep {
    pub status: OrderStatus,
    pub label: &'static str,
    pub reached: bool,
    pub current: bool,
}

/// Every step with its reached/current flags for `status`.
#[must_use]
pub fn tracking_steps(status: OrderStatus) -> Vec<TrackingStep> {
    let index = progress_index(status);
    TRACKING_STEPS
        .iter()
        .enumerate()
        .map(|(i, step)| TrackingStep {
            status: *step,
            label: step.label(),
            reached: index.is_some_and(|idx| i <= idx),
            current: index == Some(i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_index() {
        assert_eq!(progress_index(OrderStatus::Pending), Some(0));
        assert_eq!(progress_index(OrderStatus::Shipped), Some(3));
        assert_eq!(progress_index(OrderStatus::Completed), Some(4));
        assert_eq!(progress_index(OrderStatus::Cancelled), None);
    }

    #[test]
    fn test_steps_mark_reached() {
        let steps = tracking_steps(OrderStatus::Processing);
        let reached: Vec<bool> = steps.iter().map(|s| s.reached).collect();
        assert_eq!(reached, [true, true, true, false, false]);
        assert!(steps.iter().filter(|s| s.current).count() == 1);
    }

    #[test]
    fn test_cancelled_reaches_nothing() {
        assert!(tracking_steps(OrderStatus::Cancelled).iter().all(|s| !s.reached));
    }
}
