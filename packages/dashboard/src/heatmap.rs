//! Heatmap fetches.
//!
//! Each fetch carries a sequence number. Fetches may overlap (startup plus
//! a refresh after a prediction), so a response is only applied if it is
//! newer than the last one applied. A failed fetch still settles its
//! sequence number so the loading flag clears while the old points stay.

use wildfire_risk_client::RiskApi;

use crate::{DashboardEvent, EventSender, emit};

/// Identifies one heatmap fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapTicket {
    /// Fetch sequence number, starting at 1.
    pub seq: u64,
}

/// Issues sequence numbers and filters out-of-order responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatmapTracker {
    issued: u64,
    applied: u64,
    settled: u64,
}

impl HeatmapTracker {
    /// Starts a new fetch.
    pub const fn begin(&mut self) -> HeatmapTicket {
        self.issued += 1;
        HeatmapTicket { seq: self.issued }
    }

    /// Whether a response with `seq` should replace the current points.
    /// Accepting a response marks it as the latest applied.
    pub const fn accept(&mut self, seq: u64) -> bool {
        self.settle(seq);
        if seq > self.applied {
            self.applied = seq;
            true
        } else {
            false
        }
    }

    /// Records a failed fetch. The current points are kept.
    pub const fn fail(&mut self, seq: u64) {
        self.settle(seq);
    }

    const fn settle(&mut self, seq: u64) {
        if seq > self.settled {
            self.settled = seq;
        }
    }

    /// Whether any fetch is newer than the last one that completed.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.issued > self.settled
    }
}

/// Fetches every logged prediction. Failures are logged and reported as
/// [`DashboardEvent::HeatmapFailed`].
pub async fn load(api: &dyn RiskApi, ticket: HeatmapTicket, events: &EventSender) {
    match api.risk_heatmap().await {
        Ok(points) => {
            log::debug!("Heatmap #{} returned {} points", ticket.seq, points.len());
            emit(
                events,
                DashboardEvent::HeatmapLoaded {
                    seq: ticket.seq,
                    points,
                },
            );
        }
        Err(e) => {
            log::error!("Heatmap error: {e}");
            emit(events, DashboardEvent::HeatmapFailed { seq: ticket.seq });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, drain};

    #[test]
    fn drops_older_responses() {
        let mut tracker = HeatmapTracker::default();
        let first = tracker.begin();
        let second = tracker.begin();
        assert!(tracker.is_loading());

        assert!(tracker.accept(second.seq));
        assert!(!tracker.accept(first.seq));
        assert!(!tracker.is_loading());
    }

    #[test]
    fn failure_settles_without_applying() {
        let mut tracker = HeatmapTracker::default();
        let first = tracker.begin();
        assert!(tracker.accept(first.seq));

        let second = tracker.begin();
        assert!(tracker.is_loading());
        tracker.fail(second.seq);
        assert!(!tracker.is_loading());

        // A later success is still newer than the last applied response.
        let third = tracker.begin();
        assert!(tracker.accept(third.seq));
    }

    #[tokio::test]
    async fn failure_reports_its_sequence() {
        let api = FakeApi::default();
        api.script_heatmap(Err(500));
        let (tx, mut rx) = crate::channel();

        load(&api, HeatmapTicket { seq: 4 }, &tx).await;

        assert_eq!(
            drain(&mut rx),
            vec![DashboardEvent::HeatmapFailed { seq: 4 }]
        );
    }
}
