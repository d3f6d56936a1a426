//! Startup system-health probe.

use strum_macros::{AsRefStr, Display};
use wildfire_risk_client::{ClientError, RiskApi};

use crate::{DashboardEvent, EventSender, emit};

/// Service status shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr)]
pub enum HealthStatus {
    /// The probe has not completed.
    #[default]
    #[strum(to_string = "Checking...")]
    Checking,
    /// The service answered with a 2xx status.
    Operational,
    /// The probe failed.
    Offline,
}

impl HealthStatus {
    /// Status for the outcome of one health request. Any failure, whether
    /// transport or a non-2xx status, counts as offline.
    #[must_use]
    pub fn from_outcome(outcome: &Result<(), ClientError>) -> Self {
        match outcome {
            Ok(()) => Self::Operational,
            Err(e) => {
                log::warn!("System health check failed: {e}");
                Self::Offline
            }
        }
    }

    #[must_use]
    pub const fn is_operational(self) -> bool {
        matches!(self, Self::Operational)
    }
}

/// Probes the service once and reports the outcome. No retry.
pub async fn probe(api: &dyn RiskApi, events: &EventSender) {
    let status = HealthStatus::from_outcome(&api.system_health().await);
    log::info!("Risk service is {status}");
    emit(events, DashboardEvent::HealthChecked(status));
}
