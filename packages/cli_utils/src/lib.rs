#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the wildfire risk toolchain.
//!
//! [`init_logger`] sets up `indicatif-log-bridge` so that `log::info!` and
//! friends are suspended while spinners redraw, and [`RequestSpinner`]
//! shows one spinner per in-flight service request.
//!
//! The interactive terminal dashboard does not use either: it owns the
//! whole screen and routes log records into its own pane.

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// A spinner shown while a single service request is in flight.
pub struct RequestSpinner {
    bar: ProgressBar,
}

impl RequestSpinner {
    /// Adds a spinner labelled `message` to `multi`.
    #[must_use]
    pub fn start(multi: &MultiProgress, message: &str) -> Self {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// Stops the spinner, leaving `message` in its place.
    pub fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }

    /// Stops the spinner and removes it from the terminal.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Awaits `request` behind a spinner, replacing it with a check mark or a
/// cross once the request settles.
///
/// # Errors
///
/// Returns whatever error `request` resolves to.
pub async fn with_spinner<T, E, F>(multi: &MultiProgress, message: &str, request: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let spinner = RequestSpinner::start(multi, message);
    let result = request.await;
    match &result {
        Ok(_) => spinner.finish(format!("✔ {message}")),
        Err(e) => spinner.finish(format!("✘ {message}: {e}")),
    }
    result
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while spinners redraw.
///
/// Returns the [`MultiProgress`] that all spinners must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    // Build the pretty-env-logger logger manually so we can wrap it.
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}
