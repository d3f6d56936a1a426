#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive terminal dashboard for wildfire risk.
//!
//! Renders the [`wildfire_risk_dashboard::Dashboard`] state with `ratatui`:
//! a world map with the heat layer and the selected point, slider inputs,
//! the risk analysis panel with feature drivers, the trend chart, the
//! scenario comparison list and an event log.
//!
//! The event loop multiplexes terminal input, workflow events and a redraw
//! tick with [`tokio::select!`], so it runs on a single-threaded runtime
//! while requests are in flight.

pub mod app;
pub mod log_pane;
pub mod ui;

use std::io::{self, IsTerminal, Stdout};
use std::panic::PanicHookInfo;
use std::sync::Arc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use thiserror::Error;
use wildfire_risk_client::RiskApi;
use wildfire_risk_dashboard::{DashboardConfig, Dispatcher};

use crate::app::{App, Flow};

/// Errors that end the dashboard.
#[derive(Debug, Error)]
pub enum TuiError {
    /// Terminal I/O failed.
    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),

    /// Stdin or stdout is not a terminal.
    #[error("The dashboard requires a terminal (TTY)")]
    NotATerminal,

    /// Another logger was installed before the dashboard started.
    #[error("Failed to install the event-log logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

type PanicHook = dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static;

/// Chains a cleanup step in front of the current panic hook for as long as
/// the guard lives. Dropping it puts the previous hook back.
struct PanicHookGuard {
    previous: Arc<PanicHook>,
}

impl PanicHookGuard {
    fn install(cleanup: impl Fn() + Send + Sync + 'static) -> Self {
        let previous: Arc<PanicHook> = Arc::from(std::panic::take_hook());
        let chained = Arc::clone(&previous);
        std::panic::set_hook(Box::new(move |info| {
            cleanup();
            chained(info);
        }));
        Self { previous }
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        // The hook cannot be swapped while unwinding.
        if std::thread::panicking() {
            return;
        }
        let previous = Arc::clone(&self.previous);
        std::panic::set_hook(Box::new(move |info| previous(info)));
    }
}

/// Runs the dashboard until the user quits.
///
/// Installs the event-log logger as the global `log` backend, so no other
/// logger may be set up beforehand. Must be called inside a Tokio runtime.
///
/// # Errors
///
/// Returns [`TuiError`] if stdio is not a terminal, the logger cannot be
/// installed, or terminal I/O fails.
pub async fn run_dashboard(
    api: Arc<dyn RiskApi>,
    config: &DashboardConfig,
) -> Result<(), TuiError> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(TuiError::NotATerminal);
    }

    let log = log_pane::install(config.ui.event_log_capacity)?;

    // Restore the terminal on panic while the dashboard owns it.
    let _hook = PanicHookGuard::install(|| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    });

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, api, config, log).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Term,
    api: Arc<dyn RiskApi>,
    config: &DashboardConfig,
    log: log_pane::LogBuffer,
) -> Result<(), TuiError> {
    let (events_tx, mut events_rx) = wildfire_risk_dashboard::channel();
    let dispatcher = Dispatcher::new(api, events_tx);
    let mut app = App::new(config, log);
    dispatcher.start(app.dashboard_mut());

    let mut input = EventStream::new();
    let mut ticker = tokio::time::interval(config.tick_rate());

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        tokio::select! {
            _ = ticker.tick() => {}
            Some(event) = events_rx.recv() => {
                dispatcher.handle(app.dashboard_mut(), event);
            }
            maybe_event = input.next() => match maybe_event {
                Some(Ok(event)) => {
                    let size = terminal.size()?;
                    let screen = Rect::new(0, 0, size.width, size.height);
                    if app.handle_event(&event, &dispatcher, screen) == Flow::Quit {
                        break;
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }

    log::info!("Dashboard closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn panic_hook_is_restored_when_guard_drops() {
        static CLEANUPS: AtomicUsize = AtomicUsize::new(0);

        let guard = PanicHookGuard::install(|| {
            CLEANUPS.fetch_add(1, Ordering::SeqCst);
        });
        assert!(std::panic::catch_unwind(|| panic!("while installed")).is_err());
        assert_eq!(CLEANUPS.load(Ordering::SeqCst), 1);

        drop(guard);
        assert!(std::panic::catch_unwind(|| panic!("after restore")).is_err());
        assert_eq!(CLEANUPS.load(Ordering::SeqCst), 1);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wildfire_risk_client::{ClientError, RiskApi};
    use wildfire_risk_models::api::{RiskRequest, SimulationRequest};
    use wildfire_risk_models::{Driver, RiskPoint, Scenario, ScenarioResult};

    /// Counts calls and fails every one of them.
    #[derive(Default)]
    pub struct CountingApi {
        pub calls: AtomicUsize,
    }

    impl CountingApi {
        fn fail<T>(&self) -> Result<T, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Status {
                status: 503,
                url: "test".to_string(),
            })
        }
    }

    #[async_trait::async_trait]
    impl RiskApi for CountingApi {
        async fn system_health(&self) -> Result<(), ClientError> {
            self.fail()
        }

        async fn risk_heatmap(&self) -> Result<Vec<RiskPoint>, ClientError> {
            self.fail()
        }

        async fn predict_risk(&self, _: &RiskRequest) -> Result<f64, ClientError> {
            self.fail()
        }

        async fn explain_risk(&self, _: &RiskRequest) -> Result<Vec<Driver>, ClientError> {
            self.fail()
        }

        async fn predict_scenario(&self, _: Scenario) -> Result<ScenarioResult, ClientError> {
            self.fail()
        }

        async fn simulate_risk(
            &self,
            _: &SimulationRequest,
        ) -> Result<Vec<Vec<f64>>, ClientError> {
            self.fail()
        }
    }
}
