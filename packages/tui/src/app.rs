//! Terminal input handling on top of the dashboard state.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use wildfire_risk_dashboard::{Dashboard, DashboardConfig, Dispatcher, PredictionRejected};
use wildfire_risk_models::{InputField, Scenario};

use crate::log_pane::LogBuffer;
use crate::ui;

/// Fraction of the visible span moved per arrow key press.
const PAN_STEP: f64 = 0.25;

/// Slider step for `PageUp`/`PageDown`.
const COARSE_STEP: i16 = 5;

/// Panel receiving arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Arrows pan, `+`/`-` zoom, Enter selects the crosshair location.
    Map,
    /// Arrows pick and adjust sliders.
    Inputs,
    /// Arrows pick a scenario, Enter runs it.
    Scenarios,
}

impl Focus {
    const ALL: &[Self] = &[Self::Map, Self::Inputs, Self::Scenarios];

    fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Whether the event loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running.
    Continue,
    /// Leave the dashboard.
    Quit,
}

/// Dashboard state plus terminal-only UI state.
pub struct App {
    dashboard: Dashboard,
    log: LogBuffer,
    focus: Focus,
    field: InputField,
    scenario_cursor: usize,
    notice: Option<String>,
}

impl App {
    /// Creates the app for `config`, reading log lines from `log`.
    #[must_use]
    pub fn new(config: &DashboardConfig, log: LogBuffer) -> Self {
        Self {
            dashboard: Dashboard::new(config),
            log,
            focus: Focus::Map,
            field: InputField::Temperature,
            scenario_cursor: 0,
            notice: None,
        }
    }

    /// Dashboard state.
    #[must_use]
    pub const fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Mutable dashboard state, for applying workflow events.
    pub const fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    /// Event-log lines.
    #[must_use]
    pub const fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Focused panel.
    #[must_use]
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    /// Highlighted slider.
    #[must_use]
    pub const fn field(&self) -> InputField {
        self.field
    }

    /// Highlighted scenario.
    #[must_use]
    pub fn scenario_cursor(&self) -> Scenario {
        Scenario::all()[self.scenario_cursor % Scenario::all().len()]
    }

    /// Blocking notice, if one is open.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Handles one terminal event. `screen` is the full terminal area,
    /// used to locate mouse clicks.
    pub fn handle_event(&mut self, event: &Event, dispatcher: &Dispatcher, screen: Rect) -> Flow {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key(*key, dispatcher, screen)
            }
            Event::Mouse(mouse) => {
                self.handle_mouse(*mouse, screen);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, dispatcher: &Dispatcher, screen: Rect) -> Flow {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Flow::Quit;
        }

        // The notice is modal: any key dismisses it.
        if self.notice.is_some() {
            self.notice = None;
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Char('r') => self.predict(dispatcher),
            KeyCode::Char('h') => {
                dispatcher.refresh_heatmap(&mut self.dashboard);
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Some(scenario) = Scenario::all().get(index) {
                    self.run_scenario(dispatcher, *scenario);
                }
            }
            code => match self.focus {
                Focus::Map => self.map_key(code, screen),
                Focus::Inputs => self.inputs_key(code),
                Focus::Scenarios => self.scenarios_key(code, dispatcher),
            },
        }
        Flow::Continue
    }

    fn map_key(&mut self, code: KeyCode, screen: Rect) {
        let map = ui::layout(screen).map_inner();
        let (cols, rows) = (map.width, map.height);
        let selected = self.dashboard.location();
        let viewport = self.dashboard.viewport_mut();
        match code {
            KeyCode::Left => viewport.pan(-PAN_STEP, 0.0, cols, rows),
            KeyCode::Right => viewport.pan(PAN_STEP, 0.0, cols, rows),
            KeyCode::Up => viewport.pan(0.0, PAN_STEP, cols, rows),
            KeyCode::Down => viewport.pan(0.0, -PAN_STEP, cols, rows),
            KeyCode::Char('+' | '=') => viewport.zoom_in(),
            KeyCode::Char('-') => viewport.zoom_out(),
            KeyCode::Char('c') => {
                if let Some(location) = selected {
                    viewport.recenter(location);
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let center = viewport.center();
                self.dashboard.select_location(center);
            }
            _ => {}
        }
    }

    fn inputs_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.field = self.field.previous(),
            KeyCode::Down => self.field = self.field.next(),
            KeyCode::Left => self.dashboard.adjust_input(self.field, -1),
            KeyCode::Right => self.dashboard.adjust_input(self.field, 1),
            KeyCode::PageDown => self.dashboard.adjust_input(self.field, -COARSE_STEP),
            KeyCode::PageUp => self.dashboard.adjust_input(self.field, COARSE_STEP),
            _ => {}
        }
    }

    fn scenarios_key(&mut self, code: KeyCode, dispatcher: &Dispatcher) {
        let count = Scenario::all().len();
        match code {
            KeyCode::Up => self.scenario_cursor = (self.scenario_cursor + count - 1) % count,
            KeyCode::Down => self.scenario_cursor = (self.scenario_cursor + 1) % count,
            KeyCode::Enter | KeyCode::Char(' ') => {
                let scenario = self.scenario_cursor();
                self.run_scenario(dispatcher, scenario);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, screen: Rect) {
        let map = ui::layout(screen).map_inner();
        let inside = mouse.column >= map.x
            && mouse.column < map.x + map.width
            && mouse.row >= map.y
            && mouse.row < map.y + map.height;
        if !inside || self.notice.is_some() {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let location = self.dashboard.viewport().location_at(
                    mouse.column - map.x,
                    mouse.row - map.y,
                    map.width,
                    map.height,
                );
                self.focus = Focus::Map;
                self.dashboard.select_location(location);
            }
            MouseEventKind::ScrollUp => self.dashboard.viewport_mut().zoom_in(),
            MouseEventKind::ScrollDown => self.dashboard.viewport_mut().zoom_out(),
            _ => {}
        }
    }

    fn predict(&mut self, dispatcher: &Dispatcher) {
        match dispatcher.predict(&mut self.dashboard) {
            Ok(_) => {}
            Err(e @ PredictionRejected::NoLocationSelected) => self.notice = Some(e.to_string()),
            Err(e @ PredictionRejected::AlreadyRunning) => log::debug!("{e}"),
        }
    }

    fn run_scenario(&mut self, dispatcher: &Dispatcher, scenario: Scenario) {
        if let Err(e) = dispatcher.run_scenario(&mut self.dashboard, scenario) {
            log::debug!("{e}");
        }
    }
}
