//! Rendering of the dashboard.
//!
//! ```text
//! ┌ header: health, location, zoom ───────────────────────────────┐
//! ├ inputs ──────────┬ map (world outline, heat layer, marker) ───┤
//! ├ scenarios ───────┤                                            │
//! │                  ├ risk analysis ────────┬ trend ─────────────┤
//! ├ event log ───────┤                       │                    │
//! └──────────────────┴───────────────────────┴────────────────────┘
//!   key hints
//! ```

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::{self, Marker};
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Map, MapResolution, Points};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, LineGauge,
    List, ListItem, Paragraph, Wrap,
};
use wildfire_risk_dashboard::HealthStatus;
use wildfire_risk_dashboard::heat::Rgb;
use wildfire_risk_dashboard::trend::TREND_Y_DOMAIN;
use wildfire_risk_dashboard::view::{ResultView, RiskSummary};
use wildfire_risk_models::{InputField, RiskLevel, Scenario};

use crate::app::{App, Focus};

const KEY_HINTS: &str = " Tab focus · ←↑↓→ pan/adjust · +/- zoom · Enter select · click map · r run model · 1-4 scenarios · h refresh · q quit";

/// Screen regions of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub header: Rect,
    pub inputs: Rect,
    pub scenarios: Rect,
    pub log: Rect,
    pub map: Rect,
    pub result: Rect,
    pub trend: Rect,
    pub footer: Rect,
}

impl Areas {
    /// Drawable area of the map, inside its border.
    #[must_use]
    pub fn map_inner(&self) -> Rect {
        self.map.inner(Margin::new(1, 1))
    }
}

/// Splits `area` into the dashboard regions. Shared by rendering and
/// mouse hit-testing.
#[must_use]
pub fn layout(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(rows[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(11),
            Constraint::Min(3),
        ])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Min(8)])
        .split(columns[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(right[1]);

    Areas {
        header: rows[0],
        inputs: left[0],
        scenarios: left[1],
        log: left[2],
        map: right[0],
        result: bottom[0],
        trend: bottom[1],
        footer: rows[2],
    }
}

/// Draws the whole dashboard.
pub fn render(frame: &mut Frame, app: &App) {
    let areas = layout(frame.area());

    render_header(frame, areas.header, app);
    render_inputs(frame, areas.inputs, app);
    render_scenarios(frame, areas.scenarios, app);
    render_log(frame, areas.log, app);
    render_map(frame, areas.map, app);
    render_result(frame, areas.result, app);
    render_trend(frame, areas.trend, app);
    frame.render_widget(
        Paragraph::new(KEY_HINTS).style(Style::default().fg(Color::DarkGray)),
        areas.footer,
    );

    if let Some(notice) = app.notice() {
        render_notice(frame, notice);
    }
}

const fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

const fn level_color(level: RiskLevel) -> Color {
    let (r, g, b) = level.rgb();
    Color::Rgb(r, g, b)
}

fn badge(level: RiskLevel) -> Span<'static> {
    Span::styled(
        format!(" {} ", level.label()),
        Style::default()
            .fg(Color::White)
            .bg(level_color(level))
            .add_modifier(Modifier::BOLD),
    )
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let dashboard = app.dashboard();
    let health = dashboard.health();
    let health_color = match health {
        HealthStatus::Checking => Color::Yellow,
        HealthStatus::Operational => Color::Green,
        HealthStatus::Offline => Color::Red,
    };
    let location = dashboard
        .location()
        .map_or_else(|| "none".to_string(), |l| l.to_string());
    let points = if dashboard.is_heatmap_loading() {
        format!("{} (loading)", dashboard.points().len())
    } else {
        dashboard.points().len().to_string()
    };

    let line = Line::from(vec![
        Span::styled("  System: ", Style::default().fg(Color::Gray)),
        Span::styled(health.to_string(), Style::default().fg(health_color)),
        Span::styled("  |  Location: ", Style::default().fg(Color::Gray)),
        Span::styled(location, Style::default().fg(Color::White)),
        Span::styled("  |  Zoom: ", Style::default().fg(Color::Gray)),
        Span::styled(
            dashboard.viewport().zoom().to_string(),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled("  |  Logged points: ", Style::default().fg(Color::Gray)),
        Span::styled(points, Style::default().fg(Color::LightCyan)),
    ]);

    let block = Block::default()
        .title(" Wildfire Risk Dashboard ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_inputs(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus() == Focus::Inputs;
    let block = panel("Environment", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(InputField::all().iter().map(|_| Constraint::Length(1)))
        .split(inner);

    let inputs = app.dashboard().inputs();
    for (field, row) in InputField::all().iter().zip(rows.iter()) {
        let selected = focused && *field == app.field();
        let marker = if selected { "▶" } else { " " };
        let max = *field.range().end();
        let ratio = f64::from(inputs.get(*field)) / f64::from(max.max(1));
        let label_style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let gauge = LineGauge::default()
            .ratio(ratio.clamp(0.0, 1.0))
            .label(Line::styled(
                format!("{marker}{:<12}{:>7} ", field.label(), inputs.display(*field)),
                label_style,
            ))
            .line_set(symbols::line::THICK)
            .filled_style(Style::default().fg(Color::LightRed))
            .unfilled_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(gauge, *row);
    }
}

fn render_scenarios(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus() == Focus::Scenarios;
    let dashboard = app.dashboard();

    let mut items: Vec<ListItem> = Scenario::all()
        .iter()
        .enumerate()
        .map(|(i, scenario)| {
            let selected = focused && *scenario == app.scenario_cursor();
            let style = if selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let mut spans = vec![Span::styled(
                format!("[{}] {}", i + 1, scenario.label()),
                style,
            )];
            if dashboard.is_scenario_running(*scenario) {
                spans.push(Span::styled(
                    "  running...",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let rows = dashboard.scenario_rows();
    if !rows.is_empty() {
        items.push(ListItem::new(Line::styled(
            "─ comparison ─",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for row in rows {
        items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("{:<13}", row.label), Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:>8} ", row.percent),
                Style::default().fg(Color::White),
            ),
            badge(row.level),
        ])));
    }

    frame.render_widget(List::new(items).block(panel("Scenarios", focused)), area);
}

fn render_log(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel("Event Log", false);
    let height = usize::from(block.inner(area).height);

    let lines: Vec<Line> = app
        .log()
        .tail(height)
        .into_iter()
        .map(|line| {
            let color = match line.level {
                log::Level::Error => Color::Red,
                log::Level::Warn => Color::Yellow,
                log::Level::Info => Color::Green,
                log::Level::Debug | log::Level::Trace => Color::DarkGray,
            };
            Line::from(vec![
                Span::styled(
                    line.time.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:<5} ", line.level), Style::default().fg(color)),
                Span::raw(line.message),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_map(frame: &mut Frame, area: Rect, app: &App) {
    let dashboard = app.dashboard();
    let viewport = dashboard.viewport();
    let focused = app.focus() == Focus::Map;
    let inner = area.inner(Margin::new(1, 1));
    let bounds = viewport.bounds(inner.width, inner.height);
    let style = dashboard.heat_style();
    let (core, halo) = style.radii(viewport.zoom());
    let layer = dashboard.heat_layer();
    let selected = dashboard.location();
    let center = viewport.center();

    let canvas = Canvas::default()
        .block(panel("Map", focused))
        .marker(Marker::Braille)
        .x_bounds([bounds.min().x, bounds.max().x])
        .y_bounds([bounds.min().y, bounds.max().y])
        .paint(move |ctx| {
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: Color::DarkGray,
            });
            ctx.layer();

            for point in layer.unwrap_or_default() {
                let color = style.shade(point.intensity);
                ctx.draw(&Circle {
                    x: point.lng,
                    y: point.lat,
                    radius: halo,
                    color: rgb(color.dim(0.5)),
                });
                ctx.draw(&Circle {
                    x: point.lng,
                    y: point.lat,
                    radius: core,
                    color: rgb(color),
                });
                ctx.draw(&Points {
                    coords: &[(point.lng, point.lat)],
                    color: rgb(color),
                });
            }
            ctx.layer();

            if focused {
                ctx.print(
                    center.lng,
                    center.lat,
                    Line::styled("+", Style::default().fg(Color::Yellow)),
                );
            }
            if let Some(location) = selected {
                ctx.print(
                    location.lng,
                    location.lat,
                    Line::styled(
                        "◉",
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn render_result(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel("Risk Analysis", false);

    match app.dashboard().result_view() {
        ResultView::Ready(summary) => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            render_summary(frame, inner, &summary);
        }
        view => {
            let message = view.message().unwrap_or_default();
            frame.render_widget(
                Paragraph::new(message)
                    .style(Style::default().fg(Color::Gray))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(block),
                area,
            );
        }
    }
}

fn render_summary(frame: &mut Frame, area: Rect, summary: &RiskSummary) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    let text = vec![
        Line::from(vec![
            Span::styled("Risk probability: ", Style::default().fg(Color::Gray)),
            Span::styled(
                summary.percent.clone(),
                Style::default()
                    .fg(level_color(summary.level))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            badge(summary.level),
        ]),
        Line::styled(summary.advisory(), Style::default().fg(Color::White)),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), parts[0]);

    if summary.drivers.is_empty() {
        frame.render_widget(
            Paragraph::new("No feature contributions.").style(Style::default().fg(Color::DarkGray)),
            parts[1],
        );
        return;
    }

    // Bars show magnitude; the sign is carried by colour and the value text.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bars: Vec<Bar> = summary
        .drivers
        .iter()
        .map(|d| {
            let level = if d.contribution >= 0.0 {
                RiskLevel::High
            } else {
                RiskLevel::Low
            };
            Bar::default()
                .value((d.contribution.abs() * 10_000.0).round() as u64)
                .label(Line::from(d.feature.clone()))
                .text_value(format!("{:+.4}", d.contribution))
                .style(Style::default().fg(level_color(level)))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title("Drivers").borders(Borders::TOP))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, parts[1]);
}

fn render_trend(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel("Risk Trend", false);

    let Some(series) = app.dashboard().trend() else {
        frame.render_widget(
            Paragraph::new("No logged predictions yet.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    };

    #[allow(clippy::cast_precision_loss)]
    let data: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.risk_percent))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let x_max = (series.len().saturating_sub(1) as f64).max(1.0);
    let first = series.first().map(|p| p.time.clone()).unwrap_or_default();
    let last = series.last().map(|p| p.time.clone()).unwrap_or_default();

    let dataset = Dataset::default()
        .name("risk %")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(level_color(RiskLevel::High)))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels([first, last])
                .style(Style::default().fg(Color::Gray)),
        )
        .y_axis(
            Axis::default()
                .bounds(TREND_Y_DOMAIN)
                .labels(["0", "50", "100"])
                .style(Style::default().fg(Color::Gray)),
        );
    frame.render_widget(chart, area);
}

fn render_notice(frame: &mut Frame, notice: &str) {
    let screen = frame.area();
    let width = 54.min(screen.width);
    let height = 5.min(screen.height);
    let area = Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    );

    let text = vec![
        Line::styled(notice.to_string(), Style::default().fg(Color::White)),
        Line::styled(
            "Press any key to continue.",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    let block = Block::default()
        .title(" Notice ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use wildfire_risk_dashboard::{DashboardConfig, DashboardEvent, Dispatcher};
    use wildfire_risk_models::{Driver, Location, RiskPoint};

    use super::*;
    use crate::log_pane::LogBuffer;
    use crate::testing::CountingApi;

    fn app() -> App {
        App::new(&DashboardConfig::embedded().unwrap(), LogBuffer::new(10))
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 44)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn layout_regions_do_not_overlap_the_map() {
        let areas = layout(Rect::new(0, 0, 140, 44));
        let map = areas.map_inner();
        assert!(map.width > 0 && map.height > 0);
        assert!(areas.inputs.x + areas.inputs.width <= areas.map.x);
        assert!(areas.header.y + areas.header.height <= areas.map.y);
    }

    #[test]
    fn initial_screen_shows_placeholders() {
        let text = screen_text(&app());
        assert!(text.contains("Checking..."));
        assert!(text.contains("Click on the map"));
        assert!(text.contains("No logged predictions yet."));
        assert!(text.contains("[3] HIGH WIND"));
    }

    #[test]
    fn completed_prediction_shows_badge_and_trend() {
        let mut app = app();
        let dashboard = app.dashboard_mut();
        dashboard.select_location(Location::new(51.4545, -2.5879));
        let ticket = dashboard.begin_prediction().unwrap();
        let g = ticket.generation;
        dashboard.apply(DashboardEvent::PredictionScored {
            generation: g,
            probability: 0.75,
        });
        dashboard.apply(DashboardEvent::DriversExplained {
            generation: g,
            drivers: vec![Driver {
                feature: "temperature".to_string(),
                contribution: 0.25,
            }],
        });
        dashboard.apply(DashboardEvent::PredictionFinished {
            generation: g,
            refresh_heatmap: true,
        });
        let seq = dashboard.begin_heatmap().seq;
        dashboard.apply(DashboardEvent::HeatmapLoaded {
            seq,
            points: vec![RiskPoint::new(51.4545, -2.5879, 0.75, Utc::now())],
        });
        dashboard.apply(DashboardEvent::HealthChecked(HealthStatus::Operational));

        let text = screen_text(&app);
        assert!(text.contains("75.00%"));
        assert!(text.contains(" HIGH "));
        assert!(text.contains("Operational"));
        assert!(!text.contains("No logged predictions yet."));
    }

    #[test]
    fn notice_is_drawn_on_top() {
        let mut app = app();
        let (tx, _rx) = wildfire_risk_dashboard::channel();
        let dispatcher = Dispatcher::new(Arc::new(CountingApi::default()), tx);

        app.handle_event(
            &Event::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE)),
            &dispatcher,
            Rect::new(0, 0, 140, 44),
        );

        let text = screen_text(&app);
        assert!(text.contains("Please select a location on the map first."));
    }
}
