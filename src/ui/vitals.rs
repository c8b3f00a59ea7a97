//! The vitals screen: device row, alert banners, latest readings, trend
//! charts and the footer legend.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Tabs,
    },
    Frame,
};

use crate::app::App;
use crate::data::{format_reading, AlertKind, Metric};

/// Width of the latest-readings panel.
const LATEST_WIDTH: u16 = 36;

/// Render the device selector row.
pub fn render_device_row(frame: &mut Frame, app: &App, area: Rect) {
    let devices = app.state.devices();
    if devices.is_empty() {
        let line = Line::from(Span::styled(
            " No devices registered yet",
            app.theme.muted,
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let titles: Vec<Line> = devices.iter().map(|d| Line::from(format!(" {} ", d))).collect();

    // A selection missing from the catalog highlights nothing.
    let tabs = Tabs::new(titles)
        .select(app.selected_index())
        .style(app.theme.device_inactive)
        .highlight_style(app.theme.device_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render one banner line per active alert.
pub fn render_alerts(frame: &mut Frame, app: &App, area: Rect) {
    let alerts = app.alerts();
    let rows = Layout::vertical(vec![Constraint::Length(1); alerts.len()]).split(area);

    for (alert, row) in alerts.iter().zip(rows.iter()) {
        let severity = alert.kind.severity();
        let line = Line::from(vec![
            Span::raw(format!(" {} ", severity.symbol())),
            Span::raw(alert.to_string()),
        ]);
        frame.render_widget(
            Paragraph::new(line).style(app.theme.severity_style(severity)),
            *row,
        );
    }
}

/// Render the latest readings and the trend charts side by side.
pub fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let [latest_area, charts_area] =
        Layout::horizontal([Constraint::Length(LATEST_WIDTH), Constraint::Min(20)]).areas(area);

    render_latest(frame, app, latest_area);

    let rows = Layout::vertical([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(charts_area);

    for (metric, row) in Metric::CHARTED.into_iter().zip(rows.iter()) {
        render_chart(frame, app, metric, *row);
    }
}

/// Render the latest-readings panel.
///
/// Missing readings show `--`; missing device or timestamp show `-`.
pub fn render_latest(frame: &mut Frame, app: &App, area: Rect) {
    let latest = app.state.latest();
    let label_style = app.theme.muted;
    let value_style = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    for metric in [Metric::HeartRate, Metric::Spo2, Metric::Temperature, Metric::Humidity] {
        let value = latest.and_then(|s| s.value(metric));
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<12}", metric.label()), label_style),
            Span::styled(format_reading(value), value_style),
            Span::raw(format!(" {}", metric.unit())),
        ]));
    }

    lines.push(Line::from(""));

    let device = latest
        .map(|s| s.device_id.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or("-");
    let received = latest.and_then(|s| s.received_time.as_deref()).unwrap_or("-");

    lines.push(Line::from(vec![
        Span::styled(format!(" {:<12}", "Device"), label_style),
        Span::raw(device.to_string()),
    ]));
    lines.push(Line::from(vec![
        Span::styled(format!(" {:<12}", "Received"), label_style),
        Span::raw(received.to_string()),
    ]));

    let block = Block::default()
        .title(Span::styled(" Latest ", app.theme.title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the trend chart for one metric.
pub fn render_chart(frame: &mut Frame, app: &App, metric: Metric, area: Rect) {
    let mut title = format!(" {} ({}) ", metric.label(), metric.unit());
    if let Some(stats) = app.state.window().stats(metric) {
        title = format!(
            " {} ({}) │ min {:.1} avg {:.1} max {:.1} ",
            metric.label(),
            metric.unit(),
            stats.min,
            stats.mean,
            stats.max
        );
    }

    let block = Block::default()
        .title(Span::styled(title, app.theme.title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let surface = app
        .charts
        .surface(metric)
        .and_then(|id| app.charts.backend().surface(id));
    let Some(surface) = surface else {
        let placeholder = Paragraph::new(Span::styled(
            " chart unavailable",
            app.theme.muted,
        ))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let Some(y_bounds) = surface.y_bounds() else {
        let placeholder = Paragraph::new(Span::styled(
            " No data yet",
            app.theme.muted,
        ))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let segments = surface.segments();
    let line_style = Style::default().fg(surface.color());
    let marker = if surface.spec.point_radius > 0 {
        symbols::Marker::Dot
    } else {
        symbols::Marker::Braille
    };

    let datasets: Vec<Dataset> = segments
        .iter()
        .map(|points| {
            Dataset::default()
                .marker(marker)
                .graph_type(GraphType::Line)
                .style(line_style)
                .data(points)
        })
        .collect();

    let x_axis = Axis::default().bounds(surface.x_bounds());
    let x_axis = if surface.spec.show_x_labels {
        let [lo, hi] = surface.x_bounds();
        x_axis.labels(vec![Span::raw(format!("{}", lo)), Span::raw(format!("{}", hi))])
    } else {
        x_axis
    };

    let y_axis = Axis::default()
        .bounds(y_bounds)
        .style(app.theme.muted)
        .labels(vec![
            Span::raw(format!("{:.0}", y_bounds[0])),
            Span::raw(format!("{:.0}", y_bounds[1])),
        ]);

    let chart = Chart::new(datasets).block(block).x_axis(x_axis).y_axis(y_axis);
    frame.render_widget(chart, area);
}

/// Render the footer with the server and the alert thresholds.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let t = &app.thresholds;
    let line = Line::from(vec![
        Span::styled(" Server ", app.theme.muted),
        Span::raw(app.source_description().to_string()),
        Span::raw(" │ "),
        Span::styled("Alerts ", app.theme.muted),
        Span::styled(
            format!("SpO₂ < {}%", t.spo2_low),
            app.theme.severity_fg(AlertKind::LowSpo2.severity()),
        ),
        Span::raw(" · "),
        Span::styled(
            format!("HR < {} or > {} bpm", t.hr_low, t.hr_high),
            app.theme.severity_fg(AlertKind::AbnormalHr.severity()),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the device picker overlay.
pub fn render_device_picker(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .state
        .devices()
        .iter()
        .map(|d| {
            let marker = if Some(d) == app.state.selected() { "● " } else { "  " };
            ListItem::new(format!("{}{}", marker, d))
        })
        .collect();

    let block = Block::default()
        .title(" Devices ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.accent));

    let list = List::new(items).block(block).highlight_style(app.theme.picker_selected);
    let mut state = ListState::default().with_selected(Some(app.picker_index));

    let height = (app.state.devices().len() as u16).saturating_add(2);
    let picker_area = super::common::centered(area, 36, height.max(3));
    frame.render_widget(Clear, picker_area);
    frame.render_stateful_widget(list, picker_area, &mut state);
}
