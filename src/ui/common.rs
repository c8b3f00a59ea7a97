//! Common UI components shared across the screen.
//!
//! This module contains the header bar, status bar, help overlay and the
//! clear confirmation dialog.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;

/// Render the header bar.
///
/// Displays: connection indicator, selected device, alert count.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (status_icon, status_style) = if app.last_error.is_some() {
        ("●", Style::default().fg(app.theme.critical))
    } else if app.state.last_updated().is_some() {
        ("●", Style::default().fg(app.theme.connected))
    } else {
        ("○", app.theme.muted)
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", status_icon), status_style),
        Span::styled("VITALS ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
    ];

    match app.state.selected() {
        Some(device) => {
            spans.push(Span::styled(device.to_string(), app.theme.device_active));
            if app.state.selection_is_stale() {
                spans.push(Span::styled(
                    " (not in catalog)",
                    app.theme.muted,
                ));
            }
        }
        None => spans.push(Span::styled(
            "no device",
            app.theme.muted,
        )),
    }

    spans.push(Span::raw(" │ "));
    spans.push(Span::raw(format!("{} devices", app.state.devices().len())));

    let alerts = app.alerts();
    if !alerts.is_empty() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{} alert{}", alerts.len(), if alerts.len() == 1 { "" } else { "s" }),
            Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the status bar at the bottom.
///
/// Shows a temporary status message if there is one, otherwise the time since
/// the last update, the last fetch error and the available controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.accent));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "←/→:device d:pick c:clear e:export r:refresh ?:help q:quit";

    let freshness = match app.state.last_updated() {
        Some(at) => format!("Updated {} ago", format_duration(at.elapsed())),
        None if app.state.selected().is_some() => "Waiting for data".to_string(),
        None => "Waiting for devices".to_string(),
    };

    let status = match &app.last_error {
        Some((task, err)) => format!(" {} | {} failed: {} | {}", freshness, task.label(), err, controls),
        None => format!(" {} | {}", freshness, controls),
    };

    let paragraph = Paragraph::new(status).style(app.theme.muted);
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.title)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Devices",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Previous/next device"),
        Line::from("  Tab         Next device"),
        Line::from("  d Enter     Open device picker"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Data",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  c         Clear device history"),
        Line::from("  e         Show CSV export link"),
        Line::from("  r         Refresh now"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ?         Toggle help"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            app.theme.muted,
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.accent));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_area = centered(area, 42, 21);
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Render the clear confirmation dialog.
pub fn render_confirm_clear(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref device) = app.pending_clear else {
        return;
    };

    let text = vec![
        Line::from(format!("Clear data for {}?", device)),
        Line::from(""),
        Line::from(Span::styled(
            "All stored samples for this device will be erased.",
            app.theme.muted,
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", app.theme.title),
            Span::raw(": confirm   "),
            Span::styled("n", app.theme.title),
            Span::raw(": cancel"),
        ]),
    ];

    let block = Block::default()
        .title(" Clear data ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.critical));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    let dialog_area = centered(area, 48, 9);
    frame.render_widget(Clear, dialog_area);
    frame.render_widget(paragraph, dialog_area);
}

/// A `width` x `height` rect centered in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
