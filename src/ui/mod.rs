//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`vitals`]: Device row, alert banners, latest panel, trend charts, footer
//! - [`common`]: Shared components (header, status bar, help, confirm dialog)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Devices (vitals::render_device_row)  │
//! ├──────────────────────────────────────┤
//! │ Alerts (vitals::render_alerts)       │
//! ├────────────┬─────────────────────────┤
//! │ Latest     │ Heart rate chart        │
//! │            │ SpO₂ chart              │
//! │            │ Temperature chart       │
//! ├────────────┴─────────────────────────┤
//! │ Footer (vitals::render_footer)       │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - vitals::render_device_picker
//!    - common::render_confirm_clear
//!    - common::render_help
//! ```

pub mod common;
pub mod theme;
pub mod vitals;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 16;

/// Draw the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let y = (area.height / 2).saturating_sub(2);
        let centered = Rect::new(0, y, area.width, 5u16.min(area.height - y));
        frame.render_widget(paragraph, centered);
        return;
    }

    let alert_rows = app.alerts().len() as u16;

    let chunks = Layout::vertical([
        Constraint::Length(1),          // Header bar
        Constraint::Length(1),          // Device row
        Constraint::Length(alert_rows), // Alert banners
        Constraint::Min(9),             // Latest + charts
        Constraint::Length(1),          // Footer
        Constraint::Length(1),          // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    vitals::render_device_row(frame, app, chunks[1]);
    if alert_rows > 0 {
        vitals::render_alerts(frame, app, chunks[2]);
    }
    vitals::render_body(frame, app, chunks[3]);
    vitals::render_footer(frame, app, chunks[4]);
    common::render_status_bar(frame, app, chunks[5]);

    if app.show_device_picker {
        vitals::render_device_picker(frame, app, area);
    }
    if app.pending_clear.is_some() {
        common::render_confirm_clear(frame, app, area);
    }
    if app.show_help {
        common::render_help(frame, app, area);
    }
}
