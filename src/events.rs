use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::App;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // The confirmation prompt is modal
    if app.pending_clear.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_clear(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                app.cancel_clear()
            }
            _ => {}
        }
        return;
    }

    if app.show_device_picker {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('d') => app.close_device_picker(),
            KeyCode::Up | KeyCode::Char('k') => app.picker_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.picker_next(),
            KeyCode::Enter => app.picker_confirm(),
            _ => {}
        }
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // Device switching
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.select_next_device(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.select_prev_device(),
        KeyCode::Char('d') | KeyCode::Enter => app.open_device_picker(),

        // Data actions
        KeyCode::Char('c') => app.request_clear(),
        KeyCode::Char('e') => app.show_export_link(),
        KeyCode::Char('r') => app.refresh(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp if app.show_device_picker => app.picker_prev(),
        MouseEventKind::ScrollDown if app.show_device_picker => app.picker_next(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::runtime::Handle;

    use super::*;
    use crate::app::AppOptions;
    use crate::data::DeviceId;
    use crate::poller::PollEvent;
    use crate::source::MemoryBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(backend: &MemoryBackend) -> App {
        let mut app = App::new(Arc::new(backend.clone()), AppOptions::default(), Handle::current());
        app.handle_poll_event(PollEvent::Devices {
            tick: 1,
            devices: vec![DeviceId::from("a"), DeviceId::from("b")],
        });
        app
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_prompt_is_modal() {
        let backend = MemoryBackend::new();
        let mut app = app(&backend);

        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert!(app.pending_clear.is_some());

        // Navigation is swallowed while the prompt is open
        handle_key_event(&mut app, key(KeyCode::Right));
        assert_eq!(app.state.selected(), Some(&DeviceId::from("b")));

        handle_key_event(&mut app, key(KeyCode::Char('n')));
        assert!(app.pending_clear.is_none());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(backend.clear_calls().is_empty());

        handle_key_event(&mut app, key(KeyCode::Char('c')));
        handle_key_event(&mut app, key(KeyCode::Char('y')));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(backend.clear_calls(), vec![DeviceId::from("b")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_device_keys() {
        let backend = MemoryBackend::new();
        let mut app = app(&backend);

        handle_key_event(&mut app, key(KeyCode::Left));
        assert_eq!(app.state.selected(), Some(&DeviceId::from("a")));
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.state.selected(), Some(&DeviceId::from("b")));

        handle_key_event(&mut app, key(KeyCode::Char('d')));
        assert!(app.show_device_picker);
        handle_key_event(&mut app, key(KeyCode::Up));
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.show_device_picker);
        assert_eq!(app.state.selected(), Some(&DeviceId::from("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_help_and_quit() {
        let backend = MemoryBackend::new();
        let mut app = app(&backend);

        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_key_shows_link() {
        let backend = MemoryBackend::new();
        let mut app = app(&backend);
        handle_key_event(&mut app, key(KeyCode::Char('e')));
        assert_eq!(app.get_status_message(), Some("Export CSV: memory://export"));
    }
}
