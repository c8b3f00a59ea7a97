use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::{Handle, Runtime};

use vitals_watch::ui::Theme;
use vitals_watch::{events, telemetry, ui, App, AppOptions, Backend, HttpBackend, Settings};

#[derive(Parser, Debug)]
#[command(name = "vitals-watch")]
#[command(about = "Live terminal dashboard for bedside vitals telemetry")]
struct Args {
    /// Telemetry server base URL (default: http://localhost:5000)
    #[arg(short, long)]
    server: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device catalog refresh interval (e.g., "15s")
    #[arg(long)]
    device_interval: Option<String>,

    /// Record fetch interval (e.g., "1s", "500ms")
    #[arg(long)]
    sample_interval: Option<String>,

    /// HTTP request timeout (e.g., "5s")
    #[arg(long)]
    timeout: Option<String>,

    /// SpO₂ percentage below which an alert is raised
    #[arg(long)]
    spo2_low: Option<f64>,

    /// Heart rate below which an alert is raised
    #[arg(long)]
    hr_low: Option<f64>,

    /// Heart rate above which an alert is raised
    #[arg(long)]
    hr_high: Option<f64>,

    /// Device to select on startup
    #[arg(short, long)]
    device: Option<String>,

    /// Log file path (default: vitals-watch.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the CSV export link and exit
    #[arg(long)]
    print_export_link: bool,
}

impl Args {
    /// Command-line flags take precedence over file and environment.
    fn apply(&self, settings: &mut Settings) {
        if let Some(ref server) = self.server {
            settings.server = server.clone();
        }
        if let Some(ref interval) = self.device_interval {
            settings.device_interval = interval.clone();
        }
        if let Some(ref interval) = self.sample_interval {
            settings.sample_interval = interval.clone();
        }
        if let Some(ref timeout) = self.timeout {
            settings.timeout = timeout.clone();
        }
        if let Some(spo2_low) = self.spo2_low {
            settings.thresholds.spo2_low = spo2_low;
        }
        if let Some(hr_low) = self.hr_low {
            settings.thresholds.hr_low = hr_low;
        }
        if let Some(hr_high) = self.hr_high {
            settings.thresholds.hr_high = hr_high;
        }
        if let Some(ref device) = self.device {
            settings.device = Some(device.clone());
        }
        if let Some(ref log_file) = self.log_file {
            settings.log_file = log_file.clone();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    let backend = HttpBackend::builder()
        .endpoint(settings.server.as_str())
        .timeout(settings.request_timeout()?)
        .build()?;

    if args.print_export_link {
        println!("{}", backend.export_link());
        return Ok(());
    }

    let sink = telemetry::open_log_file(&settings.log_file)?;
    telemetry::init_subscriber(telemetry::get_subscriber("info", sink))?;

    let options = AppOptions {
        poller: settings.poller_config()?,
        thresholds: settings.thresholds.clone(),
        initial_device: settings.initial_device(),
        theme: Theme::auto_detect(),
    };

    tracing::info!(server = %settings.server, "Starting vitals-watch");

    // Fetch tasks run on the runtime while the UI loop owns the main thread
    let rt = Runtime::new()?;
    let result = run_tui(Arc::new(backend), options, rt.handle().clone());

    // Don't wait on requests still in flight
    rt.shutdown_timeout(Duration::from_millis(500));

    result
}

/// Run the TUI against the given backend
fn run_tui(backend: Arc<dyn Backend>, options: AppOptions, runtime: Handle) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(backend, options, runtime);
    app.start();

    let result = run_app(&mut terminal, &mut app);

    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.drain_events();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
