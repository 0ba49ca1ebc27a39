use std::fs::File;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use posdesk::action::Action;
use posdesk::app::App;
use posdesk::backend::Backend;
use posdesk::config::Config;
use posdesk::demo::DemoBackend;
use posdesk::error::AppError;
use posdesk::http::HttpBackend;
use posdesk::tui::{self, Event, EventHandler};
use posdesk::ui;

/// Browse and update point-of-sale orders and products
#[derive(Debug, Parser)]
#[command(name = "posdesk", version, about)]
struct Cli {
    /// Use built-in sample data instead of the API
    #[arg(long)]
    demo: bool,

    /// API base URL, e.g. http://localhost:8080/api/v1
    #[arg(long)]
    api_url: Option<String>,

    /// Initial page size for every list
    #[arg(long)]
    page_size: Option<usize>,

    /// Config file (default: <config dir>/posdesk/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// The terminal is ours, so logs go to a file when one can be created.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_file = dirs::cache_dir()
        .map(|dir| dir.join("posdesk"))
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir))
        .and_then(|dir| File::create(dir.join("posdesk.log")).ok());

    match log_file {
        Some(file) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        None => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn build_backend(cli: &Cli, config: &Config) -> Result<Arc<dyn Backend>, AppError> {
    if cli.demo {
        return Ok(Arc::new(DemoBackend::default()));
    }
    let token = config.token().ok_or_else(|| {
        AppError::Auth(format!(
            "{} environment variable not set (or run with --demo)",
            config.api.token_env
        ))
    })?;
    let base_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config.api.base_url.clone());
    Ok(Arc::new(HttpBackend::new(base_url, token)?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(size) = cli.page_size {
        config.lists.page_size = size;
    }

    let backend = build_backend(&cli, &config)?;
    info!(backend = backend.name(), "starting");

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(backend, &config).await;

    tui::restore()?;

    result
}

async fn run(backend: Arc<dyn Backend>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut app = App::new(backend, config, action_tx.clone());

    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16);
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
