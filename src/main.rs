use anyhow::Result;
use clap::Parser;
use servicebay::app::App;
use servicebay::cli::Cli;
use servicebay::utils::get_log_dir;

/// Set up panic hook to restore terminal state on panic
fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn main() -> Result<()> {
    setup_panic_hook();

    // A missing .env is normal
    let _ = dotenvy::dotenv();

    let log_dir = get_log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout belongs to the TUI, so logs go to a file
    let file_appender = tracing_appender::rolling::never(&log_dir, "servicebay.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.execute() {
        Ok(true) => Ok(()),
        Ok(false) => App::new().and_then(|mut app| app.run()),
        Err(e) => Err(e),
    };

    drop(guard);
    result
}
