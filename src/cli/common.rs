//! Common CLI utilities shared across all CLI commands.
//!
//! - `CliContext`: loaded config plus a runtime for the async services
//! - Output helpers: `print_success`, `print_error`, `print_warning`, `print_info`
//! - Prompt helpers: `prompt_string`, `prompt_secret`

use crate::api::BackendClient;
use crate::auth::{IdentityProvider, SupabaseAuth, User};
use crate::config::{Config, Resolver};
use crate::utils::{get_config_path, get_session_path};
use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// Shared context for CLI commands.
pub struct CliContext {
    pub config: Config,
    pub config_path: PathBuf,
    runtime: Runtime,
    http: Client,
}

impl CliContext {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path();
        let config = Config::load(&config_path).context("Failed to load configuration")?;
        let http = config.http_client()?;
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        Ok(Self {
            config,
            config_path,
            runtime,
            http,
        })
    }

    /// Drive a future to completion on the context's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn auth(&self) -> Result<SupabaseAuth> {
        self.config
            .identity_provider(self.http.clone(), Some(get_session_path()))
    }

    pub fn backend(&self) -> Result<BackendClient> {
        self.config.backend_client(self.http.clone())
    }

    pub fn resolver(&self) -> Result<Resolver> {
        self.config.resolver(self.http.clone())
    }

    /// The signed-in user from the stored session.
    pub fn current_user(&self) -> Result<Option<User>> {
        let auth = self.auth()?;
        let session = self.block_on(auth.get_session())?;
        Ok(session.map(|s| s.user))
    }

    pub fn require_user(&self) -> Result<User> {
        self.current_user()?
            .context("Not signed in. Run 'servicebay login <email>' first.")
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

pub fn print_success(msg: &str) {
    println!("\u{2713} {}", msg);
}

/// Print an error message with an X prefix to stderr.
pub fn print_error(msg: &str) {
    eprintln!("\u{2717} {}", msg);
}

pub fn print_warning(msg: &str) {
    println!("\u{26A0}\u{FE0F} {}", msg);
}

pub fn print_info(msg: &str) {
    println!("\u{2139}\u{FE0F} {}", msg);
}

// =============================================================================
// Prompt Helpers
// =============================================================================

/// Prompt for a line of input. Returns the trimmed text.
pub fn prompt_string(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt for a value that should not be echoed.
pub fn prompt_secret(label: &str) -> Result<String> {
    crossterm::terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    let result = read_hidden(label);
    crossterm::terminal::disable_raw_mode().context("Failed to disable raw mode")?;
    println!();
    result
}

fn read_hidden(label: &str) -> Result<String> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

    print!("{}: ", label);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read().context("Failed to read input")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(secret),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                anyhow::bail!("Cancelled");
            }
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char(c) => secret.push(c),
            _ => {}
        }
    }
}
