//! authkeep - sign in to an API from the terminal and keep the session.
//!
//! A thin front end over `authkeep-core`: every command builds the session
//! controller, settles the stored session, and calls one operation.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};
use authkeep_core::api::{ApiRequest, Method};
use authkeep_core::{Config, SessionController, Transport};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Env var naming a directory for a log file, in addition to stderr
const ENV_LOG_DIR: &str = "AUTHKEEP_LOG_DIR";

const LOG_FILE_PREFIX: &str = "authkeep.log";

const USAGE: &str = "\
Usage: authkeep <command> [args]

Commands:
  status                 Show whether a stored session is valid
  login [email]          Sign in and store the issued tokens
  register [email]       Create an account (does not sign in)
  whoami                 Show the signed-in account
  refresh                Renew the stored tokens
  logout                 Forget the stored tokens
  request <method> <path> [json]
                         Send an authorized request and print the response
  help                   Show this message

Environment:
  AUTHKEEP_API_URL, AUTHKEEP_TOKEN_BACKEND, AUTHKEEP_LOCALE,
  AUTHKEEP_TIMEOUT_SECS, AUTHKEEP_LOG_DIR, RUST_LOG";

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until exit so buffered file logs are flushed.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(ENV_LOG_DIR) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(PathBuf::from(dir), LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("status");
    let rest = args.get(1..).unwrap_or(&[]);

    if matches!(command, "help" | "-h" | "--help") {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = Config::load()?;
    let session = SessionController::from_config(&config)?;
    info!(command, base_url = %config.api_base_url, "authkeep starting");

    match command {
        "status" => status(&session).await,
        "login" => login(&session, &mut config, rest.first().cloned()).await,
        "register" => register(&session, &config, rest.first().cloned()).await,
        "whoami" => whoami(&session).await,
        "refresh" => refresh(&session).await,
        "logout" => logout(&session).await,
        "request" => request(&session, rest).await,
        other => {
            eprintln!("{}", USAGE);
            bail!("Unknown command: {}", other)
        }
    }
}

async fn status(session: &SessionController) -> Result<()> {
    let state = session.initialize().await;
    println!("{}", state);
    Ok(())
}

async fn login(
    session: &SessionController,
    config: &mut Config,
    email: Option<String>,
) -> Result<()> {
    session.initialize().await;

    let email = match email {
        Some(email) => email,
        None => prompt_email(config.last_email.as_deref())?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    let user = session.login(&email, &password).await?;

    config.last_email = Some(user.email.clone());
    if let Err(e) = config.save() {
        tracing::warn!(error = %e, "Failed to save config");
    }

    println!("Signed in as {} ({})", user.email, user.role);
    Ok(())
}

async fn register(session: &SessionController, config: &Config, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_email(config.last_email.as_deref())?,
    };
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;

    let user = session.register(&email, &password, &confirm).await?;

    println!("Registered {}. Run `authkeep login` to sign in.", user.email);
    Ok(())
}

async fn whoami(session: &SessionController) -> Result<()> {
    let state = session.initialize().await;
    let Some(user) = state.user() else {
        bail!("Not signed in");
    };
    println!("{}", serde_json::to_string_pretty(user)?);
    Ok(())
}

async fn refresh(session: &SessionController) -> Result<()> {
    let tokens = session.refresh().await?;
    println!(
        "Session renewed, access token valid for {} more minutes",
        tokens.time_until_expiry().num_minutes().max(0)
    );
    Ok(())
}

async fn logout(session: &SessionController) -> Result<()> {
    session.initialize().await;
    session.logout().await?;
    println!("Signed out");
    Ok(())
}

async fn request(session: &SessionController, args: &[String]) -> Result<()> {
    let (method, path) = match args {
        [method, path, ..] => (method, path),
        _ => bail!("Usage: authkeep request <method> <path> [json]"),
    };
    let method = Method::parse(method)
        .ok_or_else(|| anyhow::anyhow!("Unsupported method: {}", method))?;

    let mut api_request = ApiRequest::new(method, path.clone());
    if let Some(raw) = args.get(2) {
        api_request = api_request.with_body(serde_json::from_str(raw)?);
    }

    session.initialize().await;
    let response = session.gateway().transport().send(api_request).await?;

    println!("{}", response.status);
    println!("{}", response.body);
    if response.is_unauthorized() {
        eprintln!("Session is no longer valid; stored tokens were cleared.");
    }
    Ok(())
}

fn prompt_email(last_email: Option<&str>) -> Result<String> {
    match last_email {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), last_email) {
        (true, Some(last)) => Ok(last.to_string()),
        (true, None) => bail!("Email required"),
        (false, _) => Ok(input.to_string()),
    }
}
