//! Server binary: loads env config, opens the database, serves the API.

use notemark_core::DEFAULT_PORT;
use notemark_server::{config::Config, db::Database, serve_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Options accepted on the command line; everything else comes from env vars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CliFlags {
    show_help: bool,
    prune_sessions: bool,
}

/// Parse command-line arguments with the program name already stripped.
fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args {
        match arg.as_str() {
            "--help" => flags.show_help = true,
            "--prune-sessions" => flags.prune_sessions = true,
            other if other.starts_with('-') => {
                anyhow::bail!("Unrecognized option '{}' (see --help)", other)
            }
            other => anyhow::bail!("Unexpected argument '{}' (see --help)", other),
        }
    }
    Ok(flags)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notemark=info,tower_http=warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let flags = parse_args(std::env::args().skip(1))?;
    if flags.show_help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    let db = Database::new(&config.db_path)?;

    if flags.prune_sessions {
        let removed = db.sessions.prune_expired()?;
        println!("Removed {} expired session(s)", removed);
        return Ok(());
    }

    // Expired sessions accumulate between runs; clear them at startup.
    match db.sessions.prune_expired() {
        Ok(0) => {}
        Ok(removed) => tracing::info!("Dropped {} expired session(s) at startup", removed),
        Err(err) => tracing::warn!("Session pruning at startup failed: {}", err),
    }

    let app_state = AppState::new(config.clone(), db);

    let allow_public = notemark_server::config::env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!(
            "ALLOW_PUBLIC_ACCESS is set; cross-origin requests will be accepted from anywhere"
        );
    }

    let bind_addr = notemark_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Listening on non-loopback address {}; make sure access is restricted upstream",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let served_at = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("Notemark listening on http://{}", served_at);

    serve_router(listener, app_state, allow_public, shutdown_signal()).await?;

    Ok(())
}

fn print_help() {
    println!(
        "\
Notemark server

Usage: notemark [OPTIONS]

Options:
  --prune-sessions   Delete expired session rows and exit
  --help             Show this help text

Environment:
  DB_PATH              Database location (default: ~/.local/share/notemark/db)
  PORT                 Listen port (default: {port})
  MAX_NOTE_SIZE        Largest accepted note body in bytes (default: 2MB)
  SESSION_TTL_HOURS    Hours a login session stays valid (default: 24)
  ALLOW_PUBLIC_ACCESS  Accept cross-origin requests from anywhere
  BIND                 Bind address override (e.g. 0.0.0.0:{port})",
        port = DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install Ctrl+C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = sigterm => {},
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_args, CliFlags};

    fn owned(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn known_flags_parse_in_any_combination() {
        let flags = parse_args(owned(&["--prune-sessions", "--help"])).expect("parse");
        assert_eq!(
            flags,
            CliFlags {
                show_help: true,
                prune_sessions: true,
            }
        );
        assert_eq!(parse_args(owned(&[])).expect("parse"), CliFlags::default());
    }

    #[test]
    fn unknown_flags_and_positional_arguments_are_rejected() {
        let unknown =
            parse_args(owned(&["--prune-session"])).expect_err("typo should not parse");
        assert!(unknown.to_string().contains("Unrecognized option"));

        let positional =
            parse_args(owned(&["prune"])).expect_err("positional should not parse");
        assert!(positional.to_string().contains("Unexpected argument"));
    }
}
