use std::process::ExitCode;

use geocoder::{Session, SessionOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        eprintln!("usage: geocoder <query>");
        eprintln!();
        eprintln!("Options are read from GEOCODE_* environment variables, e.g.");
        eprintln!("  GEOCODE_SERVICE, GEOCODE_EMAIL, GEOCODE_CACHE_FILE, GEOCODE_DELAY");
        return ExitCode::from(2);
    }

    let session = match Session::new(&SessionOptions::new()) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let places = match session.geocode(&query).await {
        Ok(places) => places,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&places) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
