use std::process::ExitCode;

use agro_cache::app::AgroApp;
use agro_cache::config::Command;
use agro_cache::config::Config;
use agro_cache::error::AppError;
use serde_json::json;

async fn execute(config: Config) -> Result<(), AppError> {
    let app = AgroApp::connect(&config).await?;

    let outcome = match &config.command {
        // Migrations already ran during connect when --migrate was given.
        Command::Migrate if config.migrate => Ok(json!({ "migrated": true })),
        Command::Migrate => app.store().migrate().await.map(|_| json!({ "migrated": true })).map_err(AppError::from),
        Command::Show { resource, id } => app.show(resource, *id).await,
        Command::Dashboard => app
            .dashboard()
            .all()
            .await
            .map_err(AppError::from)
            .and_then(|data| Ok(serde_json::to_value(data)?)),
        Command::Purge { pattern } => Ok(json!({ "removed": app.purge(pattern).await })),
    };

    // Close regardless of the outcome; the command's own error takes precedence.
    let closed = app.close().await;
    let value = outcome?;
    closed?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::load();

    #[cfg(feature = "tracing")]
    if let Err(err) = agro_cache::telemetry::init() {
        eprintln!("Failed to initialize tracing: {err}");
    }

    match execute(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("agro: {err}");
            ExitCode::FAILURE
        }
    }
}
