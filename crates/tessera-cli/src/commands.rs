use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tracing::{error, info};

use tessera_runtime::{init_logging, AppConfig, Application, StorageEngine};
use tessera_server::AdminServer;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::CheckConfig(args) => cmd_check_config(args, &cli.format),
        Command::Defaults => cmd_defaults(&cli.format),
    }
}

/// Read `path`, or fall back to defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

/// Assemble the application described by `config`.
pub fn assemble(config: &AppConfig, app: Application) -> Application {
    if config.http.enabled {
        app.with_module(AdminServer::new(config.http.clone()))
    } else {
        app
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
        config.validate()?;
    }

    let log_level = init_logging(&config.logging)?;
    let storage = StorageEngine::new(config.storage.clone());
    let mut app = assemble(
        &config,
        Application::new(config.name.clone(), storage, log_level),
    );

    app.configure()?;
    info!(app = %config.name, modules = ?app.module_names(), "configured");
    app.run_until(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C");
    }
}

fn cmd_check_config(args: CheckConfigArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = load_config(Some(args.config.as_path()))?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => {
            println!(
                "{} {} is valid",
                "✓".green().bold(),
                args.config.display().to_string().bold()
            );
            println!("  name:        {}", config.name.cyan());
            println!(
                "  logging:     {} ({:?})",
                config.logging.level.yellow(),
                config.logging.format
            );
            println!(
                "  storage:     {} workers, queue depth {}, auto-index {}",
                config.storage.workers.to_string().bold(),
                config.storage.queue_depth,
                config.storage.auto_index
            );
            if !config.storage.namespaces.is_empty() {
                println!("  namespaces:  {}", config.storage.namespaces.join(", "));
            }
            if config.http.enabled {
                println!("  http:        {}", config.http.address.green());
            } else {
                println!("  http:        {}", "disabled".dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_defaults(format: &OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::default();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tessera_runtime::{HttpConfig, LogLevelHandle};

    #[test]
    fn missing_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn load_reports_path_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\nworkers = 0").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("loading configuration"));
    }

    #[test]
    fn http_module_added_only_when_enabled() {
        let level = LogLevelHandle::detached("info").unwrap();
        let mut config = AppConfig::default();

        let app = assemble(
            &config,
            Application::new("t", StorageEngine::new(config.storage.clone()), level.clone()),
        );
        assert_eq!(app.module_names(), vec!["storage"]);

        config.http = HttpConfig {
            enabled: true,
            ..Default::default()
        };
        let app = assemble(
            &config,
            Application::new("t", StorageEngine::new(config.storage.clone()), level),
        );
        assert_eq!(app.module_names(), vec!["storage", "http"]);
    }
}
