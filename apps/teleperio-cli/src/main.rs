//! TelePerio CLI
//!
//! Protótipo local do fluxo de teleconsultoria em periodontia: cadastro,
//! login simulado, abertura de casos, painel, chat e resposta do especialista.

mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::AppConfig;
use tracing_subscriber::EnvFilter;

/// `json` para logs estruturados
const LOG_FORMAT_ENV: &str = "TELEPERIO_LOG_FORMAT";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs vão para stderr; stdout fica livre para a saída dos comandos
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("teleperio=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if std::env::var(LOG_FORMAT_ENV).as_deref() == Ok("json") {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }

    let cli = Cli::parse();
    let config = AppConfig::from_env()?.with_overrides(&cli.global);
    tracing::debug!("Configuração carregada: {:?}", config);

    commands::run(cli.command, &config).await
}
