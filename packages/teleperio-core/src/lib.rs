//! TelePerio Core - Biblioteca compartilhada do fluxo de teleconsultoria
//!
//! Esta biblioteca fornece:
//! - Modelos de dados (casos, mensagens, perfil, credenciais)
//! - Formulário de abertura de caso em 7 etapas
//! - Repositório de casos em memória e filtros do painel
//! - Simulação da resposta do especialista e do chat
//! - Validações de cadastro (CPF, e-mail, senha)
//! - Armazenamento chave-valor local em SQLite

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

pub mod account;
pub mod chat;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod migrations;
pub mod models;
pub mod seed;
pub mod simulation;
pub mod storage;
pub mod store;
pub mod validation;
pub mod wizard;

/// Configuração do armazenamento local
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Caminho para o arquivo SQLite
    pub db_path: String,
    /// Número máximo de conexões no pool
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "data/teleperio.db".to_string(),
            max_connections: 2,
        }
    }
}

/// Inicializa o pool SQLite do armazenamento local e aplica as migrações
pub async fn init_storage_pool(config: &StorageConfig) -> Result<SqlitePool> {
    let db_path = Path::new(&config.db_path);

    // Verifica se o diretório pai existe
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .context("Falha ao criar diretório para o armazenamento local")?;
        }
    }

    let connection_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .pragma("synchronous", "NORMAL");

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connection_options)
        .await
        .context("Falha ao conectar ao banco SQLite local")?;

    migrations::run_migrations(&pool)
        .await
        .context("Falha ao aplicar migrações")?;

    info!("Armazenamento local inicializado: {}", config.db_path);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_storage_connection() -> Result<()> {
        let temp_dir = tempdir()?;
        let db_path = temp_dir.path().join("nested").join("test.db");

        let config = StorageConfig {
            db_path: db_path.to_str().unwrap().to_string(),
            max_connections: 1,
        };

        let pool = init_storage_pool(&config).await?;

        let result: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await?;
        assert_eq!(result.0, 1);
        assert!(db_path.exists());

        Ok(())
    }
}
