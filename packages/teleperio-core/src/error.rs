//! Definições de erro para a biblioteca teleperio-core
//!
//! Este módulo define os tipos de erro do armazenamento local e do fluxo de casos

use thiserror::Error;

/// Erros do armazenamento chave-valor local
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Erro de conexão com armazenamento local: {0}")]
    ConnectionError(String),

    #[error("Erro de consulta: {0}")]
    QueryError(String),

    #[error("Erro de serialização: {0}")]
    SerializationError(String),

    #[error("Erro interno: {0}")]
    InternalError(String),
}

impl StorageError {
    /// Mensagem genérica exibida ao usuário quando a gravação local falha
    pub fn user_message(&self) -> &'static str {
        "Falha ao salvar dados localmente. Tente novamente."
    }
}

/// Conversão de erros específicos do SQLx para nossos tipos de erro
impl From<sqlx::Error> for StorageError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Database(dbe) => StorageError::QueryError(dbe.message().to_string()),
            sqlx::Error::ColumnNotFound(col) => {
                StorageError::QueryError(format!("Coluna não encontrada: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                StorageError::QueryError(format!("Erro ao decodificar coluna {}: {}", index, source))
            }
            sqlx::Error::Io(io_err) => StorageError::ConnectionError(io_err.to_string()),
            sqlx::Error::Configuration(conf_err) => {
                StorageError::ConnectionError(conf_err.to_string())
            }
            sqlx::Error::PoolClosed => {
                StorageError::ConnectionError("Pool de conexões fechado".to_string())
            }
            sqlx::Error::PoolTimedOut => {
                StorageError::ConnectionError("Timeout no pool de conexões".to_string())
            }
            _ => StorageError::InternalError(format!("Erro inesperado: {:?}", error)),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        StorageError::SerializationError(error.to_string())
    }
}

/// Erros das operações sobre casos
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CaseError {
    #[error("Caso não encontrado: {0}")]
    NotFound(String),

    #[error("Já existe um caso com o identificador {0}")]
    DuplicateId(String),

    #[error("O envio só é permitido na última etapa (etapa atual: {0})")]
    NotOnFinalStep(u8),

    #[error("Resposta já enviada para o caso {0}")]
    AlreadyResponded(String),

    #[error("A resposta do especialista não pode ser vazia")]
    EmptyResponse,

    #[error("Apenas o solicitante pode abrir novos casos")]
    RoleNotAllowed,
}
