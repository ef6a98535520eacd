//! Configuração da aplicação
//!
//! Ordem de precedência: valores padrão, variáveis de ambiente e por fim as
//! opções da linha de comando.

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use std::time::Duration;
use teleperio_core::account::DEFAULT_LOGIN_DELAY;
use teleperio_core::chat::DEFAULT_REPLY_DELAY;
use teleperio_core::simulation::DEFAULT_RESPONSE_DELAY;
use teleperio_core::StorageConfig;

pub const ENV_DB_PATH: &str = "TELEPERIO_DB_PATH";
pub const ENV_RESPONSE_DELAY_MS: &str = "TELEPERIO_RESPONSE_DELAY_MS";
pub const ENV_CHAT_REPLY_DELAY_MS: &str = "TELEPERIO_CHAT_REPLY_DELAY_MS";
pub const ENV_LOGIN_DELAY_MS: &str = "TELEPERIO_LOGIN_DELAY_MS";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub response_delay: Duration,
    pub chat_reply_delay: Duration,
    pub login_delay: Duration,
    pub json_output: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            response_delay: DEFAULT_RESPONSE_DELAY,
            chat_reply_delay: DEFAULT_REPLY_DELAY,
            login_delay: DEFAULT_LOGIN_DELAY,
            json_output: false,
        }
    }
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    match lookup(key) {
        Some(raw) => {
            let millis: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{} deve ser um número de milissegundos", key))?;
            Ok(Some(Duration::from_millis(millis)))
        }
        None => Ok(None),
    }
}

impl AppConfig {
    /// Carrega a configuração do ambiente do processo
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Carrega a configuração a partir de uma função de consulta de variáveis
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            config.storage.db_path = path;
        }
        if let Some(delay) = parse_millis(&lookup, ENV_RESPONSE_DELAY_MS)? {
            config.response_delay = delay;
        }
        if let Some(delay) = parse_millis(&lookup, ENV_CHAT_REPLY_DELAY_MS)? {
            config.chat_reply_delay = delay;
        }
        if let Some(delay) = parse_millis(&lookup, ENV_LOGIN_DELAY_MS)? {
            config.login_delay = delay;
        }

        Ok(config)
    }

    /// Aplica as opções globais da linha de comando
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(path) = &args.db_path {
            self.storage.db_path = path.clone();
        }
        if let Some(ms) = args.response_delay_ms {
            self.response_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = args.chat_reply_delay_ms {
            self.chat_reply_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = args.login_delay_ms {
            self.login_delay = Duration::from_millis(ms);
        }
        self.json_output = args.json;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.storage.db_path, "data/teleperio.db");
        assert_eq!(config.response_delay, Duration::from_secs(5));
        assert_eq!(config.chat_reply_delay, Duration::from_millis(1500));
        assert_eq!(config.login_delay, Duration::from_millis(900));
        assert!(!config.json_output);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/tp.db"),
            (ENV_RESPONSE_DELAY_MS, "250"),
            (ENV_LOGIN_DELAY_MS, " 0 "),
        ]))
        .unwrap();
        assert_eq!(config.storage.db_path, "/tmp/tp.db");
        assert_eq!(config.response_delay, Duration::from_millis(250));
        assert_eq!(config.login_delay, Duration::ZERO);
        assert_eq!(config.chat_reply_delay, DEFAULT_REPLY_DELAY);
    }

    #[test]
    fn test_invalid_delay_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_CHAT_REPLY_DELAY_MS, "rápido")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_CHAT_REPLY_DELAY_MS));
    }

    #[test]
    fn test_flags_win_over_environment() {
        let config = AppConfig::from_lookup(lookup_from(&[(ENV_RESPONSE_DELAY_MS, "250")]))
            .unwrap()
            .with_overrides(&GlobalArgs {
                response_delay_ms: Some(10),
                db_path: Some("outro.db".to_string()),
                json: true,
                ..Default::default()
            });
        assert_eq!(config.response_delay, Duration::from_millis(10));
        assert_eq!(config.storage.db_path, "outro.db");
        assert!(config.json_output);
    }
}
