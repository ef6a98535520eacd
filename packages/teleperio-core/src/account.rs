//! Fluxos de conta simulados: cadastro, login, perfil e recuperação de senha
//!
//! Não há autenticação real. Os dados ficam apenas no armazenamento local.

use crate::error::StorageError;
use crate::models::{LoginCredentials, Role, UserProfile};
use crate::storage::{
    load_json, save_json, KeyValueStore, LOGIN_CREDENTIALS_KEY, USER_PROFILE_KEY,
};
use crate::validation::{
    digits_only, format_cpf, validate_password_change, validate_profile, FieldErrors,
    RegistrationForm,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

pub const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(900);

/// Código fixo aceito na verificação por e-mail
pub const SIMULATED_VERIFICATION_CODE: &str = "123456";

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(FieldErrors),

    #[error("{0}")]
    Rejected(&'static str),

    #[error("{}", .0.user_message())]
    Storage(#[from] StorageError),
}

/// Modo do campo identificador na tela de login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    Cpf,
    Email,
}

/// Valores para preencher a tela de login a partir do cadastro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPrefill {
    pub mode: LoginMode,
    pub identifier: String,
    pub password: String,
}

impl LoginPrefill {
    /// Papel das credenciais salvas
    pub fn role(&self) -> Role {
        match self.mode {
            LoginMode::Cpf => Role::Requester,
            LoginMode::Email => Role::Specialist,
        }
    }
}

/// Sessão aberta após o login simulado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identifier: String,
    pub role: Role,
}

pub struct AccountService {
    storage: Arc<dyn KeyValueStore>,
    login_delay: Duration,
}

impl AccountService {
    pub fn new(storage: Arc<dyn KeyValueStore>, login_delay: Duration) -> Self {
        Self {
            storage,
            login_delay,
        }
    }

    /// Valida o cadastro e salva perfil e credenciais localmente
    pub async fn register(&self, form: &RegistrationForm) -> Result<UserProfile, AccountError> {
        form.check().map_err(AccountError::Invalid)?;

        let profile = form.to_profile();
        let credentials = LoginCredentials {
            identifier: profile.cpf.clone(),
            password: form.password.clone(),
            user_type: Role::Requester,
        };

        if let Err(e) = save_json(self.storage.as_ref(), USER_PROFILE_KEY, &profile).await {
            error!("Falha ao salvar perfil: {}", e);
            return Err(e.into());
        }
        if let Err(e) = save_json(self.storage.as_ref(), LOGIN_CREDENTIALS_KEY, &credentials).await
        {
            error!("Falha ao salvar credenciais: {}", e);
            // Cadastro incompleto não deve deixar o perfil gravado
            if let Err(cleanup) = self.storage.remove_item(USER_PROFILE_KEY).await {
                warn!("Perfil do cadastro incompleto não removido: {}", cleanup);
            }
            return Err(e.into());
        }

        info!("Cadastro realizado para {}", profile.email);
        Ok(profile)
    }

    /// Credenciais salvas, formatadas para a tela de login
    pub async fn login_prefill(&self) -> Option<LoginPrefill> {
        let saved: Option<LoginCredentials> =
            match load_json(self.storage.as_ref(), LOGIN_CREDENTIALS_KEY).await {
                Ok(saved) => saved,
                Err(e) => {
                    warn!("Credenciais salvas ilegíveis: {}", e);
                    None
                }
            };

        saved.map(|credentials| match credentials.user_type {
            Role::Specialist => LoginPrefill {
                mode: LoginMode::Email,
                identifier: credentials.identifier,
                password: credentials.password,
            },
            Role::Requester => LoginPrefill {
                mode: LoginMode::Cpf,
                identifier: format_cpf(&credentials.identifier),
                password: credentials.password,
            },
        })
    }

    /// Login simulado: exige os dois campos e abre a sessão após um atraso fixo
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        role: Role,
    ) -> Result<Session, AccountError> {
        let identifier = if identifier.contains('@') {
            identifier.trim().to_string()
        } else {
            format_cpf(identifier)
        };
        if identifier.is_empty() || password.is_empty() {
            return Err(AccountError::Rejected("Por favor, preencha os campos."));
        }

        tokio::time::sleep(self.login_delay).await;
        info!("Sessão aberta para {} ({})", identifier, role);
        Ok(Session { identifier, role })
    }

    /// Perfil exibido: o salvo no cadastro sobreposto ao perfil padrão
    pub async fn load_profile(&self) -> UserProfile {
        match load_json::<UserProfile>(self.storage.as_ref(), USER_PROFILE_KEY).await {
            Ok(Some(saved)) => UserProfile::sample().overlay(&saved),
            Ok(None) => UserProfile::sample(),
            Err(e) => {
                warn!("Perfil salvo ilegível: {}", e);
                UserProfile::sample()
            }
        }
    }

    pub async fn save_profile(&self, profile: &UserProfile) -> Result<(), AccountError> {
        validate_profile(profile).map_err(AccountError::Rejected)?;
        let mut profile = profile.clone();
        profile.cpf = digits_only(&profile.cpf);
        profile.state = profile.state.trim().to_uppercase();
        save_json(self.storage.as_ref(), USER_PROFILE_KEY, &profile).await?;
        info!("Perfil atualizado");
        Ok(())
    }

    /// "Esqueci a senha": apenas confirma o envio do código
    pub fn forgot_password(&self, email: &str) -> Result<String, AccountError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AccountError::Rejected("Por favor, insira um e-mail válido."));
        }
        Ok(format!(
            "Um código de verificação foi enviado para {}.",
            email
        ))
    }

    pub fn verify_code(&self, code: &str) -> Result<(), AccountError> {
        if code.trim() == SIMULATED_VERIFICATION_CODE {
            Ok(())
        } else {
            Err(AccountError::Rejected(
                "CÓDIGO INCORRETO! Um novo código foi enviado por e-mail.",
            ))
        }
    }

    /// Troca de senha. Se houver credenciais salvas, a senha delas é atualizada.
    pub async fn change_password(
        &self,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), AccountError> {
        validate_password_change(new_password, confirm).map_err(AccountError::Rejected)?;

        let saved: Option<LoginCredentials> =
            load_json(self.storage.as_ref(), LOGIN_CREDENTIALS_KEY).await?;
        if let Some(mut credentials) = saved {
            credentials.password = new_password.to_string();
            save_json(self.storage.as_ref(), LOGIN_CREDENTIALS_KEY, &credentials).await?;
        }
        info!("Senha alterada");
        Ok(())
    }
}
