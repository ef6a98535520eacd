//! Validações de cadastro, perfil e senha
//!
//! As mensagens seguem as exibidas nas telas (pt-BR). O CPF passa apenas
//! pela checagem de formato: 11 dígitos que não sejam todos iguais.

use crate::models::UserProfile;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Função/cargo que exige a descrição da profissão
pub const OTHER_POSITION: &str = "Outro";

pub const REGISTRATION_FAILED_BANNER: &str = "Falha no cadastro. Verifique os campos destacados.";

/// Remove tudo que não for dígito
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// CPF válido: exatamente 11 dígitos, não todos iguais
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits = digits_only(cpf);
    if digits.len() != 11 {
        return false;
    }
    let first = digits.as_bytes()[0];
    !digits.bytes().all(|d| d == first)
}

/// Máscara progressiva `000.000.000-00`
pub fn format_cpf(value: &str) -> String {
    let digits: String = digits_only(value).chars().take(11).collect();
    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("{}.{}", &digits[..3], &digits[3..]),
        7..=9 => format!("{}.{}.{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => format!(
            "{}.{}.{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..]
        ),
    }
}

/// Formato mínimo de e-mail: contém "@" e "."
pub fn is_valid_email_shape(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

macro_rules! required {
    ($name:ident, $message:expr) => {
        fn $name(value: &str) -> Result<(), ValidationError> {
            if value.trim().is_empty() {
                return Err(error("required", $message));
            }
            Ok(())
        }
    };
}

required!(full_name_present, "Informe seu nome completo.");
required!(cro_present, "Informe o CRO.");
required!(position_present, "Selecione sua função/cargo.");
required!(health_unit_present, "Informe a unidade de saúde.");
required!(municipality_present, "Informe o município.");
required!(phone_present, "Informe o telefone.");

fn email_field(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "Informe o e-mail."));
    }
    if !is_valid_email_shape(value) {
        return Err(error("email", "E-mail inválido."));
    }
    Ok(())
}

fn cpf_field(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "Informe o CPF (apenas números)."));
    }
    if !is_valid_cpf(value) {
        return Err(error("cpf", "CPF inválido. Use 11 dígitos."));
    }
    Ok(())
}

fn password_field(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "Crie uma senha."));
    }
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(error(
            "length",
            "A senha deve ter no mínimo 6 caracteres.",
        ));
    }
    Ok(())
}

/// Dados da tela "Criar nova Conta"
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    #[validate(custom = "full_name_present")]
    pub full_name: String,
    #[validate(custom = "cro_present")]
    pub cro: String,
    #[validate(custom = "position_present")]
    pub position: String,
    pub other_profession: String,
    #[validate(custom = "health_unit_present")]
    pub health_unit: String,
    #[validate(custom = "municipality_present")]
    pub municipality: String,
    #[validate(custom = "email_field")]
    pub email: String,
    #[validate(custom = "phone_present")]
    pub phone: String,
    #[validate(custom = "cpf_field")]
    pub cpf: String,
    #[validate(custom = "password_field")]
    pub password: String,
    pub confirm_password: String,
}

/// Falha de cadastro: mensagem por campo e aviso geral
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    pub fields: BTreeMap<String, String>,
    pub banner: &'static str,
}

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    fn from_validation(errors: &ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    (field.to_string(), message)
                })
            })
            .collect();
        Self {
            fields,
            banner: REGISTRATION_FAILED_BANNER,
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.banner)?;
        for (field, message) in &self.fields {
            writeln!(f, "  {}: {}", field, message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl RegistrationForm {
    /// Validação completa, incluindo as regras que cruzam campos
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if self.position == OTHER_POSITION && self.other_profession.trim().is_empty() {
            errors.add("other_profession", error("required", "Descreva sua profissão."));
        }
        if self.confirm_password.trim().is_empty() {
            errors.add("confirm_password", error("required", "Confirme sua senha."));
        } else if self.password != self.confirm_password {
            errors.add(
                "confirm_password",
                error("must_match", "As senhas não coincidem."),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FieldErrors::from_validation(&errors))
        }
    }

    /// Perfil a ser salvo localmente a partir de um cadastro válido
    pub fn to_profile(&self) -> UserProfile {
        let position = if self.position.trim().is_empty() {
            OTHER_POSITION.to_string()
        } else {
            self.position.trim().to_string()
        };
        let other_profession = if position == OTHER_POSITION {
            self.other_profession.trim().to_string()
        } else {
            String::new()
        };
        UserProfile {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            health_unit: self.health_unit.trim().to_string(),
            municipality: self.municipality.trim().to_string(),
            state: String::new(),
            cns: String::new(),
            position,
            other_profession,
            cro: self.cro.trim().to_string(),
            cpf: digits_only(&self.cpf),
        }
    }
}

pub const PROFILE_REQUIRED_MESSAGE: &str = "Por favor, preencha todos os campos obrigatórios.";

/// Campos obrigatórios da edição de perfil
pub fn validate_profile(profile: &UserProfile) -> Result<(), &'static str> {
    let required = [
        &profile.full_name,
        &profile.email,
        &profile.cns,
        &profile.position,
        &profile.health_unit,
        &profile.municipality,
        &profile.state,
        &profile.phone,
    ];
    if required.iter().any(|value| value.trim().is_empty()) {
        return Err(PROFILE_REQUIRED_MESSAGE);
    }
    Ok(())
}

/// Regras da troca de senha
pub fn validate_password_change(new_password: &str, confirm: &str) -> Result<(), &'static str> {
    if new_password.is_empty() || confirm.is_empty() {
        return Err("Por favor, preencha todos os campos.");
    }
    if new_password != confirm {
        return Err("As senhas não coincidem.");
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err("A nova senha deve ter no mínimo 6 caracteres.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            full_name: "João da Silva".to_string(),
            cro: "SP-12345".to_string(),
            position: "Cirurgião-dentista".to_string(),
            other_profession: String::new(),
            health_unit: "UBS Centro".to_string(),
            municipality: "Ribeirão Preto".to_string(),
            email: "joao@ubs.gov.br".to_string(),
            phone: "(16) 99999-0000".to_string(),
            cpf: "123.456.789-09".to_string(),
            password: "segredo1".to_string(),
            confirm_password: "segredo1".to_string(),
        }
    }

    #[test]
    fn test_cpf_accepts_eleven_varied_digits() {
        assert!(is_valid_cpf("12345678909"));
        assert!(is_valid_cpf("123.456.789-09"));
    }

    #[test]
    fn test_cpf_rejects_wrong_length_and_repeated_digits() {
        assert!(!is_valid_cpf(""));
        assert!(!is_valid_cpf("1234567890"));
        assert!(!is_valid_cpf("123456789012"));
        assert!(!is_valid_cpf("abc"));
        for d in 0..=9 {
            let repeated = d.to_string().repeat(11);
            assert!(!is_valid_cpf(&repeated), "{}", repeated);
        }
        assert!(!is_valid_cpf("111.111.111-11"));
    }

    #[test]
    fn test_format_cpf_is_progressive() {
        assert_eq!(format_cpf("123"), "123");
        assert_eq!(format_cpf("1234"), "123.4");
        assert_eq!(format_cpf("1234567"), "123.456.7");
        assert_eq!(format_cpf("12345678909"), "123.456.789-09");
        assert_eq!(format_cpf("123.456.789-0999"), "123.456.789-09");
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email_shape("a@b.com"));
        assert!(!is_valid_email_shape("a.b.com"));
        assert!(!is_valid_email_shape("a@bcom"));
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(valid_form().check().is_ok());
    }

    #[test]
    fn test_registration_reports_each_field() {
        let form = RegistrationForm::default();
        let errors = form.check().unwrap_err();
        assert_eq!(errors.banner, REGISTRATION_FAILED_BANNER);
        assert_eq!(errors.get("full_name"), Some("Informe seu nome completo."));
        assert_eq!(errors.get("email"), Some("Informe o e-mail."));
        assert_eq!(errors.get("cpf"), Some("Informe o CPF (apenas números)."));
        assert_eq!(errors.get("password"), Some("Crie uma senha."));
        assert_eq!(errors.get("confirm_password"), Some("Confirme sua senha."));
        assert!(errors.get("other_profession").is_none());
    }

    #[test]
    fn test_registration_format_errors() {
        let form = RegistrationForm {
            email: "joao.ubs".to_string(),
            cpf: "000.000.000-00".to_string(),
            password: "123".to_string(),
            confirm_password: "124".to_string(),
            position: OTHER_POSITION.to_string(),
            ..valid_form()
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("email"), Some("E-mail inválido."));
        assert_eq!(errors.get("cpf"), Some("CPF inválido. Use 11 dígitos."));
        assert_eq!(
            errors.get("password"),
            Some("A senha deve ter no mínimo 6 caracteres.")
        );
        assert_eq!(errors.get("confirm_password"), Some("As senhas não coincidem."));
        assert_eq!(errors.get("other_profession"), Some("Descreva sua profissão."));
    }

    #[test]
    fn test_to_profile_normalizes_fields() {
        let profile = valid_form().to_profile();
        assert_eq!(profile.cpf, "12345678909");
        assert_eq!(profile.position, "Cirurgião-dentista");
        assert!(profile.other_profession.is_empty());

        let other = RegistrationForm {
            position: OTHER_POSITION.to_string(),
            other_profession: " Técnico em saúde bucal ".to_string(),
            ..valid_form()
        };
        assert_eq!(other.to_profile().other_profession, "Técnico em saúde bucal");
    }

    #[test]
    fn test_profile_requires_all_fields() {
        assert!(validate_profile(&UserProfile::sample()).is_ok());
        let missing_state = UserProfile {
            state: " ".to_string(),
            ..UserProfile::sample()
        };
        assert_eq!(validate_profile(&missing_state), Err(PROFILE_REQUIRED_MESSAGE));
    }

    #[test]
    fn test_password_change_rules() {
        assert_eq!(
            validate_password_change("", "abc"),
            Err("Por favor, preencha todos os campos.")
        );
        assert_eq!(
            validate_password_change("abcdef", "abcdeg"),
            Err("As senhas não coincidem.")
        );
        assert_eq!(
            validate_password_change("abc", "abc"),
            Err("A nova senha deve ter no mínimo 6 caracteres.")
        );
        assert!(validate_password_change("abcdef", "abcdef").is_ok());
    }
}
