//! Definição da linha de comando

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use teleperio_core::dashboard::DashboardTab;
use teleperio_core::models::{Referral, Role};
use teleperio_core::validation::RegistrationForm;

#[derive(Parser, Debug)]
#[command(name = "teleperio")]
#[command(about = "TelePerio - Teleconsultoria em periodontia (protótipo local)")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Opções que sobrepõem a configuração lida do ambiente
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Arquivo SQLite do armazenamento local
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Atraso da resposta simulada do especialista (ms)
    #[arg(long, global = true)]
    pub response_delay_ms: Option<u64>,

    /// Atraso das réplicas simuladas do chat (ms)
    #[arg(long, global = true)]
    pub chat_reply_delay_ms: Option<u64>,

    /// Atraso do login simulado (ms)
    #[arg(long, global = true)]
    pub login_delay_ms: Option<u64>,

    /// Saída em JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cria uma nova conta de solicitante
    Register(RegisterArgs),

    /// Login simulado
    Login {
        /// CPF ou e-mail. Sem valor, usa as credenciais salvas
        #[arg(short, long)]
        identifier: Option<String>,

        #[arg(short, long)]
        password: Option<String>,

        /// solicitante ou especialista. Sem valor, segue as credenciais salvas
        #[arg(short, long)]
        role: Option<Role>,
    },

    /// Perfil do usuário
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// Solicita o código de recuperação de senha
    ForgotPassword {
        email: String,
    },

    /// Confere o código de verificação recebido
    VerifyCode {
        code: String,
    },

    /// Define uma nova senha
    ChangePassword {
        #[arg(long)]
        new_password: String,

        #[arg(long)]
        confirm: String,
    },

    /// Painel de casos por aba
    Dashboard {
        #[arg(short, long, default_value = "solicitante")]
        role: Role,

        /// pending, in_analysis ou responded. Sem valor, mostra todas
        #[arg(short, long)]
        tab: Option<DashboardTab>,
    },

    /// Abre um novo caso a partir de um formulário em JSON
    NewCase {
        /// Arquivo JSON com os campos do formulário
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Aguarda a resposta simulada do especialista
        #[arg(long)]
        wait: bool,
    },

    /// Detalhe de um caso
    Case {
        id: String,

        #[arg(short, long, default_value = "solicitante")]
        role: Role,
    },

    /// Envia mensagens no chat de um caso
    Chat {
        id: String,

        #[arg(short, long, default_value = "solicitante")]
        role: Role,

        /// Mensagens a enviar, em ordem
        #[arg(short, long = "message")]
        messages: Vec<String>,
    },

    /// Resposta formal do especialista
    Respond(RespondArgs),

    /// Percorre o fluxo completo com dados de exemplo
    Demo,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Mostra o perfil atual
    Show,

    /// Altera campos do perfil
    Edit(ProfileEditArgs),
}

#[derive(Args, Debug, Default)]
pub struct RegisterArgs {
    #[arg(long, default_value = "")]
    pub full_name: String,
    #[arg(long, default_value = "")]
    pub cro: String,
    #[arg(long, default_value = "")]
    pub position: String,
    #[arg(long, default_value = "")]
    pub other_profession: String,
    #[arg(long, default_value = "")]
    pub health_unit: String,
    #[arg(long, default_value = "")]
    pub municipality: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub cpf: String,
    #[arg(long, default_value = "")]
    pub password: String,
    #[arg(long, default_value = "")]
    pub confirm_password: String,
}

impl From<RegisterArgs> for RegistrationForm {
    fn from(args: RegisterArgs) -> Self {
        RegistrationForm {
            full_name: args.full_name,
            cro: args.cro,
            position: args.position,
            other_profession: args.other_profession,
            health_unit: args.health_unit,
            municipality: args.municipality,
            email: args.email,
            phone: args.phone,
            cpf: args.cpf,
            password: args.password,
            confirm_password: args.confirm_password,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ProfileEditArgs {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub health_unit: Option<String>,
    #[arg(long)]
    pub municipality: Option<String>,
    /// UF
    #[arg(long)]
    pub state: Option<String>,
    /// Cartão SUS
    #[arg(long)]
    pub cns: Option<String>,
    #[arg(long)]
    pub position: Option<String>,
}

#[derive(Args, Debug)]
pub struct RespondArgs {
    pub id: String,

    /// Orientação ao solicitante
    #[arg(long)]
    pub text: String,

    /// Sim ou Não
    #[arg(long)]
    pub referral: Option<Referral>,

    #[arg(long)]
    pub specialty: Option<String>,

    /// Tempo de retorno ou nova consulta
    #[arg(long)]
    pub return_interval: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dashboard_with_global_flags() {
        let cli = Cli::try_parse_from([
            "teleperio",
            "dashboard",
            "--role",
            "especialista",
            "--tab",
            "in_analysis",
            "--json",
        ])
        .unwrap();

        assert!(cli.global.json);
        match cli.command {
            Command::Dashboard { role, tab } => {
                assert_eq!(role, Role::Specialist);
                assert_eq!(tab, Some(DashboardTab::InAnalysis));
            }
            other => panic!("comando inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_parse_chat_messages_in_order() {
        let cli = Cli::try_parse_from([
            "teleperio", "chat", "s002", "-m", "primeira", "-m", "segunda",
        ])
        .unwrap();
        match cli.command {
            Command::Chat { id, role, messages } => {
                assert_eq!(id, "s002");
                assert_eq!(role, Role::Requester);
                assert_eq!(messages, vec!["primeira", "segunda"]);
            }
            other => panic!("comando inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_role_is_rejected() {
        assert!(Cli::try_parse_from(["teleperio", "dashboard", "--role", "admin"]).is_err());
    }
}
