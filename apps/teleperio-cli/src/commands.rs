//! Execução dos subcomandos
//!
//! Os casos vivem em memória: cada execução parte do repositório semeado com
//! os casos de exemplo. Perfil e credenciais ficam no SQLite local.

use crate::cli::{Command, ProfileCommand, ProfileEditArgs, RespondArgs};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use teleperio_core::account::{AccountService, LoginMode, LoginPrefill};
use teleperio_core::chat::{open_case, submit_formal_response, ChatSession};
use teleperio_core::dashboard::{can_start_new_case, filter_cases, DashboardTab, EMPTY_TAB_MESSAGE};
use teleperio_core::form::{AttachmentKind, FormData, Sextant};
use teleperio_core::models::{Case, ChatMessage, Referral, Role, SpecialistResponse, UserProfile};
use teleperio_core::simulation::schedule_specialist_response;
use teleperio_core::storage::{KeyValueStore, SqliteKeyValueStore};
use teleperio_core::store::{CaseStore, InMemoryCaseStore, SharedCaseStore};
use teleperio_core::validation::RegistrationForm;
use teleperio_core::wizard::IntakeWizard;
use teleperio_core::init_storage_pool;
use tracing::{debug, info};

pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Register(args) => register(config, args.into()).await,
        Command::Login {
            identifier,
            password,
            role,
        } => login(config, identifier, password, role).await,
        Command::Profile { action } => match action {
            ProfileCommand::Show => profile_show(config).await,
            ProfileCommand::Edit(args) => profile_edit(config, args).await,
        },
        Command::ForgotPassword { email } => {
            let account = account_service(config).await?;
            println!("{}", account.forgot_password(&email)?);
            Ok(())
        }
        Command::VerifyCode { code } => {
            let account = account_service(config).await?;
            account.verify_code(&code)?;
            println!("Código confirmado. Defina sua nova senha.");
            Ok(())
        }
        Command::ChangePassword {
            new_password,
            confirm,
        } => {
            let account = account_service(config).await?;
            account.change_password(&new_password, &confirm).await?;
            println!("Senha alterada com sucesso!");
            Ok(())
        }
        Command::Dashboard { role, tab } => {
            let store = InMemoryCaseStore::seeded();
            dashboard(&store, role, tab, config.json_output)
        }
        Command::NewCase { file, wait } => {
            let data = match file {
                Some(path) => read_form(&path)?,
                None => FormData::default(),
            };
            let store = InMemoryCaseStore::seeded().shared();
            let case = submit_form(&store, data, config, wait).await?;
            if config.json_output {
                return print_json(&case);
            }
            println!("Caso enviado com sucesso!\n");
            println!("{}", render_case(&case));
            if !wait {
                println!("Use --wait para acompanhar a resposta simulada do especialista.");
            }
            Ok(())
        }
        Command::Case { id, role } => {
            let store = InMemoryCaseStore::seeded();
            let case = open_case(&store, &id)?;
            if config.json_output {
                return print_json(&case);
            }
            println!("{}", render_case(&case));
            if role == Role::Specialist && !case.status.is_responded() {
                println!("Resposta formal pendente: use `teleperio respond {}`.", case.id);
            }
            Ok(())
        }
        Command::Chat { id, role, messages } => {
            let store = InMemoryCaseStore::seeded();
            let case = open_case(&store, &id)?;
            let transcript = chat(&case, role, &messages, config).await;
            if config.json_output {
                return print_json(&transcript);
            }
            println!("{}", render_transcript(&transcript));
            Ok(())
        }
        Command::Respond(args) => {
            let store = InMemoryCaseStore::seeded();
            let case = respond(&store, args)?;
            if config.json_output {
                return print_json(&case);
            }
            println!("Resposta enviada ao solicitante!\n");
            println!("{}", render_case(&case));
            Ok(())
        }
        Command::Demo => demo(config).await,
    }
}

async fn account_service(config: &AppConfig) -> Result<AccountService> {
    let pool = init_storage_pool(&config.storage).await?;
    let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(pool));
    Ok(AccountService::new(storage, config.login_delay))
}

async fn register(config: &AppConfig, form: RegistrationForm) -> Result<()> {
    let account = account_service(config).await?;
    let profile = account.register(&form).await?;
    println!("Conta criada com sucesso! Faça login para continuar.");
    println!("{}", render_profile(&profile));
    Ok(())
}

/// Completa identificador, senha e papel a partir das credenciais salvas
fn resolve_login(
    identifier: Option<String>,
    password: Option<String>,
    role: Option<Role>,
    prefill: Option<LoginPrefill>,
) -> (String, String, Role) {
    match prefill {
        Some(prefill) => {
            let saved_role = prefill.role();
            (
                identifier.unwrap_or(prefill.identifier),
                password.unwrap_or(prefill.password),
                role.unwrap_or(saved_role),
            )
        }
        None => (
            identifier.unwrap_or_default(),
            password.unwrap_or_default(),
            role.unwrap_or(Role::Requester),
        ),
    }
}

async fn login(
    config: &AppConfig,
    identifier: Option<String>,
    password: Option<String>,
    role: Option<Role>,
) -> Result<()> {
    let account = account_service(config).await?;

    let prefill = if identifier.is_some() && password.is_some() && role.is_some() {
        None
    } else {
        account.login_prefill().await
    };
    if let Some(prefill) = &prefill {
        let mode = match prefill.mode {
            LoginMode::Cpf => "CPF",
            LoginMode::Email => "e-mail",
        };
        info!("Usando credenciais salvas ({})", mode);
    }
    let (identifier, password, role) = resolve_login(identifier, password, role, prefill);

    let session = account.login(&identifier, &password, role).await?;
    if config.json_output {
        return print_json(&serde_json::json!({
            "identifier": session.identifier,
            "role": session.role,
        }));
    }
    println!("Bem-vindo(a)! Sessão aberta como {} ({}).", session.role, session.identifier);
    Ok(())
}

async fn profile_show(config: &AppConfig) -> Result<()> {
    let account = account_service(config).await?;
    let profile = account.load_profile().await;
    if config.json_output {
        return print_json(&profile);
    }
    println!("{}", render_profile(&profile));
    Ok(())
}

async fn profile_edit(config: &AppConfig, args: ProfileEditArgs) -> Result<()> {
    let account = account_service(config).await?;
    let profile = apply_profile_edit(account.load_profile().await, args);
    account.save_profile(&profile).await?;
    println!("Perfil atualizado com sucesso!");
    println!("{}", render_profile(&profile));
    Ok(())
}

fn apply_profile_edit(mut profile: UserProfile, args: ProfileEditArgs) -> UserProfile {
    let edits = [
        (&mut profile.full_name, args.full_name),
        (&mut profile.email, args.email),
        (&mut profile.phone, args.phone),
        (&mut profile.health_unit, args.health_unit),
        (&mut profile.municipality, args.municipality),
        (&mut profile.state, args.state),
        (&mut profile.cns, args.cns),
        (&mut profile.position, args.position),
    ];
    for (field, value) in edits {
        if let Some(value) = value {
            *field = value;
        }
    }
    profile
}

fn dashboard(
    store: &dyn CaseStore,
    role: Role,
    tab: Option<DashboardTab>,
    json: bool,
) -> Result<()> {
    let tabs = match tab {
        Some(tab) => vec![tab],
        None => DashboardTab::ALL.to_vec(),
    };
    if json {
        let cases: Vec<Case> = tabs
            .iter()
            .flat_map(|tab| filter_cases(store, role, *tab))
            .collect();
        return print_json(&cases);
    }
    for tab in tabs {
        println!("{}", render_tab(store, role, tab));
    }
    if can_start_new_case(role) {
        println!("Abra um novo caso com `teleperio new-case`.");
    }
    Ok(())
}

fn read_form(path: &Path) -> Result<FormData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Falha ao ler o formulário {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Formulário inválido em {}", path.display()))
}

/// Percorre as etapas do formulário, envia o caso e agenda a resposta simulada
async fn submit_form(
    store: &SharedCaseStore,
    data: FormData,
    config: &AppConfig,
    wait: bool,
) -> Result<Case> {
    let mut wizard = IntakeWizard::start(Role::Requester)?;
    wizard.update(|form| *form = data);
    while !wizard.is_last_step() {
        debug!("Etapa {}: {}", wizard.step(), wizard.title());
        wizard.next();
    }

    let case = wizard.submit(store.as_ref())?;
    let handle = schedule_specialist_response(Arc::clone(store), &case.id, config.response_delay);
    if !wait {
        return Ok(case);
    }

    info!(
        "Aguardando resposta do especialista ({} ms)...",
        config.response_delay.as_millis()
    );
    handle.wait().await;
    Ok(open_case(store.as_ref(), &case.id)?)
}

/// Envia as mensagens e aguarda as réplicas simuladas
async fn chat(case: &Case, role: Role, messages: &[String], config: &AppConfig) -> Vec<ChatMessage> {
    let mut session = ChatSession::open(case, role, config.chat_reply_delay);
    for text in messages {
        if session.send(text).is_none() {
            debug!("Mensagem em branco ignorada");
        }
    }
    session.settle().await;
    session.messages()
}

fn respond(store: &dyn CaseStore, args: RespondArgs) -> Result<Case> {
    let response = SpecialistResponse {
        text: args.text,
        referral: args.referral,
        referral_specialty: args.specialty,
        return_interval: args.return_interval,
        notes: args.notes,
    };
    Ok(submit_formal_response(store, &args.id, response)?)
}

fn demo_form() -> FormData {
    let mut data = FormData {
        patient_initials: "ab".to_string(),
        patient_age: "52".to_string(),
        patient_gender: "Feminino".to_string(),
        medical_history: vec!["Diabetes mellitus".to_string()],
        smoking_status: "Não fumante".to_string(),
        main_complaint: "Sangramento gengival e mobilidade no 36".to_string(),
        evolution_time: "6 meses".to_string(),
        prev_periodontal_treatment: "Raspagem há 2 anos".to_string(),
        gingival_bleeding: "Sim".to_string(),
        max_probing_depth: "7mm".to_string(),
        tooth_mobility: "Grau II".to_string(),
        radiography_panoramic: true,
        hba1c: "8,1%".to_string(),
        interventions_done: vec!["Raspagem supra".to_string()],
        consultation_objective: vec!["Sugestão terapêutica".to_string()],
        ..Default::default()
    };
    for (sextant, code) in Sextant::ALL.into_iter().zip(["2", "1", "3", "4", "2", "3"]) {
        data.psr_codes.set(sextant, code);
    }
    data.attach_simulated(AttachmentKind::Radiograph, Local::now().timestamp_millis());
    data
}

/// Fluxo completo: solicitante abre o caso, especialista assume, chat e resposta formal
async fn demo(config: &AppConfig) -> Result<()> {
    let store = InMemoryCaseStore::seeded().shared();

    println!("== Painel do solicitante ==");
    dashboard(store.as_ref(), Role::Requester, None, false)?;

    println!("\n== Novo caso ==");
    let case = submit_form(&store, demo_form(), config, true).await?;
    println!("{}", render_case(&case));

    println!("\n== Em análise ==");
    println!("{}", render_tab(store.as_ref(), Role::Requester, DashboardTab::InAnalysis));

    println!("\n== Chat do caso {} ==", case.id);
    let transcript = chat(
        &case,
        Role::Requester,
        &["A paciente está com HbA1c acima de 8%.".to_string()],
        config,
    )
    .await;
    println!("{}", render_transcript(&transcript));

    println!("\n== Painel do especialista ==");
    dashboard(store.as_ref(), Role::Specialist, None, false)?;

    println!("\n== Resposta formal (e002) ==");
    let responded = respond(
        store.as_ref(),
        RespondArgs {
            id: "e002".to_string(),
            text: "Indicado enxerto de tecido conjuntivo após controle do biofilme.".to_string(),
            referral: Some(Referral::Yes),
            specialty: Some("Periodontia".to_string()),
            return_interval: Some("30 dias".to_string()),
            notes: None,
        },
    )?;
    println!("{}", render_case(&responded));
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_tab(store: &dyn CaseStore, role: Role, tab: DashboardTab) -> String {
    let cases = filter_cases(store, role, tab);
    let mut out = format!("[{}] ({})\n", tab.label(), cases.len());
    if cases.is_empty() {
        out.push_str(&format!("  {}\n", EMPTY_TAB_MESSAGE));
    }
    for case in &cases {
        out.push_str(&format!("  {}  {}\n", case.id, case.summary()));
    }
    out
}

fn render_case(case: &Case) -> String {
    let mut out = format!(
        "Caso {} - {}\nPaciente: {}\nCriado em: {} às {}\nStatus: {}\n",
        case.id,
        case.category,
        case.patient_initials,
        case.display_date(),
        case.display_time(),
        case.status
    );
    let fields = [
        ("Motivo da teleconsultoria", &case.consultation_reason),
        ("Dúvida clínica", &case.clinical_question),
        ("Histórico odontológico", &case.dental_history),
        ("Avaliação periodontal", &case.periodontal_assessment),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            out.push_str(&format!("{}: {}\n", label, value));
        }
    }
    if !case.complementary_exams.is_empty() {
        out.push_str(&format!(
            "Exames complementares: {}\n",
            case.complementary_exams.join("; ")
        ));
    }
    if let Some(response) = &case.specialist_response {
        out.push_str(&format!("Resposta do especialista: {}\n", response.text));
        if let Some(referral) = response.referral {
            out.push_str(&format!("Encaminhamento: {}", referral));
            if let Some(specialty) = &response.referral_specialty {
                out.push_str(&format!(" ({})", specialty));
            }
            out.push('\n');
        }
        if let Some(interval) = &response.return_interval {
            out.push_str(&format!("Retorno: {}\n", interval));
        }
        if let Some(notes) = &response.notes {
            out.push_str(&format!("Observações: {}\n", notes));
        }
    }
    out
}

fn render_transcript(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return "Nenhuma mensagem.".to_string();
    }
    messages
        .iter()
        .map(|m| {
            let mut line = format!("[{}] {}: {}", m.timestamp, m.sender, m.message);
            if let Some(attachment) = &m.attachment {
                line.push_str(&format!("\n    anexo: {}", attachment));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_profile(profile: &UserProfile) -> String {
    let mut out = String::new();
    let fields = [
        ("Nome", &profile.full_name),
        ("E-mail", &profile.email),
        ("Telefone", &profile.phone),
        ("Unidade de saúde", &profile.health_unit),
        ("Município", &profile.municipality),
        ("UF", &profile.state),
        ("Cartão SUS", &profile.cns),
        ("Função/cargo", &profile.position),
        ("CRO", &profile.cro),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            out.push_str(&format!("{}: {}\n", label, value));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use teleperio_core::models::CaseStatus;
    use tempfile::tempdir;

    fn fast_config() -> AppConfig {
        AppConfig {
            response_delay: Duration::from_millis(5),
            chat_reply_delay: Duration::from_millis(5),
            login_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_form_waits_for_specialist() {
        let store = InMemoryCaseStore::seeded().shared();
        let before = store.len();

        let case = submit_form(&store, demo_form(), &fast_config(), true)
            .await
            .unwrap();

        assert_eq!(store.len(), before + 1);
        assert_eq!(case.status, CaseStatus::InAnalysisRequester);
        assert_eq!(case.patient_initials, "AB");
        assert!(case.specialist_response.is_some());
    }

    #[tokio::test]
    async fn test_submit_form_without_wait_stays_pending() {
        let store = InMemoryCaseStore::seeded().shared();
        let case = submit_form(&store, FormData::default(), &fast_config(), false)
            .await
            .unwrap();
        assert_eq!(case.status, CaseStatus::Pending);
        assert_eq!(case.patient_initials, "NP");
    }

    #[tokio::test]
    async fn test_chat_collects_counter_replies() {
        let store = InMemoryCaseStore::seeded();
        let case = open_case(&store, "s006").unwrap();
        let transcript = chat(
            &case,
            Role::Requester,
            &["Olá".to_string(), "   ".to_string()],
            &fast_config(),
        )
        .await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].sender, Role::Specialist);
    }

    #[test]
    fn test_respond_updates_case() {
        let store = InMemoryCaseStore::seeded();
        let case = respond(
            &store,
            RespondArgs {
                id: "e003".to_string(),
                text: "Manter controle de placa.".to_string(),
                referral: Some(Referral::No),
                specialty: Some("Periodontia".to_string()),
                return_interval: None,
                notes: None,
            },
        )
        .unwrap();
        assert_eq!(case.status, CaseStatus::RespondedRequester);
        assert!(render_case(&case).contains("Encaminhamento: Não\n"));
    }

    #[test]
    fn test_login_role_follows_saved_credentials() {
        let saved = LoginPrefill {
            mode: LoginMode::Email,
            identifier: "mateus@forp.usp.br".to_string(),
            password: "segredo1".to_string(),
        };

        let (identifier, password, role) = resolve_login(None, None, None, Some(saved.clone()));
        assert_eq!(identifier, "mateus@forp.usp.br");
        assert_eq!(password, "segredo1");
        assert_eq!(role, Role::Specialist);

        let (_, _, role) = resolve_login(None, None, Some(Role::Requester), Some(saved));
        assert_eq!(role, Role::Requester);

        let (identifier, _, role) = resolve_login(Some("123".to_string()), None, None, None);
        assert_eq!(identifier, "123");
        assert_eq!(role, Role::Requester);
    }

    #[test]
    fn test_empty_tab_shows_placeholder() {
        let store = InMemoryCaseStore::new();
        let rendered = render_tab(&store, Role::Requester, DashboardTab::Pending);
        assert!(rendered.contains(EMPTY_TAB_MESSAGE));
    }

    #[test]
    fn test_profile_edit_only_touches_given_fields() {
        let edited = apply_profile_edit(
            UserProfile::sample(),
            ProfileEditArgs {
                municipality: Some("Uberaba".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(edited.municipality, "Uberaba");
        assert_eq!(edited.full_name, UserProfile::sample().full_name);
    }

    #[tokio::test]
    async fn test_register_persists_to_configured_database() {
        let dir = tempdir().unwrap();
        let mut config = fast_config();
        config.storage.db_path = dir.path().join("cli.db").to_str().unwrap().to_string();

        let form = RegistrationForm {
            full_name: "Ana Souza".to_string(),
            cro: "MG-999".to_string(),
            position: "Cirurgião-dentista".to_string(),
            health_unit: "UBS Norte".to_string(),
            municipality: "Araxá".to_string(),
            email: "ana@ubs.gov.br".to_string(),
            phone: "(34) 90000-0000".to_string(),
            cpf: "98765432100".to_string(),
            password: "segredo1".to_string(),
            confirm_password: "segredo1".to_string(),
            ..Default::default()
        };
        register(&config, form).await.unwrap();

        let account = account_service(&config).await.unwrap();
        assert_eq!(account.load_profile().await.full_name, "Ana Souza");
        let prefill = account.login_prefill().await.unwrap();
        assert_eq!(prefill.identifier, "987.654.321-00");
    }
}
