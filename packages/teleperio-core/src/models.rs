//! Modelos de dados compartilhados
//!
//! Este módulo define as estruturas principais do fluxo de teleconsultoria:
//! casos, respostas do especialista, mensagens de chat, perfil e credenciais.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Papel do usuário no fluxo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Clínico da atenção primária que solicita a teleconsultoria
    #[serde(rename = "solicitante")]
    Requester,
    /// Especialista que analisa e responde os casos
    #[serde(rename = "especialista")]
    Specialist,
}

impl Role {
    /// Papel da outra ponta da conversa
    pub fn counterpart(self) -> Self {
        match self {
            Role::Requester => Role::Specialist,
            Role::Specialist => Role::Requester,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Requester => write!(f, "solicitante"),
            Role::Specialist => write!(f, "especialista"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solicitante" => Ok(Role::Requester),
            "especialista" => Ok(Role::Specialist),
            other => Err(format!("Papel inválido: {}", other)),
        }
    }
}

/// Status possíveis de um caso, separados pela visão de cada papel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Caso enviado, aguardando o especialista
    Pending,
    /// Em análise (visão do solicitante)
    #[serde(rename = "in_analysis_solicitante")]
    InAnalysisRequester,
    /// Respondido (visão do solicitante)
    #[serde(rename = "responded_solicitante")]
    RespondedRequester,
    /// Caso novo na fila do especialista
    NewSpecialist,
    /// Em análise pelo especialista
    InAnalysisSpecialist,
    /// Respondido pelo especialista
    RespondedSpecialist,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 6] = [
        CaseStatus::Pending,
        CaseStatus::InAnalysisRequester,
        CaseStatus::RespondedRequester,
        CaseStatus::NewSpecialist,
        CaseStatus::InAnalysisSpecialist,
        CaseStatus::RespondedSpecialist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "pending",
            CaseStatus::InAnalysisRequester => "in_analysis_solicitante",
            CaseStatus::RespondedRequester => "responded_solicitante",
            CaseStatus::NewSpecialist => "new_specialist",
            CaseStatus::InAnalysisSpecialist => "in_analysis_specialist",
            CaseStatus::RespondedSpecialist => "responded_specialist",
        }
    }

    pub fn is_responded(&self) -> bool {
        matches!(
            self,
            CaseStatus::RespondedRequester | CaseStatus::RespondedSpecialist
        )
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Valor de status inválido: {}", s))
    }
}

/// Categoria clínica do caso
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCategory {
    DiagnosticGuidance,
    TherapeuticSuggestion,
    SurgicalIndication,
    ReferralCriteria,
    PostOperativeComplication,
    /// Nenhum objetivo selecionado no formulário
    Unspecified,
}

impl CaseCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CaseCategory::DiagnosticGuidance => "Orientação diagnóstica",
            CaseCategory::TherapeuticSuggestion => "Sugestão terapêutica",
            CaseCategory::SurgicalIndication => "Indicação cirúrgica",
            CaseCategory::ReferralCriteria => "Discussão sobre critérios de encaminhamento",
            CaseCategory::PostOperativeComplication => {
                "Conduta frente a complicação pós-operatória"
            }
            CaseCategory::Unspecified => "Novo Caso",
        }
    }

    /// Converte o rótulo de um objetivo da teleconsultoria na categoria.
    /// A comparação ignora maiúsculas porque os rótulos variam entre telas.
    pub fn from_objective(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        [
            CaseCategory::DiagnosticGuidance,
            CaseCategory::TherapeuticSuggestion,
            CaseCategory::SurgicalIndication,
            CaseCategory::ReferralCriteria,
            CaseCategory::PostOperativeComplication,
        ]
        .into_iter()
        .find(|category| category.label().to_lowercase() == normalized)
        .unwrap_or(CaseCategory::Unspecified)
    }
}

impl std::fmt::Display for CaseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Decisão de encaminhamento presencial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Referral {
    #[serde(rename = "Sim")]
    Yes,
    #[serde(rename = "Não")]
    No,
}

impl std::fmt::Display for Referral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Referral::Yes => write!(f, "Sim"),
            Referral::No => write!(f, "Não"),
        }
    }
}

impl FromStr for Referral {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sim" | "s" | "yes" => Ok(Referral::Yes),
            "não" | "nao" | "n" | "no" => Ok(Referral::No),
            other => Err(format!("Encaminhamento inválido: {}", other)),
        }
    }
}

/// Resposta formal do especialista
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistResponse {
    /// Texto da orientação
    pub text: String,
    /// Encaminhamento necessário?
    pub referral: Option<Referral>,
    /// Especialidade de destino, quando há encaminhamento
    pub referral_specialty: Option<String>,
    /// Tempo sugerido de retorno ou nova consulta
    pub return_interval: Option<String>,
    /// Observações clínicas
    pub notes: Option<String>,
}

impl SpecialistResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Representa um caso de teleconsultoria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    /// Identificador do caso (ex.: `s001`)
    pub id: String,
    /// Categoria clínica
    pub category: CaseCategory,
    /// Iniciais do paciente
    pub patient_initials: String,
    /// Data e hora de criação (horário local)
    pub created_at: NaiveDateTime,
    /// Status atual
    pub status: CaseStatus,
    /// Motivo da teleconsultoria
    pub consultation_reason: Option<String>,
    /// Dúvida clínica
    pub clinical_question: Option<String>,
    /// Histórico odontológico
    pub dental_history: Option<String>,
    /// Avaliação periodontal
    pub periodontal_assessment: Option<String>,
    /// Exames complementares informados
    #[serde(default)]
    pub complementary_exams: Vec<String>,
    /// Resposta do especialista, quando existir
    pub specialist_response: Option<SpecialistResponse>,
}

impl Case {
    /// Data no formato pt-BR (dd/mm/aaaa)
    pub fn display_date(&self) -> String {
        self.created_at.format("%d/%m/%Y").to_string()
    }

    /// Hora no formato pt-BR (HH:MM)
    pub fn display_time(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }

    /// Linha de resumo usada nos cartões do painel
    pub fn summary(&self) -> String {
        format!(
            "{} - {} | {} {}",
            self.category,
            self.patient_initials,
            self.display_date(),
            self.display_time()
        )
    }
}

/// Mensagem do chat de um caso
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Role,
    pub message: String,
    /// Hora de exibição (HH:MM)
    pub timestamp: String,
    pub attachment: Option<String>,
}

/// Perfil do usuário salvo localmente (chave `userProfile`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(rename = "nomeCompleto")]
    pub full_name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "unidadeSaude")]
    pub health_unit: String,
    #[serde(rename = "municipio")]
    pub municipality: String,
    /// Unidade federativa (UF)
    #[serde(rename = "estado")]
    pub state: String,
    /// Cartão Nacional de Saúde
    pub cns: String,
    /// Função/cargo
    #[serde(rename = "funcaoCargo")]
    pub position: String,
    /// Profissão descrita quando a função é "Outro"
    #[serde(rename = "outraProfissao")]
    pub other_profession: String,
    pub cro: String,
    /// CPF apenas com dígitos
    pub cpf: String,
}

impl UserProfile {
    /// Perfil exibido antes de qualquer cadastro local
    pub fn sample() -> Self {
        Self {
            full_name: "MARIA SILVA DE NASCIMENTO".to_string(),
            email: "maria.nascimento@gmail.com".to_string(),
            phone: "(34) 91823-2912".to_string(),
            health_unit: "Minha unidade de saúde".to_string(),
            municipality: "Araxá".to_string(),
            state: "MG".to_string(),
            cns: "102-212-293".to_string(),
            position: "Médico".to_string(),
            other_profession: String::new(),
            cro: String::new(),
            cpf: String::new(),
        }
    }

    /// Sobrepõe os campos preenchidos de `saved` sobre este perfil.
    /// Campos vazios no registro salvo não apagam os valores atuais.
    pub fn overlay(mut self, saved: &UserProfile) -> Self {
        fn take(target: &mut String, value: &str) {
            if !value.is_empty() {
                *target = value.to_string();
            }
        }
        take(&mut self.full_name, &saved.full_name);
        take(&mut self.email, &saved.email);
        take(&mut self.phone, &saved.phone);
        take(&mut self.health_unit, &saved.health_unit);
        take(&mut self.municipality, &saved.municipality);
        take(&mut self.state, &saved.state);
        take(&mut self.cns, &saved.cns);
        take(&mut self.position, &saved.position);
        take(&mut self.other_profession, &saved.other_profession);
        take(&mut self.cro, &saved.cro);
        take(&mut self.cpf, &saved.cpf);
        self
    }
}

/// Credenciais salvas para preenchimento automático do login (chave `loginCredentials`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    pub identifier: String,
    pub password: String,
    pub user_type: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_status_wire_values() {
        for status in CaseStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<CaseStatus>().unwrap(), status);
        }
        assert!("em_analise".parse::<CaseStatus>().is_err());
    }

    #[test]
    fn test_role_serializes_in_portuguese() {
        assert_eq!(serde_json::to_string(&Role::Requester).unwrap(), "\"solicitante\"");
        assert_eq!(serde_json::to_string(&Role::Specialist).unwrap(), "\"especialista\"");
        assert_eq!(Role::Requester.counterpart(), Role::Specialist);
    }

    #[test]
    fn test_category_from_objective_ignores_case() {
        assert_eq!(
            CaseCategory::from_objective("Indicação Cirúrgica"),
            CaseCategory::SurgicalIndication
        );
        assert_eq!(
            CaseCategory::from_objective("Orientação diagnóstica"),
            CaseCategory::DiagnosticGuidance
        );
        assert_eq!(CaseCategory::from_objective("Outro"), CaseCategory::Unspecified);
        assert_eq!(CaseCategory::Unspecified.to_string(), "Novo Caso");
    }

    #[test]
    fn test_case_display_format() {
        let case = Case {
            id: "s001".to_string(),
            category: CaseCategory::SurgicalIndication,
            patient_initials: "GL".to_string(),
            created_at: NaiveDate::from_ymd_opt(2025, 6, 17)
                .unwrap()
                .and_hms_opt(10, 25, 0)
                .unwrap(),
            status: CaseStatus::Pending,
            consultation_reason: None,
            clinical_question: None,
            dental_history: None,
            periodontal_assessment: None,
            complementary_exams: vec![],
            specialist_response: None,
        };
        assert_eq!(case.display_date(), "17/06/2025");
        assert_eq!(case.display_time(), "10:25");
        assert_eq!(case.summary(), "Indicação cirúrgica - GL | 17/06/2025 10:25");
    }

    #[test]
    fn test_profile_overlay_keeps_defaults_for_blank_fields() {
        let saved = UserProfile {
            full_name: "João da Silva".to_string(),
            email: "joao@ubs.gov.br".to_string(),
            ..Default::default()
        };
        let merged = UserProfile::sample().overlay(&saved);
        assert_eq!(merged.full_name, "João da Silva");
        assert_eq!(merged.email, "joao@ubs.gov.br");
        assert_eq!(merged.municipality, "Araxá");
    }
}
