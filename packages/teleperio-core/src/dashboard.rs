//! Painel "Meus Casos": abas por status, de acordo com o papel do usuário

use crate::models::{Case, CaseStatus, Role};
use crate::store::CaseStore;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Abas do painel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTab {
    Pending,
    InAnalysis,
    Responded,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 3] = [
        DashboardTab::Pending,
        DashboardTab::InAnalysis,
        DashboardTab::Responded,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DashboardTab::Pending => "Casos Pendentes",
            DashboardTab::InAnalysis => "Casos em Análise",
            DashboardTab::Responded => "Casos Respondidos",
        }
    }

    /// Status exibido nesta aba para o papel informado
    pub fn status_for(&self, role: Role) -> CaseStatus {
        match (role, self) {
            (Role::Requester, DashboardTab::Pending) => CaseStatus::Pending,
            (Role::Requester, DashboardTab::InAnalysis) => CaseStatus::InAnalysisRequester,
            (Role::Requester, DashboardTab::Responded) => CaseStatus::RespondedRequester,
            (Role::Specialist, DashboardTab::Pending) => CaseStatus::NewSpecialist,
            (Role::Specialist, DashboardTab::InAnalysis) => CaseStatus::InAnalysisSpecialist,
            (Role::Specialist, DashboardTab::Responded) => CaseStatus::RespondedSpecialist,
        }
    }
}

impl FromStr for DashboardTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DashboardTab::Pending),
            "in_analysis" => Ok(DashboardTab::InAnalysis),
            "responded" => Ok(DashboardTab::Responded),
            other => Err(format!("Aba inválida: {}", other)),
        }
    }
}

pub const EMPTY_TAB_MESSAGE: &str = "Nenhum caso nesta categoria.";

/// Casos da aba, na ordem do repositório
pub fn filter_cases(store: &dyn CaseStore, role: Role, tab: DashboardTab) -> Vec<Case> {
    store.filter_by_status(tab.status_for(role))
}

/// Apenas o solicitante vê o botão "+ INICIAR NOVO CASO"
pub fn can_start_new_case(role: Role) -> bool {
    role == Role::Requester
}
