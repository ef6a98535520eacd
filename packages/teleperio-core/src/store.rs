//! Repositório de casos em memória
//!
//! Os casos vivem apenas enquanto o processo está ativo. O repositório é
//! compartilhado entre as telas e as tarefas de simulação via `Arc`.

use crate::error::CaseError;
use crate::models::{Case, CaseStatus, SpecialistResponse};
use crate::seed;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Operações de leitura e escrita sobre os casos
pub trait CaseStore: Send + Sync {
    /// Todos os casos, em ordem de inserção
    fn list(&self) -> Vec<Case>;

    fn get(&self, id: &str) -> Option<Case>;

    /// Adiciona um novo caso ao final da coleção
    fn insert(&self, case: Case) -> Result<(), CaseError>;

    fn update_status(&self, id: &str, status: CaseStatus) -> Result<(), CaseError>;

    /// Troca o status apenas se o atual for `expected`. Retorna `true` quando houve troca.
    fn transition(
        &self,
        id: &str,
        expected: CaseStatus,
        next: CaseStatus,
        response: Option<SpecialistResponse>,
    ) -> Result<bool, CaseError>;

    fn record_response(
        &self,
        id: &str,
        response: SpecialistResponse,
        status: CaseStatus,
    ) -> Result<(), CaseError>;

    /// Casos cujo status é exatamente `status`
    fn filter_by_status(&self, status: CaseStatus) -> Vec<Case> {
        self.list()
            .into_iter()
            .filter(|case| case.status == status)
            .collect()
    }

    fn len(&self) -> usize {
        self.list().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle compartilhado do repositório
pub type SharedCaseStore = Arc<dyn CaseStore>;

#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
    cases: RwLock<Vec<Case>>,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repositório já populado com os casos simulados
    pub fn seeded() -> Self {
        Self {
            cases: RwLock::new(seed::simulated_cases()),
        }
    }

    pub fn shared(self) -> SharedCaseStore {
        Arc::new(self)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Case>> {
        // Nenhuma escrita pode entrar em pânico com o lock tomado
        self.cases.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Case>> {
        self.cases.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_case<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Case) -> Result<T, CaseError>,
    ) -> Result<T, CaseError> {
        let mut cases = self.write();
        let case = cases
            .iter_mut()
            .find(|case| case.id == id)
            .ok_or_else(|| CaseError::NotFound(id.to_string()))?;
        f(case)
    }
}

impl CaseStore for InMemoryCaseStore {
    fn list(&self) -> Vec<Case> {
        self.read().clone()
    }

    fn get(&self, id: &str) -> Option<Case> {
        self.read().iter().find(|case| case.id == id).cloned()
    }

    fn insert(&self, case: Case) -> Result<(), CaseError> {
        let mut cases = self.write();
        if cases.iter().any(|existing| existing.id == case.id) {
            return Err(CaseError::DuplicateId(case.id));
        }
        info!("Caso {} adicionado com status {}", case.id, case.status);
        cases.push(case);
        Ok(())
    }

    fn update_status(&self, id: &str, status: CaseStatus) -> Result<(), CaseError> {
        self.with_case(id, |case| {
            info!("Caso {}: {} -> {}", case.id, case.status, status);
            case.status = status;
            Ok(())
        })
    }

    fn transition(
        &self,
        id: &str,
        expected: CaseStatus,
        next: CaseStatus,
        response: Option<SpecialistResponse>,
    ) -> Result<bool, CaseError> {
        self.with_case(id, |case| {
            if case.status != expected {
                return Ok(false);
            }
            info!("Caso {}: {} -> {}", case.id, case.status, next);
            case.status = next;
            if response.is_some() {
                case.specialist_response = response;
            }
            Ok(true)
        })
    }

    fn record_response(
        &self,
        id: &str,
        response: SpecialistResponse,
        status: CaseStatus,
    ) -> Result<(), CaseError> {
        self.with_case(id, |case| {
            info!("Resposta registrada no caso {} ({})", case.id, status);
            case.specialist_response = Some(response);
            case.status = status;
            Ok(())
        })
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}
