//! Simulação da resposta do especialista
//!
//! Um caso `pending` passa para `in_analysis_solicitante` depois de um atraso
//! fixo, com uma resposta padrão. Quem agenda fica com o [`SimulationHandle`];
//! ao descartá-lo antes do disparo a transição não acontece.

use crate::models::{CaseStatus, SpecialistResponse};
use crate::store::SharedCaseStore;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const DEFAULT_RESPONSE_DELAY: Duration = Duration::from_secs(5);

pub const SIMULATED_RESPONSE: &str = "Olá! Recebi seu caso e já estou analisando as informações \
enviadas. Em breve envio a orientação completa.";

/// Tarefa agendada de resposta simulada. Abortada no `Drop`.
#[derive(Debug)]
pub struct SimulationHandle {
    case_id: String,
    task: Option<JoinHandle<bool>>,
}

impl SimulationHandle {
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Cancela o disparo, se ainda não ocorreu
    pub fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Simulação do caso {} cancelada", self.case_id);
        }
    }

    /// Aguarda o disparo. Retorna `true` se o status foi alterado.
    pub async fn wait(mut self) -> bool {
        match self.task.take() {
            Some(task) => task.await.unwrap_or(false),
            None => false,
        }
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Agenda a resposta simulada do especialista para `case_id`
pub fn schedule_specialist_response(
    store: SharedCaseStore,
    case_id: impl Into<String>,
    delay: Duration,
) -> SimulationHandle {
    let case_id = case_id.into();
    let task_case_id = case_id.clone();

    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let response = SpecialistResponse::from_text(SIMULATED_RESPONSE);
        match store.transition(
            &task_case_id,
            CaseStatus::Pending,
            CaseStatus::InAnalysisRequester,
            Some(response),
        ) {
            Ok(true) => {
                info!("Especialista assumiu o caso {}", task_case_id);
                true
            }
            Ok(false) => {
                debug!("Caso {} não está mais pendente", task_case_id);
                false
            }
            Err(e) => {
                warn!("Falha na simulação do caso {}: {}", task_case_id, e);
                false
            }
        }
    });

    debug!("Resposta simulada do caso {} agendada em {:?}", case_id, delay);
    SimulationHandle {
        case_id,
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormData;
    use crate::store::{CaseStore, InMemoryCaseStore};
    use crate::wizard::IntakeWizard;
    use std::sync::Arc;

    fn submitted_case(store: &SharedCaseStore) -> String {
        let mut wizard = IntakeWizard::with_data(FormData::default());
        for _ in 0..6 {
            wizard.next();
        }
        wizard.submit(store.as_ref()).unwrap().id
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_case_moves_to_analysis_after_delay() {
        let store: SharedCaseStore = Arc::new(InMemoryCaseStore::new());
        let id = submitted_case(&store);

        let handle = schedule_specialist_response(store.clone(), id.clone(), DEFAULT_RESPONSE_DELAY);

        tokio::time::sleep(DEFAULT_RESPONSE_DELAY - Duration::from_millis(1)).await;
        assert_eq!(store.get(&id).unwrap().status, CaseStatus::Pending);

        assert!(handle.wait().await);
        let case = store.get(&id).unwrap();
        assert_eq!(case.status, CaseStatus::InAnalysisRequester);
        assert_eq!(case.specialist_response.unwrap().text, SIMULATED_RESPONSE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_prevents_transition() {
        let store: SharedCaseStore = Arc::new(InMemoryCaseStore::new());
        let id = submitted_case(&store);

        let handle = schedule_specialist_response(store.clone(), id.clone(), DEFAULT_RESPONSE_DELAY);
        drop(handle);

        tokio::time::sleep(DEFAULT_RESPONSE_DELAY * 3).await;
        let case = store.get(&id).unwrap();
        assert_eq!(case.status, CaseStatus::Pending);
        assert!(case.specialist_response.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_transition() {
        let store: SharedCaseStore = Arc::new(InMemoryCaseStore::new());
        let id = submitted_case(&store);

        let handle =
            schedule_specialist_response(store.clone(), id.clone(), Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(3)).await;
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(store.get(&id).unwrap().status, CaseStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_happens_exactly_once() {
        let store: SharedCaseStore = Arc::new(InMemoryCaseStore::new());
        let id = submitted_case(&store);

        let first = schedule_specialist_response(store.clone(), id.clone(), Duration::from_secs(5));
        let second = schedule_specialist_response(store.clone(), id.clone(), Duration::from_secs(6));

        let fired = [first.wait().await, second.wait().await];
        assert_eq!(fired.iter().filter(|changed| **changed).count(), 1);
        assert_eq!(store.get(&id).unwrap().status, CaseStatus::InAnalysisRequester);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_pending_case_is_left_untouched() {
        let store: SharedCaseStore = Arc::new(InMemoryCaseStore::seeded());
        let handle = schedule_specialist_response(store.clone(), "s002", Duration::from_secs(1));
        assert!(!handle.wait().await);
        assert_eq!(
            store.get("s002").unwrap().status,
            CaseStatus::RespondedRequester
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_case_does_not_fire() {
        let store: SharedCaseStore = Arc::new(InMemoryCaseStore::new());
        let handle = schedule_specialist_response(store.clone(), "nope", Duration::from_secs(1));
        assert_eq!(handle.case_id(), "nope");
        assert!(!handle.wait().await);
    }
}
