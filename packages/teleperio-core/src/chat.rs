//! Detalhe do caso: histórico de interações e resposta formal
//!
//! O chat é uma lista em memória, apenas de inclusão, aberta por caso.
//! Cada mensagem enviada agenda uma réplica simulada da outra ponta.

use crate::error::CaseError;
use crate::models::{Case, CaseStatus, ChatMessage, Referral, Role, SpecialistResponse};
use crate::store::CaseStore;
use chrono::Local;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1500);

pub const SEED_ATTACHMENT: &str = "MaterialEducativo_DiabetesPeriodontite.pdf";

const REQUESTER_FOLLOW_UP: &str =
    "Obrigado pela orientação! Teria algum material de apoio para o paciente?";
const SPECIALIST_FOLLOW_UP: &str = "Sim, vou anexar um material educativo. Sempre à disposição.";
const SPECIALIST_AUTO_REPLY: &str =
    "Ok, entendi sua pergunta. Vou analisar e te respondo em breve.";
const REQUESTER_AUTO_REPLY: &str = "Ciente, Dr. (a).";

fn now_hhmm() -> String {
    Local::now().format("%H:%M").to_string()
}

/// Busca o caso para a tela de detalhe
pub fn open_case(store: &dyn CaseStore, case_id: &str) -> Result<Case, CaseError> {
    store
        .get(case_id)
        .ok_or_else(|| CaseError::NotFound(case_id.to_string()))
}

type MessageLog = Arc<Mutex<Vec<ChatMessage>>>;

fn lock(log: &MessageLog) -> MutexGuard<'_, Vec<ChatMessage>> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn append(log: &MessageLog, sender: Role, text: &str, attachment: Option<&str>) -> ChatMessage {
    let mut messages = lock(log);
    let message = ChatMessage {
        id: format!("chat{}", messages.len() + 1),
        sender,
        message: text.to_string(),
        timestamp: now_hhmm(),
        attachment: attachment.map(str::to_string),
    };
    messages.push(message.clone());
    message
}

/// Conversa aberta para um caso. As réplicas pendentes são abortadas no `Drop`.
#[derive(Debug)]
pub struct ChatSession {
    case_id: String,
    viewer: Role,
    reply_delay: Duration,
    messages: MessageLog,
    pending_replies: Vec<JoinHandle<()>>,
}

impl ChatSession {
    /// Abre a conversa. Casos já respondidos começam com a troca de mensagens padrão.
    pub fn open(case: &Case, viewer: Role, reply_delay: Duration) -> Self {
        let session = Self {
            case_id: case.id.clone(),
            viewer,
            reply_delay,
            messages: Arc::new(Mutex::new(Vec::new())),
            pending_replies: Vec::new(),
        };

        if let Some(response) = &case.specialist_response {
            append(&session.messages, Role::Specialist, &response.text, None);
            append(&session.messages, Role::Requester, REQUESTER_FOLLOW_UP, None);
            append(
                &session.messages,
                Role::Specialist,
                SPECIALIST_FOLLOW_UP,
                Some(SEED_ATTACHMENT),
            );
        }
        session
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn viewer(&self) -> Role {
        self.viewer
    }

    /// Cópia das mensagens em ordem de inclusão
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.messages).clone()
    }

    /// Envia uma mensagem como o usuário atual. Texto em branco é ignorado.
    pub fn send(&mut self, text: &str) -> Option<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let message = append(&self.messages, self.viewer, text, None);
        debug!("Mensagem {} enviada no caso {}", message.id, self.case_id);

        let responder = self.viewer.counterpart();
        let reply = match responder {
            Role::Specialist => SPECIALIST_AUTO_REPLY,
            Role::Requester => REQUESTER_AUTO_REPLY,
        };
        let log = Arc::clone(&self.messages);
        let delay = self.reply_delay;
        self.pending_replies.retain(|task| !task.is_finished());
        self.pending_replies.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            append(&log, responder, reply, None);
        }));

        Some(message)
    }

    /// Aguarda as réplicas simuladas já agendadas
    pub async fn settle(&mut self) {
        for task in self.pending_replies.drain(..) {
            let _ = task.await;
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        for task in self.pending_replies.drain(..) {
            task.abort();
        }
    }
}

/// Registra a resposta formal do especialista; o caso passa a `responded_solicitante`
pub fn submit_formal_response(
    store: &dyn CaseStore,
    case_id: &str,
    mut response: SpecialistResponse,
) -> Result<Case, CaseError> {
    let case = open_case(store, case_id)?;
    if case.status.is_responded() {
        return Err(CaseError::AlreadyResponded(case.id));
    }

    response.text = response.text.trim().to_string();
    if response.text.is_empty() {
        return Err(CaseError::EmptyResponse);
    }
    if response.referral != Some(Referral::Yes) {
        response.referral_specialty = None;
    }

    store.record_response(case_id, response, CaseStatus::RespondedRequester)?;
    info!("Resposta formal enviada ao solicitante (caso {})", case_id);
    open_case(store, case_id)
}
