//! Assistente de abertura de caso em 7 etapas
//!
//! Máquina de estados linear: `next` avança até a etapa 7, `back` recua até
//! a etapa 1 e, a partir dela, sinaliza saída do formulário. Não há validação
//! entre etapas; o envio só é aceito na última etapa.

use crate::error::CaseError;
use crate::form::FormData;
use crate::models::{Case, CaseCategory, CaseStatus, Role};
use crate::store::CaseStore;
use chrono::{Local, NaiveDateTime};
use rand::Rng;
use tracing::{info, warn};

pub const FIRST_STEP: u8 = 1;
pub const LAST_STEP: u8 = 7;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 6;

/// Título exibido para cada etapa
pub fn step_title(step: u8) -> &'static str {
    match step {
        1 => "Identificação do Paciente e Motivo da Consulta",
        2 => "Caracterização Clínica do Caso",
        3 => "Avaliação Periodontal Atual",
        4 => "Exames Complementares",
        5 => "Resultado do Exame PSR",
        6 => "Condutas já Realizadas",
        7 => "Objetivo da Teleconsultoria",
        _ => "Etapa não encontrada",
    }
}

/// Resultado de um `back`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// Voltou para a etapa indicada
    Moved(u8),
    /// Já estava na primeira etapa: o formulário deve ser fechado
    Exit,
}

/// Identificador de caso novo: `s` seguido de sufixo aleatório em base 36
pub fn generate_case_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("s{}", suffix)
}

#[derive(Debug, Clone)]
pub struct IntakeWizard {
    step: u8,
    data: FormData,
}

impl IntakeWizard {
    /// Inicia o formulário. Apenas o solicitante pode abrir casos.
    pub fn start(role: Role) -> Result<Self, CaseError> {
        if role != Role::Requester {
            return Err(CaseError::RoleNotAllowed);
        }
        Ok(Self::with_data(FormData::default()))
    }

    /// Formulário já preenchido, posicionado na primeira etapa
    pub fn with_data(data: FormData) -> Self {
        Self {
            step: FIRST_STEP,
            data,
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn title(&self) -> &'static str {
        step_title(self.step)
    }

    pub fn is_last_step(&self) -> bool {
        self.step == LAST_STEP
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut FormData {
        &mut self.data
    }

    /// Aplica uma alteração parcial nos dados do formulário
    pub fn update(&mut self, f: impl FnOnce(&mut FormData)) {
        f(&mut self.data);
    }

    pub fn next(&mut self) -> u8 {
        if self.step < LAST_STEP {
            self.step += 1;
        }
        self.step
    }

    pub fn back(&mut self) -> BackOutcome {
        if self.step > FIRST_STEP {
            self.step -= 1;
            BackOutcome::Moved(self.step)
        } else {
            BackOutcome::Exit
        }
    }

    /// Monta o caso a partir dos dados do formulário
    pub fn build_case(&self, id: String, created_at: NaiveDateTime) -> Case {
        let data = &self.data;
        let category = data
            .consultation_objective
            .first()
            .map(|objective| CaseCategory::from_objective(objective))
            .unwrap_or(CaseCategory::Unspecified);

        let initials = data.patient_initials.trim();
        let mut objectives = data.consultation_objective.clone();
        if !data.other_consultation_objective.trim().is_empty() {
            objectives.push(data.other_consultation_objective.trim().to_string());
        }

        Case {
            id,
            category,
            patient_initials: if initials.is_empty() {
                "NP".to_string()
            } else {
                initials.to_uppercase()
            },
            created_at,
            status: CaseStatus::Pending,
            consultation_reason: non_blank(objectives.join(", ")),
            clinical_question: non_blank(data.main_complaint.clone()),
            dental_history: non_blank(data.prev_periodontal_treatment.clone()),
            periodontal_assessment: data.periodontal_summary(),
            complementary_exams: data.complementary_exams(),
            specialist_response: None,
        }
    }

    /// Envia o caso: cria um registro `pending` e o adiciona ao repositório
    pub fn submit(&self, store: &dyn CaseStore) -> Result<Case, CaseError> {
        if !self.is_last_step() {
            return Err(CaseError::NotOnFinalStep(self.step));
        }

        for step in FIRST_STEP..=LAST_STEP {
            let missing = self.data.missing_fields(step);
            if !missing.is_empty() {
                warn!("Etapa {} enviada sem os campos: {}", step, missing.join(", "));
            }
        }

        let case = self.build_case(generate_case_id(), Local::now().naive_local());
        store.insert(case.clone())?;
        info!("Caso {} enviado para os especialistas", case.id);
        Ok(case)
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCaseStore;

    fn at_last_step(data: FormData) -> IntakeWizard {
        let mut wizard = IntakeWizard::with_data(data);
        while !wizard.is_last_step() {
            wizard.next();
        }
        wizard
    }

    #[test]
    fn test_step_never_leaves_bounds() {
        let mut wizard = IntakeWizard::start(Role::Requester).unwrap();
        for _ in 0..20 {
            wizard.next();
            assert!((FIRST_STEP..=LAST_STEP).contains(&wizard.step()));
        }
        assert_eq!(wizard.step(), LAST_STEP);

        for _ in 0..20 {
            wizard.back();
            assert!((FIRST_STEP..=LAST_STEP).contains(&wizard.step()));
        }
        assert_eq!(wizard.step(), FIRST_STEP);
    }

    #[test]
    fn test_mixed_navigation_stays_in_bounds() {
        let mut wizard = IntakeWizard::with_data(FormData::default());
        let moves = [true, false, false, true, true, true, true, true, true, true, true, false];
        for forward in moves {
            if forward {
                wizard.next();
            } else {
                wizard.back();
            }
            assert!((FIRST_STEP..=LAST_STEP).contains(&wizard.step()));
        }
    }

    #[test]
    fn test_back_on_first_step_exits() {
        let mut wizard = IntakeWizard::with_data(FormData::default());
        assert_eq!(wizard.back(), BackOutcome::Exit);
        wizard.next();
        assert_eq!(wizard.back(), BackOutcome::Moved(1));
    }

    #[test]
    fn test_specialist_cannot_start_form() {
        assert_eq!(
            IntakeWizard::start(Role::Specialist).unwrap_err(),
            CaseError::RoleNotAllowed
        );
    }

    #[test]
    fn test_step_titles() {
        assert_eq!(step_title(1), "Identificação do Paciente e Motivo da Consulta");
        assert_eq!(step_title(7), "Objetivo da Teleconsultoria");
        assert_eq!(step_title(8), "Etapa não encontrada");
    }

    #[test]
    fn test_submit_appends_exactly_one_pending_case() {
        let store = InMemoryCaseStore::seeded();
        let before = store.len();

        let data = FormData {
            patient_initials: "jp".to_string(),
            main_complaint: "Mobilidade nos incisivos".to_string(),
            consultation_objective: vec![
                "Indicação Cirúrgica".to_string(),
                "Sugestão terapêutica".to_string(),
            ],
            ..Default::default()
        };
        let case = at_last_step(data).submit(&store).unwrap();

        assert_eq!(store.len(), before + 1);
        assert_eq!(case.status, CaseStatus::Pending);
        assert_eq!(case.category, CaseCategory::SurgicalIndication);
        assert_eq!(case.patient_initials, "JP");
        assert_eq!(
            case.consultation_reason.as_deref(),
            Some("Indicação Cirúrgica, Sugestão terapêutica")
        );
        assert_eq!(case.clinical_question.as_deref(), Some("Mobilidade nos incisivos"));
        assert_eq!(store.get(&case.id).unwrap().status, CaseStatus::Pending);
        assert_eq!(store.list().last().unwrap().id, case.id);
    }

    #[test]
    fn test_submit_with_empty_form_uses_fallbacks() {
        let store = InMemoryCaseStore::new();
        let case = at_last_step(FormData::default()).submit(&store).unwrap();
        assert_eq!(case.patient_initials, "NP");
        assert_eq!(case.category, CaseCategory::Unspecified);
        assert!(case.consultation_reason.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_submit_before_last_step_is_rejected() {
        let store = InMemoryCaseStore::new();
        let mut wizard = IntakeWizard::with_data(FormData::default());
        wizard.next();
        assert_eq!(wizard.submit(&store).unwrap_err(), CaseError::NotOnFinalStep(2));
        assert!(store.is_empty());
    }

    #[test]
    fn test_generated_ids_are_prefixed_base36() {
        let id = generate_case_id();
        assert!(id.starts_with('s'));
        assert_eq!(id.len(), 1 + ID_SUFFIX_LEN);
        assert!(id[1..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
