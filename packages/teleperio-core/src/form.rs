//! Dados do formulário de abertura de caso
//!
//! `FormData` é preenchido incrementalmente pelas 7 etapas do assistente
//! (ver [`crate::wizard`]). Nenhum campo é obrigatório.

use serde::{Deserialize, Serialize};

/// Opções de histórico médico da etapa 1
pub const MEDICAL_HISTORY_OPTIONS: &[&str] = &[
    "Diabetes mellitus",
    "Hipertensão arterial sistêmica",
    "Dislipidemias",
    "Doença cardiovascular",
    "Doenças autoimunes",
];

/// Condutas já realizadas (etapa 6)
pub const INTERVENTION_OPTIONS: &[&str] = &[
    "Raspagem supra",
    "Raspagem subgengival",
    "Alisamento radicular",
    "Controle de placa",
    "Prescrição medicamentosa",
    "Reavaliação periodontal",
];

/// Objetivos da teleconsultoria (etapa 7)
pub const CONSULTATION_OBJECTIVE_OPTIONS: &[&str] = &[
    "Orientação diagnóstica",
    "Sugestão terapêutica",
    "Indicação Cirúrgica",
    "Discussão sobre critérios de encaminhamento",
    "Conduta frente a complicação pós-operatória",
];

/// Sextantes do exame PSR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sextant {
    UpperRight = 1,
    UpperAnterior = 2,
    UpperLeft = 3,
    LowerLeft = 4,
    LowerAnterior = 5,
    LowerRight = 6,
}

impl Sextant {
    pub const ALL: [Sextant; 6] = [
        Sextant::UpperRight,
        Sextant::UpperAnterior,
        Sextant::UpperLeft,
        Sextant::LowerLeft,
        Sextant::LowerAnterior,
        Sextant::LowerRight,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == number)
    }

    pub fn label(self) -> &'static str {
        match self {
            Sextant::UpperRight => "1 – Superior direito",
            Sextant::UpperAnterior => "2 – Superior anterior",
            Sextant::UpperLeft => "3 – Superior esquerdo",
            Sextant::LowerLeft => "4 – Inferior esquerdo",
            Sextant::LowerAnterior => "5 – Inferior anterior",
            Sextant::LowerRight => "6 – Inferior direito",
        }
    }
}

/// Códigos PSR por sextante, guardados como texto livre
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsrCodes([String; 6]);

impl PsrCodes {
    pub fn get(&self, sextant: Sextant) -> &str {
        &self.0[sextant.number() as usize - 1]
    }

    pub fn set(&mut self, sextant: Sextant, value: impl Into<String>) {
        self.0[sextant.number() as usize - 1] = value.into();
    }

    /// Interpreta o código de um sextante (0 a 4). Texto fora desse formato
    /// permanece apenas como texto livre e retorna `None`.
    pub fn code(&self, sextant: Sextant) -> Option<u8> {
        match self.get(sextant).trim().parse::<u8>() {
            Ok(code) if code <= 4 => Some(code),
            _ => None,
        }
    }

    /// Maior código interpretável entre os sextantes
    pub fn highest_code(&self) -> Option<u8> {
        Sextant::ALL.into_iter().filter_map(|s| self.code(s)).max()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|value| value.trim().is_empty())
    }
}

/// Tipo de anexo simulado da etapa 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Radiograph,
    LabExam,
}

/// Registro plano com todos os campos do formulário
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormData {
    // Etapa 1: identificação do paciente
    pub patient_initials: String,
    pub patient_age: String,
    pub patient_gender: String,
    pub patient_sus_card: String,
    pub medical_history: Vec<String>,
    pub other_medical_history: String,
    pub smoking_status: String,
    pub chronic_medications: String,

    // Etapa 2: caracterização clínica
    pub main_complaint: String,
    pub evolution_time: String,
    pub prev_periodontal_treatment: String,
    pub oral_hygiene_adherence: String,

    // Etapa 3: avaliação periodontal
    pub gingival_bleeding: String,
    pub max_probing_depth: String,
    pub tooth_mobility: String,
    pub suppuration: String,
    pub gingival_recession: String,
    pub missing_teeth: String,
    pub plaque_index: String,
    pub affected_regions: String,
    pub last_scaling: String,

    // Etapa 4: exames complementares
    pub radiography_periapical: bool,
    pub radiography_panoramic: bool,
    pub radiography_other: bool,
    pub radiography_other_details: String,
    pub glucose_level: String,
    pub glucose_date: String,
    pub hba1c: String,
    pub blood_pressure: String,
    pub blood_pressure_date: String,
    pub cholesterol: String,
    pub crp: String,
    pub other_exams: String,
    pub attached_images: Vec<String>,
    pub attached_radiographs: Vec<String>,
    pub attached_lab_exams: Vec<String>,

    // Etapa 5: PSR
    pub psr_codes: PsrCodes,
    /// Furca, recessão > 3,5mm ou mobilidade
    pub psr_associated_findings: bool,

    // Etapa 6: condutas realizadas
    pub interventions_done: Vec<String>,
    pub last_intervention_date: String,

    // Etapa 7: objetivo
    pub consultation_objective: Vec<String>,
    pub other_consultation_objective: String,
}

/// Alterna um item de uma seleção múltipla: adiciona se ausente, remove se presente
pub fn toggle_selection(list: &mut Vec<String>, item: &str) {
    if let Some(pos) = list.iter().position(|existing| existing == item) {
        list.remove(pos);
    } else {
        list.push(item.to_string());
    }
}

impl FormData {
    /// Simula o anexo de um arquivo; apenas o nome fictício é registrado
    pub fn attach_simulated(&mut self, kind: AttachmentKind, millis: i64) -> String {
        let file_name = format!("arquivo_simulado_{}.png", millis);
        let target = match kind {
            AttachmentKind::Image => &mut self.attached_images,
            AttachmentKind::Radiograph => &mut self.attached_radiographs,
            AttachmentKind::LabExam => &mut self.attached_lab_exams,
        };
        target.push(file_name.clone());
        file_name
    }

    /// Lista de exames complementares em texto, a partir da etapa 4
    pub fn complementary_exams(&self) -> Vec<String> {
        let mut exams = Vec::new();
        if self.radiography_periapical {
            exams.push("Radiografia Periapical".to_string());
        }
        if self.radiography_panoramic {
            exams.push("Panorâmica".to_string());
        }
        if self.radiography_other {
            let details = self.radiography_other_details.trim();
            if details.is_empty() {
                exams.push("Outras radiografias".to_string());
            } else {
                exams.push(format!("Radiografia: {}", details));
            }
        }
        let labeled = [
            ("Glicemia", &self.glucose_level),
            ("HbA1c", &self.hba1c),
            ("Pressão arterial", &self.blood_pressure),
            ("Colesterol", &self.cholesterol),
            ("PCR", &self.crp),
        ];
        for (label, value) in labeled {
            if !value.trim().is_empty() {
                exams.push(format!("{}: {}", label, value.trim()));
            }
        }
        if !self.other_exams.trim().is_empty() {
            exams.push(self.other_exams.trim().to_string());
        }
        exams
    }

    /// Resumo textual da avaliação periodontal (etapas 3 e 5)
    pub fn periodontal_summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        let labeled = [
            ("Sangramento", &self.gingival_bleeding),
            ("Profundidade de sondagem máxima", &self.max_probing_depth),
            ("Mobilidade", &self.tooth_mobility),
            ("Supuração", &self.suppuration),
            ("Recessão", &self.gingival_recession),
            ("Dentes ausentes por perda periodontal", &self.missing_teeth),
            ("Índice de placa", &self.plaque_index),
            ("Regiões mais acometidas", &self.affected_regions),
        ];
        for (label, value) in labeled {
            if !value.trim().is_empty() {
                parts.push(format!("{}: {}", label, value.trim()));
            }
        }
        if let Some(code) = self.psr_codes.highest_code() {
            parts.push(format!("PSR máximo: {}", code));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(". "))
        }
    }

    /// Campos recomendados ainda vazios em uma etapa. Usado apenas para avisos.
    pub fn missing_fields(&self, step: u8) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match step {
            1 => {
                if self.patient_initials.trim().is_empty() {
                    missing.push("patientInitials");
                }
                if self.patient_age.trim().is_empty() {
                    missing.push("patientAge");
                }
            }
            2 => {
                if self.main_complaint.trim().is_empty() {
                    missing.push("mainComplaint");
                }
            }
            3 => {
                if self.gingival_bleeding.trim().is_empty() {
                    missing.push("gingivalBleeding");
                }
                if self.max_probing_depth.trim().is_empty() {
                    missing.push("maxProbingDepth");
                }
            }
            5 => {
                if self.psr_codes.is_empty() {
                    missing.push("psrCodes");
                }
            }
            7 => {
                if self.consultation_objective.is_empty()
                    && self.other_consultation_objective.trim().is_empty()
                {
                    missing.push("consultationObjective");
                }
            }
            _ => {}
        }
        missing
    }
}
