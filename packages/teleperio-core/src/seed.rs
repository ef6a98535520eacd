//! Casos simulados usados para popular o repositório em memória

use crate::models::{Case, CaseCategory, CaseStatus, Referral, SpecialistResponse};
use chrono::{NaiveDate, NaiveDateTime};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

const GUNA_RESPONSE: &str = "Olá! Analisei o caso da Sra. L. G. A descrição e imagens sugerem GUNA. \
Sugiro iniciar terapia periodontal de suporte e acompanhamento rigoroso. \
Se não houver melhora, considerar biópsia.";

/// Casos de exemplo das duas visões (solicitante `s*`, especialista `e*`)
pub fn simulated_cases() -> Vec<Case> {
    vec![
        Case {
            id: "s001".to_string(),
            category: CaseCategory::SurgicalIndication,
            patient_initials: "GL".to_string(),
            created_at: at(2025, 6, 17, 10, 25),
            status: CaseStatus::InAnalysisRequester,
            consultation_reason: Some("Discussão de conduta cirúrgica".to_string()),
            clinical_question: Some(
                "Paciente com periodontite avançada e necessidade de enxerto ósseo. \
                 Qual a melhor abordagem? Apresenta doença periodontal generalizada, bolsa de 7mm no 26."
                    .to_string(),
            ),
            dental_history: Some(
                "Tratamento periodontal anterior há 2 anos, mas sem controle adequado. \
                 Queixa de sangramento e mobilidade no 26."
                    .to_string(),
            ),
            periodontal_assessment: Some(
                "Sangramento à sondagem em 40% dos sítios, bolsa de 7mm no 26 distal. \
                 Mobilidade Grau II no 26."
                    .to_string(),
            ),
            complementary_exams: strings(&["Radiografia Periapical (26)", "Panorâmica"]),
            specialist_response: None,
        },
        Case {
            id: "s002".to_string(),
            category: CaseCategory::DiagnosticGuidance,
            patient_initials: "LG".to_string(),
            created_at: at(2025, 6, 17, 10, 25),
            status: CaseStatus::RespondedRequester,
            consultation_reason: Some("Apoio diagnóstico".to_string()),
            clinical_question: Some(
                "Paciente com lesão em gengiva, suspeita de GUNA. Preciso de confirmação. \
                 Há dor intensa e necrose papilar."
                    .to_string(),
            ),
            dental_history: Some(
                "Paciente nunca teve problemas periodontais antes. Queixa apareceu de repente."
                    .to_string(),
            ),
            periodontal_assessment: Some(
                "Gengiva avermelhada, sangramento espontâneo, papilas necróticas. \
                 PSR código 4 em sextante inferior anterior."
                    .to_string(),
            ),
            complementary_exams: vec![],
            specialist_response: Some(SpecialistResponse {
                text: GUNA_RESPONSE.to_string(),
                referral: Some(Referral::No),
                referral_specialty: None,
                return_interval: Some("30 dias".to_string()),
                notes: Some("Importante avaliar hábitos de higiene e estresse.".to_string()),
            }),
        },
        Case {
            id: "s003".to_string(),
            category: CaseCategory::PostOperativeComplication,
            patient_initials: "SRA".to_string(),
            created_at: at(2025, 6, 17, 10, 25),
            status: CaseStatus::RespondedRequester,
            consultation_reason: Some("Conduta frente a complicação pós-operatória".to_string()),
            clinical_question: Some(
                "Edema e dor persistentes após exodontia de terceiro molar inferior há 5 dias. Febre leve."
                    .to_string(),
            ),
            dental_history: Some(
                "Exodontia de 38, sem intercorrências durante o procedimento. Paciente relata dor crescente."
                    .to_string(),
            ),
            periodontal_assessment: Some(
                "Edema acentuado, trismo, supuração leve. PSR sem alteração.".to_string(),
            ),
            complementary_exams: strings(&["Radiografia Pós-operatória"]),
            specialist_response: Some(SpecialistResponse {
                text: "Sugiro reavaliação presencial, descartar alveolite. Prescrever \
                       anti-inflamatório e analgésico. Se houver febre persistente, considerar antibiótico."
                    .to_string(),
                referral: Some(Referral::Yes),
                referral_specialty: Some("Cirurgia Oral".to_string()),
                return_interval: Some("2 dias".to_string()),
                notes: Some(
                    "Necessário desbridamento e irrigação local se for alveolite.".to_string(),
                ),
            }),
        },
        Case {
            id: "s006".to_string(),
            category: CaseCategory::DiagnosticGuidance,
            patient_initials: "JP".to_string(),
            created_at: at(2025, 7, 18, 9, 0),
            status: CaseStatus::Pending,
            consultation_reason: Some("Apoio diagnóstico".to_string()),
            clinical_question: Some(
                "Suspeita de periodontite agressiva em paciente jovem de 22 anos, sem fatores de \
                 risco sistêmicos conhecidos. Destruição óssea rápida generalizada."
                    .to_string(),
            ),
            dental_history: Some(
                "Sem histórico de tratamento periodontal prévio. Começou a notar mobilidade nos \
                 dentes da frente recentemente."
                    .to_string(),
            ),
            periodontal_assessment: Some(
                "Perda de inserção generalizada, PSR 4 em todos os sextantes. Sem sangramento à sondagem."
                    .to_string(),
            ),
            complementary_exams: strings(&["Panorâmica"]),
            specialist_response: None,
        },
        Case {
            id: "e001".to_string(),
            category: CaseCategory::DiagnosticGuidance,
            patient_initials: "LG".to_string(),
            created_at: at(2025, 6, 17, 10, 25),
            status: CaseStatus::RespondedSpecialist,
            consultation_reason: Some("Apoio diagnóstico".to_string()),
            clinical_question: Some(
                "Paciente com lesão em gengiva, suspeita de GUNA. Preciso de confirmação.".to_string(),
            ),
            dental_history: Some(
                "Paciente nunca teve problemas periodontais antes. Queixa apareceu de repente."
                    .to_string(),
            ),
            periodontal_assessment: Some(
                "Gengiva avermelhada, sangramento espontâneo, papilas necróticas. \
                 PSR código 4 em sextante inferior anterior."
                    .to_string(),
            ),
            complementary_exams: vec![],
            specialist_response: Some(SpecialistResponse {
                text: GUNA_RESPONSE.to_string(),
                referral: Some(Referral::No),
                referral_specialty: None,
                return_interval: Some("30 dias".to_string()),
                notes: Some("Importante avaliar hábitos de higiene e estresse.".to_string()),
            }),
        },
        Case {
            id: "e002".to_string(),
            category: CaseCategory::SurgicalIndication,
            patient_initials: "RS".to_string(),
            created_at: at(2025, 7, 18, 11, 0),
            status: CaseStatus::NewSpecialist,
            consultation_reason: Some("Discussão de conduta cirúrgica".to_string()),
            clinical_question: Some(
                "Qual a técnica de enxerto mais indicada para caso de perda óssea severa no dente 46? \
                 Paciente relata mobilidade."
                    .to_string(),
            ),
            dental_history: Some(
                "Paciente passou por tratamento periodontal não cirúrgico há 1 ano. Remissão de \
                 bolsa, mas com perda óssea persistente."
                    .to_string(),
            ),
            periodontal_assessment: Some(
                "Bolsa de 6mm na distal do 46, perda óssea horizontal significativa. PSR 3."
                    .to_string(),
            ),
            complementary_exams: strings(&["Tomografia (46)"]),
            specialist_response: None,
        },
        Case {
            id: "e003".to_string(),
            category: CaseCategory::TherapeuticSuggestion,
            patient_initials: "MC".to_string(),
            created_at: at(2025, 7, 18, 14, 30),
            status: CaseStatus::InAnalysisSpecialist,
            consultation_reason: Some("Apoio terapêutico".to_string()),
            clinical_question: Some(
                "Paciente gestante (5 meses) com gengivite grave, qual tratamento periodontal posso \
                 fazer sem risco ao bebê?"
                    .to_string(),
            ),
            dental_history: Some(
                "Gengivite pré-existente piorou durante a gravidez. Paciente está preocupada."
                    .to_string(),
            ),
            periodontal_assessment: Some(
                "Gengiva edemaciada, muito sangramento espontâneo. PSR 2.".to_string(),
            ),
            complementary_exams: vec![],
            specialist_response: Some(SpecialistResponse {
                text: "Para gestantes, o foco é na raspagem e alisamento radicular não cirúrgico, \
                       com ênfase na higiene oral. Evitar medicamentos sistêmicos. Pode ser realizado \
                       no segundo trimestre. Se houver dúvidas, me avise."
                    .to_string(),
                referral: Some(Referral::No),
                referral_specialty: None,
                return_interval: Some("15 dias".to_string()),
                notes: Some("Foco na remoção de fatores irritantes locais.".to_string()),
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fixture_ids_are_unique() {
        let cases = simulated_cases();
        let ids: HashSet<_> = cases.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), cases.len());
    }

    #[test]
    fn test_only_responded_or_analysed_cases_carry_responses() {
        for case in simulated_cases() {
            if case.status == CaseStatus::Pending || case.status == CaseStatus::NewSpecialist {
                assert!(case.specialist_response.is_none(), "caso {}", case.id);
            }
            if case.status.is_responded() {
                assert!(case.specialist_response.is_some(), "caso {}", case.id);
            }
        }
    }
}
