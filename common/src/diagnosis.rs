//! 故障診断ルール
//!
//! 検査回答から想定される故障原因を導出する。
//! 各ルールは1〜2設問の Sim/Não だけを見る。Não possível testar と未回答は
//! どのルールも発火させない。

use crate::types::{AnswerState, InspectionAnswers, InspectionQuestion, InspectionRecord};
use serde::Serialize;

/// 診断対象の系統（出力順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Subsystem {
    Screen,
    Physical,
    Camera,
    Audio,
    Power,
    Moisture,
}

/// 診断結果1行分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Diagnosis {
    DisplayReplacement,
    TouchFault,
    ScreenNoImage,
    BackCoverReplacement,
    ButtonFault,
    CameraModuleReplacement,
    CameraExposed,
    NoSound,
    AudioOutputRepair,
    NoPower,
    NoCharging,
    MoistureRisk,
    /// 何も発火しなかった場合の1行
    NoSignificantDefect,
}

impl Diagnosis {
    pub fn statement(self) -> &'static str {
        match self {
            Diagnosis::DisplayReplacement => {
                "Problema na tela: Possível necessidade de troca do display"
            }
            Diagnosis::TouchFault => "Touch não funciona: Problema no digitalizador ou cabo flex",
            Diagnosis::ScreenNoImage => {
                "Tela não acende: Possível problema no LCD/OLED ou placa mãe"
            }
            Diagnosis::BackCoverReplacement => {
                "Traseira quebrada: Necessidade de troca da tampa traseira"
            }
            Diagnosis::ButtonFault => {
                "Botões não funcionam: Problema nos botões físicos ou cabo flex"
            }
            Diagnosis::CameraModuleReplacement => {
                "Câmera danificada: Possível troca do módulo da câmera"
            }
            Diagnosis::CameraExposed => "Câmera exposta: Risco de danos internos, verificar proteção",
            Diagnosis::NoSound => "Sem som: Problema no alto-falante ou circuito de áudio",
            Diagnosis::AudioOutputRepair => "Saída de áudio danificada: Necessária limpeza ou reparo",
            Diagnosis::NoPower => {
                "Aparelho não liga: Problema na bateria, carregador ou placa mãe"
            }
            Diagnosis::NoCharging => {
                "Não carrega: Problema no conector de carga ou circuito de carregamento"
            }
            Diagnosis::MoistureRisk => {
                "Sinais de umidade: Risco de oxidação, limpeza completa necessária"
            }
            Diagnosis::NoSignificantDefect => {
                "Nenhum defeito significativo detectado na inspeção visual"
            }
        }
    }

    /// 所属系統（「異常なし」はNone）
    pub fn subsystem(self) -> Option<Subsystem> {
        RULES
            .iter()
            .find(|rule| rule.diagnosis == self)
            .map(|rule| rule.subsystem)
    }

    pub fn is_finding(self) -> bool {
        self != Diagnosis::NoSignificantDefect
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.statement())
    }
}

/// 発火条件（いずれか1つ一致で発火）
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticRule {
    pub subsystem: Subsystem,
    pub any_of: &'static [(InspectionQuestion, AnswerState)],
    pub diagnosis: Diagnosis,
}

impl DiagnosticRule {
    pub fn fires(&self, answers: &InspectionAnswers) -> bool {
        self.any_of
            .iter()
            .any(|&(question, state)| answers.is(question, state))
    }
}

use AnswerState::{No, Yes};
use InspectionQuestion as Q;

/// ルール表（この並びがそのまま出力順）
pub const RULES: &[DiagnosticRule] = &[
    DiagnosticRule {
        subsystem: Subsystem::Screen,
        any_of: &[(Q::ScreenCracked, Yes), (Q::ScreenScratched, Yes)],
        diagnosis: Diagnosis::DisplayReplacement,
    },
    DiagnosticRule {
        subsystem: Subsystem::Screen,
        any_of: &[(Q::TouchWorks, No)],
        diagnosis: Diagnosis::TouchFault,
    },
    DiagnosticRule {
        subsystem: Subsystem::Screen,
        any_of: &[(Q::ScreenWorks, No)],
        diagnosis: Diagnosis::ScreenNoImage,
    },
    DiagnosticRule {
        subsystem: Subsystem::Physical,
        any_of: &[(Q::BackBroken, Yes)],
        diagnosis: Diagnosis::BackCoverReplacement,
    },
    DiagnosticRule {
        subsystem: Subsystem::Physical,
        any_of: &[(Q::ButtonsWork, No)],
        diagnosis: Diagnosis::ButtonFault,
    },
    DiagnosticRule {
        subsystem: Subsystem::Camera,
        any_of: &[(Q::CameraLensDamaged, Yes), (Q::CameraDamaged, Yes)],
        diagnosis: Diagnosis::CameraModuleReplacement,
    },
    DiagnosticRule {
        subsystem: Subsystem::Camera,
        any_of: &[(Q::CameraExposed, Yes)],
        diagnosis: Diagnosis::CameraExposed,
    },
    DiagnosticRule {
        subsystem: Subsystem::Audio,
        any_of: &[(Q::HasSound, No)],
        diagnosis: Diagnosis::NoSound,
    },
    DiagnosticRule {
        subsystem: Subsystem::Audio,
        any_of: &[(Q::AudioOutputDamaged, Yes)],
        diagnosis: Diagnosis::AudioOutputRepair,
    },
    DiagnosticRule {
        subsystem: Subsystem::Power,
        any_of: &[(Q::DeviceTurnsOn, No)],
        diagnosis: Diagnosis::NoPower,
    },
    DiagnosticRule {
        subsystem: Subsystem::Power,
        any_of: &[(Q::DeviceCharges, No)],
        diagnosis: Diagnosis::NoCharging,
    },
    DiagnosticRule {
        subsystem: Subsystem::Moisture,
        any_of: &[(Q::MoistureSigns, Yes)],
        diagnosis: Diagnosis::MoistureRisk,
    },
];

/// 回答表から診断を導出（常に1行以上）
pub fn infer(record: &InspectionRecord) -> Vec<Diagnosis> {
    let findings: Vec<Diagnosis> = RULES
        .iter()
        .filter(|rule| rule.fires(&record.answers))
        .map(|rule| rule.diagnosis)
        .collect();

    if findings.is_empty() {
        vec![Diagnosis::NoSignificantDefect]
    } else {
        findings
    }
}
