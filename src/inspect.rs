//! 対話式の受付入力モジュール
//!
//! 受付情報・修理区分・18設問の回答・写真を順に入力し、レコードJSONに保存する。

use crate::error::{ChecklistError, Result};
use crate::intake;
use device_checklist_common::{
    infer, AnswerState, InspectionQuestion, InspectionRecord, RepairType, PHOTO_SLOTS,
};
use dialoguer::{Confirm, Input, MultiSelect, Select};
use std::path::{Path, PathBuf};

/// 回答の選択肢（並び = Select のインデックス）
const ANSWER_CHOICES: [&str; 4] = ["Sim", "Não", "Não possível testar", "Não respondido"];

/// 選択肢インデックス → 回答
pub fn state_from_choice(index: usize) -> Option<AnswerState> {
    match index {
        0 => Some(AnswerState::Yes),
        1 => Some(AnswerState::No),
        2 => Some(AnswerState::NotTestable),
        _ => None,
    }
}

/// 回答 → 選択肢インデックス
pub fn choice_for_state(state: Option<AnswerState>) -> usize {
    match state {
        Some(AnswerState::Yes) => 0,
        Some(AnswerState::No) => 1,
        Some(AnswerState::NotTestable) => 2,
        None => 3,
    }
}

fn prompt_err(e: dialoguer::Error) -> ChecklistError {
    ChecklistError::Prompt(e.to_string())
}

fn prompt_text(prompt: &str, current: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)
}

/// 対話式で受付レコードを入力
pub fn run_interactive_inspection(record_path: &Path) -> Result<()> {
    let mut record = if record_path.exists() {
        let record = intake::load_record(record_path)?;
        let keep = Confirm::new()
            .with_prompt("Continuar editando o checklist existente? (não = começar novo)")
            .default(true)
            .interact()
            .map_err(prompt_err)?;
        if keep {
            record
        } else {
            InspectionRecord::new()
        }
    } else {
        InspectionRecord::new()
    };

    println!("📋 Informações Básicas");
    record.date = prompt_text("Data", &record.date)?;
    record.service_order = prompt_text("Número da OS", &record.service_order)?;
    record.customer_name = prompt_text("Cliente", &record.customer_name)?;

    let labels: Vec<&str> = RepairType::ALL.iter().map(|t| t.label()).collect();
    let selected: Vec<bool> = RepairType::ALL
        .iter()
        .map(|t| record.repair_types.contains(t))
        .collect();
    let chosen = MultiSelect::new()
        .with_prompt("Tipo de Reparo")
        .items(&labels)
        .defaults(&selected)
        .interact()
        .map_err(prompt_err)?;
    for (i, repair_type) in RepairType::ALL.iter().enumerate() {
        record.set_repair_type(*repair_type, chosen.contains(&i));
    }
    if record.has_estimate() {
        record.problem_text = prompt_text("Descrição do Problema", &record.problem_text)?;
    }

    println!("\n🔍 Inspeção Visual");
    for (count, question) in InspectionQuestion::ALL.iter().enumerate() {
        let index = Select::new()
            .with_prompt(format!(
                "[{}/{}] {}",
                count + 1,
                InspectionQuestion::COUNT,
                question.label()
            ))
            .items(&ANSWER_CHOICES)
            .default(choice_for_state(record.answer(*question)))
            .interact()
            .map_err(prompt_err)?;
        record.set_answer(*question, state_from_choice(index));
    }

    println!("\n📷 Fotos");
    for slot in 1..=PHOTO_SLOTS {
        let current = record.photos[slot - 1]
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let path = prompt_text(
            &format!("Foto {} (caminho, vazio para manter)", slot),
            "",
        )?;
        if path.trim().is_empty() {
            if !current.is_empty() {
                println!("  → {} (mantida)", current);
            }
            continue;
        }
        match intake::attach_photo(&mut record, slot, &PathBuf::from(path.trim())) {
            Ok(()) => println!("  → anexada"),
            // 不正な画像は入力全体を止めずに読み飛ばす
            Err(e) => println!("  ✗ {}", e),
        }
    }

    intake::save_record(&record, record_path)?;
    println!("\n✔ Checklist salvo: {}", record_path.display());

    println!("\nAnálise preliminar:");
    for diagnosis in infer(&record) {
        println!("  • {}", diagnosis);
    }

    match record.validate() {
        Ok(()) => println!("\n→ checklist generate {}", record_path.display()),
        Err(e) => println!("\n⚠ {} (geração de PDF desabilitada)", e),
    }

    Ok(())
}
