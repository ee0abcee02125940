//! 帳票ドキュメント構築
//!
//! 受付レコードと診断結果から、描画前の構造化ドキュメントを組み立てる。
//! セクション順は固定:
//! ヘッダー → 基本情報 → 依頼内容 → (故障内容) → 外観検査 → 写真 → 診断 → 生成日時

use crate::diagnosis::Diagnosis;
use crate::types::{answer_marker, AnswerState, InspectionRecord, Photo};
use chrono::NaiveDateTime;

pub const DEFAULT_BRAND: &str = "JCELL";
pub const NO_REPAIR_TYPE_PLACEHOLDER: &str = "Nenhum selecionado";
pub const NO_PHOTOS_PLACEHOLDER: &str = "Nenhuma foto anexada";
pub const BULLET: &str = "• ";

const TITLE_BASIC_INFO: &str = "Informações Básicas";
const TITLE_SERVICES: &str = "Serviços Solicitados";
const TITLE_INSPECTION: &str = "Inspeção Visual";
const TITLE_PHOTOS: &str = "Fotos";
const TITLE_FINDINGS: &str = "Análise de Defeitos e Possíveis Problemas";
const TITLE_NO_FINDINGS: &str = "Análise de Defeitos";

/// セクション種別（宣言順 = 出力順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SectionKind {
    Header,
    BasicInfo,
    RequestedServices,
    ProblemDescription,
    VisualInspection,
    Photos,
    Diagnostics,
    Footer,
}

/// ラベル付きの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// 外観検査の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistLine {
    pub label: &'static str,
    pub state: Option<AnswerState>,
}

impl ChecklistLine {
    pub fn marker(&self) -> &'static str {
        answer_marker(self.state)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryPhoto {
    pub slot: usize,
    pub photo: Photo,
}

/// セクション本体
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    Header { title: String },
    KeyValue(Vec<Field>),
    ConditionalBlock { label: String, text: String },
    Checklist(Vec<ChecklistLine>),
    /// 空の場合は NO_PHOTOS_PLACEHOLDER を表示
    Gallery(Vec<GalleryPhoto>),
    List { items: Vec<String>, bulleted: bool },
    Footer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub title: Option<String>,
    pub body: SectionBody,
}

impl Section {
    fn new(kind: SectionKind, title: Option<&str>, body: SectionBody) -> Self {
        Self {
            kind,
            title: title.map(str::to_string),
            body,
        }
    }

    /// 本文を装飾なしのテキスト行に展開
    pub fn body_lines(&self) -> Vec<String> {
        match &self.body {
            SectionBody::Header { title } => vec![title.clone()],
            SectionBody::KeyValue(fields) => fields
                .iter()
                .map(|f| format!("{}: {}", f.label, f.value))
                .collect(),
            SectionBody::ConditionalBlock { label, text } => {
                let mut lines = vec![label.clone()];
                lines.extend(text.lines().map(str::to_string));
                lines
            }
            SectionBody::Checklist(lines) => lines
                .iter()
                .map(|l| format!("{}: {}", l.label, l.marker()))
                .collect(),
            SectionBody::Gallery(photos) if photos.is_empty() => {
                vec![NO_PHOTOS_PLACEHOLDER.to_string()]
            }
            SectionBody::Gallery(photos) => photos
                .iter()
                .map(|p| format!("Foto {}: {}", p.slot + 1, p.photo.name))
                .collect(),
            SectionBody::List { items, bulleted } => items
                .iter()
                .map(|item| {
                    if *bulleted {
                        format!("{}{}", BULLET, item)
                    } else {
                        item.clone()
                    }
                })
                .collect(),
            SectionBody::Footer(text) => vec![text.clone()],
        }
    }
}

/// 描画前のドキュメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn photo_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| match &s.body {
                SectionBody::Gallery(photos) => photos.len(),
                _ => 0,
            })
            .sum()
    }

    /// クリップボード用のプレーンテキスト
    pub fn to_plain_text(&self) -> String {
        self.sections
            .iter()
            .map(|section| {
                let mut lines = Vec::new();
                if let Some(title) = &section.title {
                    lines.push(title.clone());
                }
                lines.extend(section.body_lines());
                lines.join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// 構築時に外から与える情報
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    pub brand: String,
    pub generated_at: NaiveDateTime,
}

impl DocumentMeta {
    pub fn new(brand: impl Into<String>, generated_at: NaiveDateTime) -> Self {
        Self {
            brand: brand.into(),
            generated_at,
        }
    }

    /// 現在時刻で生成
    pub fn now(brand: impl Into<String>) -> Self {
        Self::new(brand, chrono::Local::now().naive_local())
    }
}

/// "19/10/2026, 14:03:22" 形式
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// レコード + 診断 → ドキュメント
pub fn compose(record: &InspectionRecord, diagnoses: &[Diagnosis], meta: &DocumentMeta) -> Document {
    let mut sections = Vec::with_capacity(8);

    sections.push(Section::new(
        SectionKind::Header,
        None,
        SectionBody::Header {
            title: format!("{} - Checklist Técnico", meta.brand),
        },
    ));

    sections.push(Section::new(
        SectionKind::BasicInfo,
        Some(TITLE_BASIC_INFO),
        SectionBody::KeyValue(vec![
            Field::new("Data", record.date.as_str()),
            Field::new("Número da OS", record.service_order.as_str()),
            Field::new("Cliente", record.customer_name.as_str()),
        ]),
    ));

    let repair_types = if record.repair_types.is_empty() {
        NO_REPAIR_TYPE_PLACEHOLDER.to_string()
    } else {
        record
            .repair_types
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join(", ")
    };
    sections.push(Section::new(
        SectionKind::RequestedServices,
        Some(TITLE_SERVICES),
        SectionBody::KeyValue(vec![Field::new("Tipo de Reparo", repair_types)]),
    ));

    if let Some(text) = record.problem_description() {
        sections.push(Section::new(
            SectionKind::ProblemDescription,
            None,
            SectionBody::ConditionalBlock {
                label: "Descrição do Problema:".to_string(),
                text: text.to_string(),
            },
        ));
    }

    sections.push(Section::new(
        SectionKind::VisualInspection,
        Some(TITLE_INSPECTION),
        SectionBody::Checklist(
            record
                .answers
                .iter()
                .map(|(question, state)| ChecklistLine {
                    label: question.label(),
                    state,
                })
                .collect(),
        ),
    ));

    sections.push(Section::new(
        SectionKind::Photos,
        Some(TITLE_PHOTOS),
        SectionBody::Gallery(
            record
                .attached_photos()
                .map(|(slot, photo)| GalleryPhoto {
                    slot,
                    photo: photo.clone(),
                })
                .collect(),
        ),
    ));

    let has_findings = diagnoses.iter().any(|d| d.is_finding());
    let items: Vec<String> = if diagnoses.is_empty() {
        vec![Diagnosis::NoSignificantDefect.statement().to_string()]
    } else {
        diagnoses.iter().map(|d| d.statement().to_string()).collect()
    };
    sections.push(Section::new(
        SectionKind::Diagnostics,
        Some(if has_findings { TITLE_FINDINGS } else { TITLE_NO_FINDINGS }),
        SectionBody::List {
            items,
            bulleted: true,
        },
    ));

    sections.push(Section::new(
        SectionKind::Footer,
        None,
        SectionBody::Footer(format!(
            "Checklist gerado em {}",
            format_timestamp(&meta.generated_at)
        )),
    ));

    Document { sections }
}
