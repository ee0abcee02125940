//! Device Checklist Common Library
//!
//! 受付チェックリストの中核処理（I/Oなし）:
//! 回答モデル、故障診断ルール、帳票ドキュメント構築、ページ分割

pub mod types;
pub mod error;
pub mod diagnosis;
pub mod document;
pub mod layout;
pub mod pagination;

pub use types::{
    AnswerState, InspectionAnswers, InspectionQuestion, InspectionRecord, Photo, RepairType,
    PHOTO_SLOTS,
};
pub use error::{Error, RequiredField, Result};
pub use diagnosis::{infer, Diagnosis, Subsystem};
pub use document::{compose, Document, DocumentMeta, Section, SectionBody, SectionKind};
pub use layout::PageGeometry;
pub use pagination::{page_offsets, paginate, PageOffsets};
