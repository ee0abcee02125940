//! 受付チェックリストの型定義
//!
//! CLIと診断・帳票処理で共有される型:
//! - InspectionQuestion: 外観・動作検査の設問（18問、表示順固定）
//! - AnswerState: 回答（Sim / Não / Não possível testar、未回答はNone）
//! - InspectionRecord: 受付情報 + 回答 + 添付写真

use crate::error::{Error, RequiredField, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 添付写真スロット数
pub const PHOTO_SLOTS: usize = 3;

/// 未回答時の表示
pub const UNANSWERED_MARKER: &str = "- Não respondido";

/// 検査設問（宣言順 = 帳票の表示順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InspectionQuestion {
    HasPhysicalButtons,
    ButtonsWork,
    ScreenWorks,
    TouchWorks,
    ScreenCracked,
    ScreenScratched,
    BackBroken,
    BackScratched,
    CameraLensDamaged,
    CameraExposed,
    CameraDamaged,
    AudioOutputDamaged,
    AudioOutputDirty,
    HasSound,
    HeadphoneJackDamaged,
    DeviceTurnsOn,
    DeviceCharges,
    MoistureSigns,
}

impl InspectionQuestion {
    pub const COUNT: usize = 18;

    /// 全設問（表示順）
    pub const ALL: [InspectionQuestion; Self::COUNT] = [
        InspectionQuestion::HasPhysicalButtons,
        InspectionQuestion::ButtonsWork,
        InspectionQuestion::ScreenWorks,
        InspectionQuestion::TouchWorks,
        InspectionQuestion::ScreenCracked,
        InspectionQuestion::ScreenScratched,
        InspectionQuestion::BackBroken,
        InspectionQuestion::BackScratched,
        InspectionQuestion::CameraLensDamaged,
        InspectionQuestion::CameraExposed,
        InspectionQuestion::CameraDamaged,
        InspectionQuestion::AudioOutputDamaged,
        InspectionQuestion::AudioOutputDirty,
        InspectionQuestion::HasSound,
        InspectionQuestion::HeadphoneJackDamaged,
        InspectionQuestion::DeviceTurnsOn,
        InspectionQuestion::DeviceCharges,
        InspectionQuestion::MoistureSigns,
    ];

    /// 表示順インデックス
    pub fn index(self) -> usize {
        self as usize
    }

    /// 帳票に表示する設問文
    pub fn label(self) -> &'static str {
        match self {
            InspectionQuestion::HasPhysicalButtons => "Há botões físicos?",
            InspectionQuestion::ButtonsWork => "Botões funcionam?",
            InspectionQuestion::ScreenWorks => "Tela acende e exibe imagem?",
            InspectionQuestion::TouchWorks => "Touch funciona?",
            InspectionQuestion::ScreenCracked => "Tela trincada?",
            InspectionQuestion::ScreenScratched => "Tela riscada?",
            InspectionQuestion::BackBroken => "Traseira quebrada?",
            InspectionQuestion::BackScratched => "Traseira riscada?",
            InspectionQuestion::CameraLensDamaged => "Lente da câmera danificada?",
            InspectionQuestion::CameraExposed => "Câmera exposta?",
            InspectionQuestion::CameraDamaged => "Câmera danificada?",
            InspectionQuestion::AudioOutputDamaged => "Saídas de som danificadas?",
            InspectionQuestion::AudioOutputDirty => "Saídas de som sujas?",
            InspectionQuestion::HasSound => "O aparelho tem som?",
            InspectionQuestion::HeadphoneJackDamaged => "Entrada de fone de ouvido danificada?",
            InspectionQuestion::DeviceTurnsOn => "Aparelho liga (vibra)?",
            InspectionQuestion::DeviceCharges => "O celular carrega?",
            InspectionQuestion::MoistureSigns => "Há sinais de umidade?",
        }
    }
}

/// 設問への回答（未回答は `Option::None` で表す）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerState {
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "no")]
    No,
    #[serde(rename = "na")]
    NotTestable,
}

impl AnswerState {
    /// 帳票上の回答表示
    pub fn marker(self) -> &'static str {
        match self {
            AnswerState::Yes => "✅ Sim",
            AnswerState::No => "❌ Não",
            AnswerState::NotTestable => "⚠️ Não possível testar",
        }
    }
}

/// 未回答を含めた回答表示
pub fn answer_marker(state: Option<AnswerState>) -> &'static str {
    state.map(AnswerState::marker).unwrap_or(UNANSWERED_MARKER)
}

/// 全18設問の回答表
///
/// JSON上は `{"screenCracked": "yes", "touchWorks": null, ...}` 形式。
/// 欠けたキーは未回答として読み込む。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<InspectionQuestion, Option<AnswerState>>",
    into = "BTreeMap<InspectionQuestion, Option<AnswerState>>"
)]
pub struct InspectionAnswers {
    states: [Option<AnswerState>; InspectionQuestion::COUNT],
}

impl Default for InspectionAnswers {
    fn default() -> Self {
        Self {
            states: [None; InspectionQuestion::COUNT],
        }
    }
}

impl InspectionAnswers {
    pub fn get(&self, question: InspectionQuestion) -> Option<AnswerState> {
        self.states[question.index()]
    }

    pub fn set(&mut self, question: InspectionQuestion, state: Option<AnswerState>) {
        self.states[question.index()] = state;
    }

    /// 指定の回答と一致するか
    pub fn is(&self, question: InspectionQuestion, state: AnswerState) -> bool {
        self.get(question) == Some(state)
    }

    /// (設問, 回答) を表示順で列挙
    pub fn iter(&self) -> impl Iterator<Item = (InspectionQuestion, Option<AnswerState>)> + '_ {
        InspectionQuestion::ALL
            .into_iter()
            .map(move |q| (q, self.get(q)))
    }

    /// 回答済みの設問数
    pub fn answered_count(&self) -> usize {
        self.states.iter().filter(|s| s.is_some()).count()
    }
}

impl From<BTreeMap<InspectionQuestion, Option<AnswerState>>> for InspectionAnswers {
    fn from(map: BTreeMap<InspectionQuestion, Option<AnswerState>>) -> Self {
        let mut answers = Self::default();
        for (question, state) in map {
            answers.set(question, state);
        }
        answers
    }
}

impl From<InspectionAnswers> for BTreeMap<InspectionQuestion, Option<AnswerState>> {
    fn from(answers: InspectionAnswers) -> Self {
        answers.iter().collect()
    }
}

/// 依頼された修理区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RepairType {
    #[serde(rename = "tela")]
    ScreenReplacement,
    #[serde(rename = "bateria")]
    BatteryReplacement,
    #[serde(rename = "conector")]
    ChargeConnector,
    #[serde(rename = "software")]
    Software,
    /// 見積もり（故障内容の記述欄を伴う）
    #[serde(rename = "orcamento")]
    Estimate,
}

impl RepairType {
    pub const ALL: [RepairType; 5] = [
        RepairType::ScreenReplacement,
        RepairType::BatteryReplacement,
        RepairType::ChargeConnector,
        RepairType::Software,
        RepairType::Estimate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RepairType::ScreenReplacement => "Troca de tela",
            RepairType::BatteryReplacement => "Troca de bateria",
            RepairType::ChargeConnector => "Conector de carga",
            RepairType::Software => "Software",
            RepairType::Estimate => "Orçamento",
        }
    }
}

/// 添付写真（検証済みの画像バイト列）
///
/// JSON上はブラウザのFileReaderと同じ `data:` URL で保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PhotoRepr", into = "PhotoRepr")]
pub struct Photo {
    pub name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

impl Photo {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data,
        }
    }

    /// `data:<media_type>;base64,<...>` 形式
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, BASE64.encode(&self.data))
    }

    pub fn from_data_url(name: impl Into<String>, url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::PhotoData("missing data: prefix".into()))?;
        let (media_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| Error::PhotoData("not a base64 data URL".into()))?;
        let data = BASE64
            .decode(payload.trim())
            .map_err(|e| Error::PhotoData(e.to_string()))?;
        Ok(Self::new(name, media_type, data))
    }
}

#[derive(Serialize, Deserialize)]
struct PhotoRepr {
    name: String,
    data: String,
}

impl TryFrom<PhotoRepr> for Photo {
    type Error = Error;

    fn try_from(repr: PhotoRepr) -> Result<Self> {
        Photo::from_data_url(repr.name, &repr.data)
    }
}

impl From<Photo> for PhotoRepr {
    fn from(photo: Photo) -> Self {
        PhotoRepr {
            data: photo.to_data_url(),
            name: photo.name,
        }
    }
}

/// 受付チェックリスト1件分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectionRecord {
    /// 受付日（dd/mm/yyyy）
    pub date: String,
    /// サービスオーダー番号（必須）
    pub service_order: String,
    /// 顧客名（必須）
    pub customer_name: String,
    pub repair_types: BTreeSet<RepairType>,
    /// 故障内容（見積もり選択時のみ有効）
    pub problem_text: String,
    pub answers: InspectionAnswers,
    pub photos: [Option<Photo>; PHOTO_SLOTS],
}

impl InspectionRecord {
    /// 本日の日付で初期化した空のレコード
    pub fn new() -> Self {
        Self {
            date: today(),
            ..Default::default()
        }
    }

    /// レコードJSONの読み込み（欠けた項目は既定値）
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// レコードJSON（整形済み）
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 入力内容を破棄して初期状態に戻す
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// 出力用のスナップショット（以後の編集は反映されない）
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn answer(&self, question: InspectionQuestion) -> Option<AnswerState> {
        self.answers.get(question)
    }

    pub fn set_answer(&mut self, question: InspectionQuestion, state: Option<AnswerState>) {
        self.answers.set(question, state);
    }

    /// 修理区分の選択/解除。見積もりを外すと故障内容も消去する。
    pub fn set_repair_type(&mut self, repair_type: RepairType, selected: bool) {
        if selected {
            self.repair_types.insert(repair_type);
        } else {
            self.repair_types.remove(&repair_type);
            if repair_type == RepairType::Estimate {
                self.problem_text.clear();
            }
        }
    }

    pub fn has_estimate(&self) -> bool {
        self.repair_types.contains(&RepairType::Estimate)
    }

    /// 帳票に載せる故障内容（見積もり選択かつ記入ありの場合のみ）
    pub fn problem_description(&self) -> Option<&str> {
        if self.has_estimate() && !self.problem_text.is_empty() {
            Some(self.problem_text.as_str())
        } else {
            None
        }
    }

    pub fn set_photo(&mut self, slot: usize, photo: Option<Photo>) -> Result<()> {
        let target = self.photos.get_mut(slot).ok_or(Error::PhotoSlot(slot))?;
        *target = photo;
        Ok(())
    }

    /// 写真が入っているスロットを (スロット番号, 写真) で列挙
    pub fn attached_photos(&self) -> impl Iterator<Item = (usize, &Photo)> {
        self.photos
            .iter()
            .enumerate()
            .filter_map(|(slot, photo)| photo.as_ref().map(|p| (slot, p)))
    }

    /// 必須項目チェック（OS番号 → 顧客名の順）
    pub fn validate(&self) -> Result<()> {
        if self.service_order.trim().is_empty() {
            return Err(Error::Validation(RequiredField::ServiceOrder));
        }
        if self.customer_name.trim().is_empty() {
            return Err(Error::Validation(RequiredField::CustomerName));
        }
        Ok(())
    }

    /// 出力ボタンを有効にできるか
    pub fn can_generate(&self) -> bool {
        self.validate().is_ok()
    }
}

/// 本日の日付（dd/mm/yyyy）
pub fn today() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_order_and_count() {
        assert_eq!(InspectionQuestion::ALL.len(), 18);
        for (i, q) in InspectionQuestion::ALL.iter().enumerate() {
            assert_eq!(q.index(), i);
        }
        assert_eq!(InspectionQuestion::ALL[0], InspectionQuestion::HasPhysicalButtons);
        assert_eq!(InspectionQuestion::ALL[17], InspectionQuestion::MoistureSigns);
    }

    #[test]
    fn test_answers_default_unanswered() {
        let record = InspectionRecord::default();
        assert_eq!(record.answers.answered_count(), 0);
        assert!(record.answers.iter().all(|(_, s)| s.is_none()));
    }

    #[test]
    fn test_set_answer_is_independent() {
        let mut record = InspectionRecord::default();
        record.set_answer(InspectionQuestion::ScreenCracked, Some(AnswerState::Yes));
        record.set_answer(InspectionQuestion::TouchWorks, Some(AnswerState::No));
        record.set_answer(InspectionQuestion::ScreenCracked, Some(AnswerState::NotTestable));

        assert_eq!(
            record.answer(InspectionQuestion::ScreenCracked),
            Some(AnswerState::NotTestable)
        );
        assert_eq!(record.answer(InspectionQuestion::TouchWorks), Some(AnswerState::No));
        assert_eq!(record.answers.answered_count(), 2);
    }

    #[test]
    fn test_markers() {
        assert_eq!(answer_marker(Some(AnswerState::Yes)), "✅ Sim");
        assert_eq!(answer_marker(Some(AnswerState::No)), "❌ Não");
        assert_eq!(answer_marker(Some(AnswerState::NotTestable)), "⚠️ Não possível testar");
        assert_eq!(answer_marker(None), "- Não respondido");
    }

    #[test]
    fn test_validate_required_fields() {
        let mut record = InspectionRecord::new();
        assert!(matches!(
            record.validate(),
            Err(Error::Validation(RequiredField::ServiceOrder))
        ));

        record.service_order = "OS123".to_string();
        record.customer_name = "   ".to_string();
        assert!(matches!(
            record.validate(),
            Err(Error::Validation(RequiredField::CustomerName))
        ));
        assert!(!record.can_generate());

        record.customer_name = "Maria".to_string();
        assert!(record.can_generate());
    }

    #[test]
    fn test_unselecting_estimate_clears_problem_text() {
        let mut record = InspectionRecord::default();
        record.set_repair_type(RepairType::Estimate, true);
        record.problem_text = "Não liga após queda".to_string();
        assert_eq!(record.problem_description(), Some("Não liga após queda"));

        record.set_repair_type(RepairType::Estimate, false);
        assert!(record.problem_text.is_empty());
        assert_eq!(record.problem_description(), None);
    }

    #[test]
    fn test_whitespace_only_problem_text_counts_as_present() {
        let mut record = InspectionRecord::default();
        record.set_repair_type(RepairType::Estimate, true);
        record.problem_text = "  ".to_string();
        assert_eq!(record.problem_description(), Some("  "));

        record.problem_text.clear();
        assert_eq!(record.problem_description(), None);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut live = InspectionRecord::new();
        live.service_order = "OS1".to_string();
        let snapshot = live.snapshot();

        live.service_order = "OS2".to_string();
        live.set_answer(InspectionQuestion::HasSound, Some(AnswerState::No));

        assert_eq!(snapshot.service_order, "OS1");
        assert_eq!(snapshot.answer(InspectionQuestion::HasSound), None);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut record = InspectionRecord::new();
        record.customer_name = "Maria".to_string();
        record.set_repair_type(RepairType::Software, true);
        record.set_answer(InspectionQuestion::DeviceCharges, Some(AnswerState::No));
        record
            .set_photo(0, Some(Photo::new("a.png", "image/png", vec![1, 2, 3])))
            .unwrap();

        record.reset();

        assert!(record.customer_name.is_empty());
        assert!(record.repair_types.is_empty());
        assert_eq!(record.answers.answered_count(), 0);
        assert_eq!(record.attached_photos().count(), 0);
        assert_eq!(record.date.len(), 10);
    }

    #[test]
    fn test_set_photo_out_of_range() {
        let mut record = InspectionRecord::default();
        let result = record.set_photo(3, None);
        assert!(matches!(result, Err(Error::PhotoSlot(3))));
    }

    #[test]
    fn test_photo_data_url() {
        let photo = Photo::new("foto.png", "image/png", vec![0x89, b'P', b'N', b'G']);
        let url = photo.to_data_url();
        assert_eq!(url, "data:image/png;base64,iVBORw==");

        let parsed = Photo::from_data_url("foto.png", &url).unwrap();
        assert_eq!(parsed, photo);

        assert!(Photo::from_data_url("x", "image/png;base64,AAAA").is_err());
        assert!(Photo::from_data_url("x", "data:image/png,AAAA").is_err());
    }

    #[test]
    fn test_record_deserialize() {
        let json = r#"{
            "date": "19/10/2026",
            "serviceOrder": "OS123",
            "customerName": "Maria",
            "repairTypes": ["orcamento", "tela"],
            "problemText": "Tela piscando",
            "answers": {"screenCracked": "yes", "deviceTurnsOn": "no", "hasSound": null},
            "photos": [null, {"name": "f.jpg", "data": "data:image/jpeg;base64,/9j/"}, null]
        }"#;

        let record: InspectionRecord = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(record.service_order, "OS123");
        assert!(record.has_estimate());
        assert_eq!(
            record.repair_types.iter().next(),
            Some(&RepairType::ScreenReplacement)
        );
        assert_eq!(record.answer(InspectionQuestion::ScreenCracked), Some(AnswerState::Yes));
        assert_eq!(record.answer(InspectionQuestion::DeviceTurnsOn), Some(AnswerState::No));
        assert_eq!(record.answer(InspectionQuestion::HasSound), None);

        let photos: Vec<_> = record.attached_photos().collect();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].0, 1);
        assert_eq!(photos[0].1.media_type, "image/jpeg");
        assert_eq!(photos[0].1.data, vec![0xff, 0xd8, 0xff]);
    }

    #[test]
    fn test_record_serialize_lists_all_questions() {
        let mut record = InspectionRecord::default();
        record.set_answer(InspectionQuestion::MoistureSigns, Some(AnswerState::Yes));

        let json = serde_json::to_string(&record).expect("シリアライズ失敗");
        assert!(json.contains("\"moistureSigns\":\"yes\""));
        assert!(json.contains("\"hasPhysicalButtons\":null"));
        assert!(json.contains("\"serviceOrder\":\"\""));
    }

    #[test]
    fn test_json_helpers() {
        let mut record = InspectionRecord::default();
        record.service_order = "OS7".to_string();
        let json = record.to_json().expect("シリアライズ失敗");
        assert_eq!(InspectionRecord::from_json(&json).unwrap(), record);

        let err = InspectionRecord::from_json("{ quebrado").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_partial_record_uses_defaults() {
        let record: InspectionRecord =
            serde_json::from_str(r#"{"serviceOrder": "OS9"}"#).expect("デシリアライズ失敗");
        assert_eq!(record.service_order, "OS9");
        assert_eq!(record.answers.answered_count(), 0);
        assert!(record.photos.iter().all(Option::is_none));
    }
}
