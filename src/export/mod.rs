pub mod pdf;
pub mod render;

use crate::cli::PdfQuality;
use crate::config::Config;
use crate::error::{ChecklistError, Result};
use chrono::NaiveDateTime;
use device_checklist_common::{
    compose, infer, paginate, Diagnosis, DocumentMeta, InspectionRecord, PageGeometry,
};
use pdf::{PageExporter, PdfExporter};
use render::{DocumentRenderer, RasterRenderer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 出力ファイル名: checklist-<店舗名>-<OS番号>.pdf
pub fn output_file_name(brand: &str, service_order: &str) -> String {
    format!(
        "checklist-{}-{}.pdf",
        sanitize_component(brand),
        sanitize_component(service_order)
    )
}

/// ファイル名に使えない文字を '_' に置換
fn sanitize_component(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// 生成結果（書き出し前）
#[derive(Debug, Clone)]
pub struct GeneratedChecklist {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub diagnoses: Vec<Diagnosis>,
}

/// 検証 → 診断 → 構築 → 描画 → ページ分割 → PDF出力
///
/// 描画と出力はブロッキングプールで順に待つ。どこかで失敗したらその回は終了し、
/// 途中結果は返さない。
pub struct ChecklistGenerator<R, E> {
    renderer: Arc<R>,
    exporter: Arc<E>,
    geometry: PageGeometry,
    brand: String,
}

impl ChecklistGenerator<RasterRenderer, PdfExporter> {
    pub fn from_config(config: &Config, quality: PdfQuality) -> Self {
        Self::new(
            RasterRenderer::from_config(config),
            PdfExporter::new(format!("{} - Checklist Técnico", config.brand), quality),
            PageGeometry::a4(config.margin_mm),
            config.brand.clone(),
        )
    }
}

impl<R, E> ChecklistGenerator<R, E>
where
    R: DocumentRenderer + Send + Sync + 'static,
    E: PageExporter + Send + Sync + 'static,
{
    pub fn new(renderer: R, exporter: E, geometry: PageGeometry, brand: impl Into<String>) -> Self {
        Self {
            renderer: Arc::new(renderer),
            exporter: Arc::new(exporter),
            geometry,
            brand: brand.into(),
        }
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// 現在時刻で生成
    pub async fn generate(&self, snapshot: InspectionRecord) -> Result<GeneratedChecklist> {
        let meta = DocumentMeta::now(self.brand.clone());
        self.generate_with(snapshot, meta).await
    }

    pub async fn generate_at(
        &self,
        snapshot: InspectionRecord,
        generated_at: NaiveDateTime,
    ) -> Result<GeneratedChecklist> {
        let meta = DocumentMeta::new(self.brand.clone(), generated_at);
        self.generate_with(snapshot, meta).await
    }

    async fn generate_with(
        &self,
        snapshot: InspectionRecord,
        meta: DocumentMeta,
    ) -> Result<GeneratedChecklist> {
        snapshot.validate()?;

        let diagnoses = infer(&snapshot);
        let document = compose(&snapshot, &diagnoses, &meta);
        tracing::info!(
            service_order = %snapshot.service_order,
            findings = diagnoses.iter().filter(|d| d.is_finding()).count(),
            photos = document.photo_count(),
            "checklist composed"
        );

        let renderer = Arc::clone(&self.renderer);
        let rendered = tokio::task::spawn_blocking(move || renderer.render(&document))
            .await
            .map_err(|e| ChecklistError::Render(e.to_string()))??;

        let geometry = self.geometry;
        let content_height = geometry.content_height_mm(rendered.width(), rendered.height());
        let offsets = paginate(content_height, &geometry);
        let page_count = offsets.len();
        tracing::debug!(content_height, page_count, "paginated");

        let exporter = Arc::clone(&self.exporter);
        let bytes =
            tokio::task::spawn_blocking(move || exporter.export(&rendered, &offsets, &geometry))
                .await
                .map_err(|e| ChecklistError::Export(e.to_string()))??;

        Ok(GeneratedChecklist {
            file_name: output_file_name(&self.brand, &snapshot.service_order),
            bytes,
            page_count,
            diagnoses,
        })
    }
}

/// 生成済みPDFを書き出す（一時ファイル経由で、失敗時に中途半端なファイルを残さない）
pub fn write_checklist(generated: &GeneratedChecklist, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(&generated.file_name);
    let temp_path = output_dir.join(format!(".{}.part", generated.file_name));

    if let Err(e) = std::fs::write(&temp_path, &generated.bytes) {
        std::fs::remove_file(&temp_path).ok();
        return Err(ChecklistError::Export(e.to_string()));
    }
    std::fs::rename(&temp_path, &output_path).map_err(|e| {
        std::fs::remove_file(&temp_path).ok();
        ChecklistError::Export(e.to_string())
    })?;

    Ok(output_path)
}
