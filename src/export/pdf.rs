use crate::cli::PdfQuality;
use crate::error::{ChecklistError, Result};
use crate::export::render::{RenderedDocument, TextRun};
use device_checklist_common::layout::{mm_to_pt, PageGeometry};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, RawImage, TextItem,
    XObjectTransform,
};

/// 画像を配置するときのDPI（1px = 1pt として扱う）
const PLACEMENT_DPI: f32 = 72.0;

/// ページ出力器
pub trait PageExporter {
    /// `offsets` は各ページ上端から画像上端までの距離（mm）
    fn export(
        &self,
        rendered: &RenderedDocument,
        offsets: &[f32],
        geometry: &PageGeometry,
    ) -> Result<Vec<u8>>;
}

/// printpdfによるPDF出力
#[derive(Debug, Clone)]
pub struct PdfExporter {
    title: String,
    quality: PdfQuality,
}

impl PdfExporter {
    pub fn new(title: impl Into<String>, quality: PdfQuality) -> Self {
        Self {
            title: title.into(),
            quality,
        }
    }
}

/// ラスタをJPEG化（品質設定の最大幅まで縮小）
fn encode_canvas(rendered: &RenderedDocument, quality: PdfQuality) -> Result<Vec<u8>> {
    let canvas = &rendered.canvas;
    let max_width = quality.max_width();

    let resized;
    let source = if canvas.width() > max_width {
        let height = (canvas.height() as f32 * max_width as f32 / canvas.width() as f32)
            .round()
            .max(1.0) as u32;
        resized = image::imageops::resize(canvas, max_width, height, FilterType::Triangle);
        &resized
    } else {
        canvas
    };

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.jpeg_quality())
        .encode_image(source)
        .map_err(|e| ChecklistError::Export(format!("falha ao converter para JPEG: {}", e)))?;
    Ok(buf)
}

fn text_ops(
    runs: &[TextRun],
    offset_mm: f32,
    mm_per_px: f32,
    geometry: &PageGeometry,
) -> Vec<Op> {
    let mut ops = Vec::new();
    for run in runs {
        let baseline_from_top = offset_mm + run.baseline_y as f32 * mm_per_px;
        // ページ外の行は書かない
        if baseline_from_top < 0.0 || baseline_from_top > geometry.page_height_mm {
            continue;
        }
        let x_mm = geometry.side_margin_mm + run.x as f32 * mm_per_px;
        let y_mm = geometry.page_height_mm - baseline_from_top;
        let font = if run.bold {
            BuiltinFont::HelveticaBold
        } else {
            BuiltinFont::Helvetica
        };

        ops.push(Op::StartTextSection);
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(mm_to_pt(run.size_px * mm_per_px)),
            font,
        });
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(mm_to_pt(x_mm)),
                y: Pt(mm_to_pt(y_mm)),
            },
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(run.text.clone())],
            font,
        });
        ops.push(Op::EndTextSection);
    }
    ops
}

impl PageExporter for PdfExporter {
    fn export(
        &self,
        rendered: &RenderedDocument,
        offsets: &[f32],
        geometry: &PageGeometry,
    ) -> Result<Vec<u8>> {
        if offsets.is_empty() {
            return Err(ChecklistError::Export("nenhuma página para exportar".into()));
        }

        let jpeg = encode_canvas(rendered, self.quality)?;
        let mut warnings = Vec::new();
        let image = RawImage::decode_from_bytes(&jpeg, &mut warnings)
            .map_err(|e| ChecklistError::Export(format!("falha ao incorporar imagem: {}", e)))?;
        let embedded_width_px = image.width as f32;

        let mut doc = PdfDocument::new(&self.title);
        let image_id = doc.add_image(&image);

        let content_width_mm = geometry.content_width_mm();
        let content_height_mm = geometry.content_height_mm(rendered.width(), rendered.height());
        let mm_per_px = geometry.mm_per_px(rendered.width());
        // 1px = 1pt で置いた画像を配置幅まで拡大縮小
        let scale = mm_to_pt(content_width_mm) / embedded_width_px.max(1.0);

        let pages: Vec<PdfPage> = offsets
            .iter()
            .map(|&offset_mm| {
                // PDF座標は左下原点。画像の下端位置を求める
                let bottom_mm = geometry.page_height_mm - offset_mm - content_height_mm;
                let mut ops = vec![Op::UseXobject {
                    id: image_id.clone(),
                    transform: XObjectTransform {
                        translate_x: Some(Pt(mm_to_pt(geometry.side_margin_mm))),
                        translate_y: Some(Pt(mm_to_pt(bottom_mm))),
                        scale_x: Some(scale),
                        scale_y: Some(scale),
                        dpi: Some(PLACEMENT_DPI),
                        ..Default::default()
                    },
                }];
                ops.extend(text_ops(&rendered.text, offset_mm, mm_per_px, geometry));
                PdfPage::new(
                    Mm(geometry.page_width_mm),
                    Mm(geometry.page_height_mm),
                    ops,
                )
            })
            .collect();

        let page_count = pages.len();
        let bytes = doc
            .with_pages(pages)
            .save(&PdfSaveOptions::default(), &mut warnings);

        tracing::debug!(
            pages = page_count,
            bytes = bytes.len(),
            warnings = warnings.len(),
            "pdf exported"
        );
        Ok(bytes)
    }
}
