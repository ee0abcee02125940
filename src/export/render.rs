//! ドキュメント → ラスタ画像
//!
//! 固定幅で縦に積み上げて描画する。背景・罫線・回答バッジ・写真サムネイルは
//! ピクセルに描き込み、文字列はラスタ座標付きのテキストランとして返す
//! （PDF側で同じオフセットに重ねて書く）。

use crate::config::Config;
use crate::error::{ChecklistError, Result};
use device_checklist_common::document::{
    ChecklistLine, Field, GalleryPhoto, Section, SectionBody, BULLET, NO_PHOTOS_PLACEHOLDER,
};
use device_checklist_common::{AnswerState, Document};
use image::imageops::FilterType;
use image::{Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const RULE_GRAY: Rgb<u8> = Rgb([221, 221, 221]);
const ROW_SHADE: Rgb<u8> = Rgb([248, 249, 250]);
const BRAND_BLUE: Rgb<u8> = Rgb([0, 123, 255]);
const PROBLEM_BG: Rgb<u8> = Rgb([255, 243, 243]);
const BADGE_YES: Rgb<u8> = Rgb([40, 167, 69]);
const BADGE_NO: Rgb<u8> = Rgb([220, 53, 69]);
const BADGE_NA: Rgb<u8> = Rgb([255, 193, 7]);
const BADGE_NONE: Rgb<u8> = Rgb([173, 181, 189]);

// 以下はscale=1のpx値
const PADDING: u32 = 20;
const H1_SIZE: f32 = 24.0;
const H1_LINE: u32 = 40;
const H2_SIZE: f32 = 18.0;
const H2_LINE: u32 = 32;
const H2_GAP: u32 = 18;
const TEXT_SIZE: f32 = 14.0;
const TEXT_LINE: u32 = 22;
const ROW_LINE: u32 = 26;
const FOOTER_SIZE: f32 = 12.0;
const FOOTER_GAP: u32 = 30;
const BADGE: u32 = 10;
const MARKER_COLUMN: u32 = 200;
const PHOTO_MAX: u32 = 200;
const PHOTO_GAP: u32 = 10;

/// 描画幅の下限（px、scale=1）。回答欄と設問文が並ぶ幅
pub const MIN_RENDER_WIDTH_PX: u32 = 400;

/// Helveticaの平均字幅（フォントサイズ比）
const AVG_CHAR_WIDTH: f32 = 0.52;

/// ラスタ座標（px）上の文字列
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: u32,
    /// ベースラインのY座標
    pub baseline_y: u32,
    pub size_px: f32,
    pub bold: bool,
    pub text: String,
}

/// 描画結果
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub canvas: RgbImage,
    pub text: Vec<TextRun>,
}

impl RenderedDocument {
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }
}

/// ドキュメント描画器
pub trait DocumentRenderer {
    fn render(&self, document: &Document) -> Result<RenderedDocument>;
}

enum Paint {
    Rect { x: u32, y: u32, w: u32, h: u32, color: Rgb<u8> },
    Image { x: u32, y: u32, image: RgbImage },
}

/// 描画位置を進めながらペイント命令とテキストを溜める
struct Layout {
    scale: u32,
    width: u32,
    cursor: u32,
    paints: Vec<Paint>,
    text: Vec<TextRun>,
}

impl Layout {
    fn new(width_px: u32, scale: u32) -> Self {
        Self {
            scale,
            width: width_px * scale,
            cursor: PADDING * scale,
            paints: Vec::new(),
            text: Vec::new(),
        }
    }

    fn px(&self, v: u32) -> u32 {
        v * self.scale
    }

    fn left(&self) -> u32 {
        self.px(PADDING)
    }

    fn content_width(&self) -> u32 {
        self.width - self.px(PADDING) * 2
    }

    fn text_width(&self, text: &str, size: f32) -> u32 {
        (text.chars().count() as f32 * size * self.scale as f32 * AVG_CHAR_WIDTH) as u32
    }

    fn push_text(&mut self, x: u32, line_top: u32, line_height: u32, size: f32, bold: bool, text: &str) {
        let size_px = size * self.scale as f32;
        // 行ボックス内で縦中央寄せ
        let baseline_y = line_top + (line_height + size_px as u32) / 2 - (size_px * 0.1) as u32;
        self.text.push(TextRun {
            x,
            baseline_y,
            size_px,
            bold,
            text: text.to_string(),
        });
    }

    fn rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        self.paints.push(Paint::Rect { x, y, w, h, color });
    }

    /// 1行分のテキストを置いて改行
    fn line(&mut self, size: f32, line: u32, bold: bool, text: &str) {
        let h = self.px(line);
        let (x, y) = (self.left(), self.cursor);
        self.push_text(x, y, h, size, bold, text);
        self.cursor += h;
    }

    /// 幅に収まるよう単語単位で折り返す
    fn wrap(&self, text: &str, size: f32, indent: u32) -> Vec<String> {
        let char_px = (size * self.scale as f32 * AVG_CHAR_WIDTH).max(1.0);
        let max_chars = (((self.content_width() - indent) as f32 / char_px) as usize).max(1);

        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let needed = current.chars().count() + word.chars().count() + 1;
                if !current.is_empty() && needed > max_chars {
                    lines.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
            lines.push(current);
        }
        lines
    }

    fn section(&mut self, section: &Section) -> Result<()> {
        if let Some(title) = &section.title {
            self.title(title);
        }

        match &section.body {
            SectionBody::Header { title } => self.header(title),
            SectionBody::KeyValue(fields) => self.fields(fields),
            SectionBody::ConditionalBlock { label, text } => self.block(label, text),
            SectionBody::Checklist(lines) => self.checklist(lines),
            SectionBody::Gallery(photos) => self.gallery(photos)?,
            SectionBody::List { items, bulleted } => self.list(items, *bulleted),
            SectionBody::Footer(text) => self.footer(text),
        }
        Ok(())
    }

    fn header(&mut self, title: &str) {
        self.line(H1_SIZE, H1_LINE, true, title);
        let (x, y, w, h) = (self.left(), self.cursor, self.content_width(), self.px(3));
        self.rect(x, y, w, h, BRAND_BLUE);
        self.cursor += h;
    }

    fn title(&mut self, title: &str) {
        self.cursor += self.px(H2_GAP);
        self.line(H2_SIZE, H2_LINE, true, title);
        let (x, y, w, h) = (self.left(), self.cursor, self.content_width(), self.px(2));
        self.rect(x, y, w, h, RULE_GRAY);
        self.cursor += h + self.px(6);
    }

    fn fields(&mut self, fields: &[Field]) {
        for field in fields {
            let label = format!("{}: ", field.label);
            let h = self.px(TEXT_LINE);
            let (x, y) = (self.left(), self.cursor);
            let value_x = x + self.text_width(&label, TEXT_SIZE);
            self.push_text(x, y, h, TEXT_SIZE, true, &label);
            self.push_text(value_x, y, h, TEXT_SIZE, false, &field.value);
            self.cursor += h;
        }
    }

    fn block(&mut self, label: &str, text: &str) {
        self.line(TEXT_SIZE, TEXT_LINE, true, label);
        for line in self.wrap(text, TEXT_SIZE, 0) {
            self.line(TEXT_SIZE, TEXT_LINE, false, &line);
        }
    }

    fn checklist(&mut self, lines: &[ChecklistLine]) {
        let h = self.px(ROW_LINE);
        let marker_x = self
            .width
            .saturating_sub(self.left() + self.px(MARKER_COLUMN))
            .max(self.left());
        let badge = self.px(BADGE);

        for (i, line) in lines.iter().enumerate() {
            let (x, y) = (self.left(), self.cursor);
            if i % 2 == 0 {
                let w = self.content_width();
                self.rect(x, y, w, h, ROW_SHADE);
            }
            let color = match line.state {
                Some(AnswerState::Yes) => BADGE_YES,
                Some(AnswerState::No) => BADGE_NO,
                Some(AnswerState::NotTestable) => BADGE_NA,
                None => BADGE_NONE,
            };
            self.rect(marker_x, y + (h - badge) / 2, badge, badge, color);

            self.push_text(x + self.px(6), y, h, TEXT_SIZE, false, line.label);
            self.push_text(
                marker_x + badge + self.px(6),
                y,
                h,
                TEXT_SIZE,
                true,
                marker_text(line.marker()),
            );
            self.cursor += h;
        }
    }

    fn gallery(&mut self, photos: &[GalleryPhoto]) -> Result<()> {
        if photos.is_empty() {
            self.line(TEXT_SIZE, TEXT_LINE, false, NO_PHOTOS_PLACEHOLDER);
            return Ok(());
        }

        let max = self.px(PHOTO_MAX);
        let gap = self.px(PHOTO_GAP);
        let mut x = self.left();
        let mut row_height = 0;

        for entry in photos {
            let thumb = decode_thumbnail(entry, max)?;
            if x + thumb.width() > self.left() + self.content_width() {
                self.cursor += row_height + gap;
                x = self.left();
                row_height = 0;
            }
            row_height = row_height.max(thumb.height());
            let y = self.cursor;
            let w = thumb.width();
            self.paints.push(Paint::Image { x, y, image: thumb });
            x += w + gap;
        }

        self.cursor += row_height + gap;
        Ok(())
    }

    fn list(&mut self, items: &[String], bulleted: bool) {
        let pad = self.px(10);
        let top = self.cursor;
        let mut runs = Vec::new();
        for item in items {
            let text = if bulleted {
                format!("{}{}", BULLET, item)
            } else {
                item.clone()
            };
            runs.extend(self.wrap(&text, TEXT_SIZE, pad * 2));
        }

        let h = self.px(TEXT_LINE) * runs.len() as u32 + pad * 2;
        let (x, w) = (self.left(), self.content_width());
        self.rect(x, top, w, h, PROBLEM_BG);
        self.rect(x, top, self.px(4), h, BADGE_NO);

        let mut y = top + pad;
        for run in &runs {
            let line_h = self.px(TEXT_LINE);
            self.push_text(x + pad + self.px(4), y, line_h, TEXT_SIZE, false, run);
            y += line_h;
        }
        self.cursor = top + h;
    }

    fn footer(&mut self, text: &str) {
        self.cursor += self.px(FOOTER_GAP);
        let h = self.px(TEXT_LINE);
        let w = self.text_width(text, FOOTER_SIZE);
        let x = self.left() + self.content_width().saturating_sub(w) / 2;
        let y = self.cursor;
        self.push_text(x, y, h, FOOTER_SIZE, false, text);
        self.cursor += h;
    }

    fn finish(self) -> RenderedDocument {
        let height = self.cursor + self.px(PADDING);
        let mut canvas = RgbImage::from_pixel(self.width, height, WHITE);

        for paint in &self.paints {
            match paint {
                Paint::Rect { x, y, w, h, color } => fill_rect(&mut canvas, *x, *y, *w, *h, *color),
                Paint::Image { x, y, image } => {
                    image::imageops::replace(&mut canvas, image, *x as i64, *y as i64)
                }
            }
        }

        RenderedDocument {
            canvas,
            text: self.text,
        }
    }
}

/// 絵文字部分はバッジで表すため、文字列は記号を落とす
fn marker_text(marker: &str) -> &str {
    marker.trim_start_matches(|c: char| !c.is_alphanumeric() && c != '-')
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x_end = (x + w).min(canvas.width());
    let y_end = (y + h).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

/// 写真をデコードし、max×max 以内に縮小（拡大はしない）
fn decode_thumbnail(entry: &GalleryPhoto, max: u32) -> Result<RgbImage> {
    let decoded = image::load_from_memory(&entry.photo.data).map_err(|e| {
        ChecklistError::Render(format!("Foto {} ({}): {}", entry.slot + 1, entry.photo.name, e))
    })?;

    let fitted = if decoded.width() > max || decoded.height() > max {
        decoded.resize(max, max, FilterType::Triangle)
    } else {
        decoded
    };
    Ok(fitted.to_rgb8())
}

/// 標準のラスタ描画器
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    width_px: u32,
    scale: u32,
}

impl RasterRenderer {
    pub fn new(width_px: u32, scale: u32) -> Self {
        Self {
            width_px: width_px.max(MIN_RENDER_WIDTH_PX),
            scale: scale.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.render_width_px, config.render_scale)
    }
}

impl DocumentRenderer for RasterRenderer {
    fn render(&self, document: &Document) -> Result<RenderedDocument> {
        let mut layout = Layout::new(self.width_px, self.scale);
        for section in &document.sections {
            layout.section(section)?;
        }

        let rendered = layout.finish();
        tracing::debug!(
            width = rendered.width(),
            height = rendered.height(),
            runs = rendered.text.len(),
            "document rendered"
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use device_checklist_common::{compose, infer, DocumentMeta, InspectionRecord, Photo};
    use std::io::Cursor;

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb([10, 200, 10]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn document(record: &InspectionRecord) -> Document {
        let at = NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();
        compose(record, &infer(record), &DocumentMeta::new("JCELL", at))
    }

    fn record() -> InspectionRecord {
        InspectionRecord {
            service_order: "OS1".into(),
            customer_name: "Ana".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_fixed_width() {
        let rendered = RasterRenderer::new(800, 2).render(&document(&record())).unwrap();
        assert_eq!(rendered.width(), 1600);
        assert!(rendered.height() > 0);
        assert!(rendered.text.iter().any(|r| r.text == "JCELL - Checklist Técnico"));
        assert!(rendered.text.iter().any(|r| r.text == NO_PHOTOS_PLACEHOLDER));
    }

    #[test]
    fn test_text_runs_inside_canvas() {
        let rendered = RasterRenderer::new(800, 1).render(&document(&record())).unwrap();
        for run in &rendered.text {
            assert!(run.baseline_y < rendered.height(), "{:?}", run);
            assert!(run.x < rendered.width());
        }
    }

    #[test]
    fn test_photos_make_document_taller() {
        let plain = RasterRenderer::new(800, 1).render(&document(&record())).unwrap();

        let mut with_photo = record();
        with_photo
            .set_photo(0, Some(Photo::new("a.png", "image/png", png(640, 480))))
            .unwrap();
        let rendered = RasterRenderer::new(800, 1).render(&document(&with_photo)).unwrap();

        assert!(rendered.height() > plain.height());
    }

    #[test]
    fn test_corrupt_photo_is_render_failure() {
        let mut broken = record();
        broken
            .set_photo(1, Some(Photo::new("x.jpg", "image/jpeg", vec![0xff, 0xd8, 0x00])))
            .unwrap();

        let result = RasterRenderer::new(800, 1).render(&document(&broken));
        assert!(matches!(result, Err(ChecklistError::Render(_))));
    }

    #[test]
    fn test_long_text_wraps() {
        let layout = Layout::new(400, 1);
        let text = "palavra ".repeat(100);
        let lines = layout.wrap(&text, TEXT_SIZE, 0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| !l.is_empty()));
    }

    #[test]
    fn test_narrow_width_is_clamped() {
        let renderer = RasterRenderer::new(200, 1);
        let rendered = renderer.render(&document(&record())).unwrap();
        assert_eq!(rendered.width(), MIN_RENDER_WIDTH_PX);
        for run in &rendered.text {
            assert!(run.x < rendered.width(), "{:?}", run);
        }
    }

    #[test]
    fn test_checklist_marker_column_never_left_of_padding() {
        // 下限未満の幅でレイアウトを直接組んでも桁あふれしない
        let mut layout = Layout::new(100, 1);
        let line = ChecklistLine {
            label: "Touch funciona?",
            state: Some(AnswerState::No),
        };
        layout.checklist(&[line]);
        assert!(layout.text.iter().all(|r| r.x >= layout.left()));
    }

    #[test]
    fn test_marker_text_strips_symbols() {
        assert_eq!(marker_text("✅ Sim"), "Sim");
        assert_eq!(marker_text("⚠️ Não possível testar"), "Não possível testar");
        assert_eq!(marker_text("- Não respondido"), "- Não respondido");
    }
}
