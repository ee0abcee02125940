//! ページ分割
//!
//! 縦長の1枚画像を各ページに同じ倍率で描き直し、ページごとに
//! 1ページ分ずつ上へずらして次の範囲を見せる（スライディングウィンドウ方式）。
//! 各オフセットは「ページ上端から画像上端までの距離（mm）」で、
//! 1ページ目は上余白、以降は見える縦幅ずつ減っていく。

use crate::layout::PageGeometry;

/// ページ数計算で許容する端数（ページ比）。浮動小数の丸めで空ページを作らない
const PAGE_EPSILON: f32 = 1e-4;

/// ページオフセットを順に返すイテレータ
#[derive(Debug, Clone)]
pub struct PageOffsets {
    top_margin: f32,
    step: f32,
    index: usize,
    count: usize,
}

impl PageOffsets {
    pub fn new(content_height: f32, top_margin: f32, usable_height: f32) -> Self {
        Self {
            top_margin,
            step: usable_height,
            index: 0,
            count: page_count(content_height, usable_height),
        }
    }

    /// 総ページ数
    pub fn page_count(&self) -> usize {
        self.count
    }
}

/// ceil(H / 見える縦幅)、最低1ページ
fn page_count(content_height: f32, usable_height: f32) -> usize {
    // 見える縦幅が0以下では進まないため1ページで打ち切る
    if content_height <= 0.0 || usable_height <= 0.0 {
        return 1;
    }
    let pages = (content_height / usable_height - PAGE_EPSILON).ceil();
    (pages as usize).max(1)
}

impl Iterator for PageOffsets {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.index >= self.count {
            return None;
        }
        let offset = self.top_margin - self.index as f32 * self.step;
        self.index += 1;
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for PageOffsets {}

/// 内容高さ `content_height` (mm) を覆うページオフセット列
pub fn paginate(content_height: f32, geometry: &PageGeometry) -> Vec<f32> {
    page_offsets(content_height, geometry).collect()
}

pub fn page_offsets(content_height: f32, geometry: &PageGeometry) -> PageOffsets {
    PageOffsets::new(
        content_height,
        geometry.top_margin_mm,
        geometry.usable_height_mm(),
    )
}
