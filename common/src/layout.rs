//! レイアウト設定モジュール
//!
//! mm基準のページ定義（Source of Truth）

// ============================================
// mm基準レイアウト
// ============================================

/// A4サイズ（mm）
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// 余白設定（mm、四辺共通）
pub const MARGIN_MM: f32 = 10.0;

/// 描画幅（px）と描画倍率
pub const RENDER_WIDTH_PX: u32 = 800;
pub const RENDER_SCALE: u32 = 2;

// ============================================
// 変換係数
// ============================================

/// mm → pt変換 (1mm = 72/25.4 pt ≈ 2.835pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// mm → pt 変換
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// pt → mm 変換
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}

// ============================================
// ページ定義
// ============================================

/// 出力ページの寸法（mm）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// 左右余白
    pub side_margin_mm: f32,
    pub top_margin_mm: f32,
    pub bottom_margin_mm: f32,
}

impl PageGeometry {
    /// A4縦、四辺同一余白
    pub fn a4(margin_mm: f32) -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            side_margin_mm: margin_mm,
            top_margin_mm: margin_mm,
            bottom_margin_mm: margin_mm,
        }
    }

    /// 画像を配置する幅（mm）
    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm - self.side_margin_mm * 2.0
    }

    /// 1ページで見える縦幅（mm）
    pub fn usable_height_mm(&self) -> f32 {
        self.page_height_mm - self.top_margin_mm - self.bottom_margin_mm
    }

    /// ラスタ画像を配置幅に合わせたときの高さ（mm）
    pub fn content_height_mm(&self, raster_width_px: u32, raster_height_px: u32) -> f32 {
        if raster_width_px == 0 {
            return 0.0;
        }
        raster_height_px as f32 * self.content_width_mm() / raster_width_px as f32
    }

    /// 1pxあたりのmm
    pub fn mm_per_px(&self, raster_width_px: u32) -> f32 {
        if raster_width_px == 0 {
            return 0.0;
        }
        self.content_width_mm() / raster_width_px as f32
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4(MARGIN_MM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let geometry = PageGeometry::default();
        assert!((geometry.content_width_mm() - 190.0).abs() < 0.01);
        assert!((geometry.usable_height_mm() - 277.0).abs() < 0.01);
    }

    #[test]
    fn test_conversion() {
        assert!((MM_TO_PT - 2.835).abs() < 0.01);
        assert!((mm_to_pt(10.0) - 28.35).abs() < 0.1);
        assert!((pt_to_mm(mm_to_pt(42.0)) - 42.0).abs() < 0.001);
    }

    #[test]
    fn test_content_height_keeps_aspect_ratio() {
        let geometry = PageGeometry::default();
        // 1600px幅 → 190mm
        let h = geometry.content_height_mm(1600, 3200);
        assert!((h - 380.0).abs() < 0.01);
        assert!((geometry.mm_per_px(1600) - 190.0 / 1600.0).abs() < 1e-6);
        assert_eq!(geometry.content_height_mm(0, 100), 0.0);
    }

    #[test]
    fn test_asymmetric_margins() {
        let geometry = PageGeometry {
            top_margin_mm: 15.0,
            bottom_margin_mm: 5.0,
            ..PageGeometry::a4(10.0)
        };
        assert!((geometry.usable_height_mm() - 277.0).abs() < 0.01);
        assert!((geometry.content_width_mm() - 190.0).abs() < 0.01);
    }
}
