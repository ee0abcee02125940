use crate::cli::PdfQuality;
use crate::error::{ChecklistError, Result};
use crate::export::render::MIN_RENDER_WIDTH_PX;
use device_checklist_common::document::DEFAULT_BRAND;
use device_checklist_common::layout::{MARGIN_MM, RENDER_SCALE, RENDER_WIDTH_PX};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 帳票タイトル・ファイル名に使う店舗名
    pub brand: String,
    pub render_width_px: u32,
    pub render_scale: u32,
    pub margin_mm: f32,
    pub pdf_quality: PdfQuality,
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brand: DEFAULT_BRAND.into(),
            render_width_px: RENDER_WIDTH_PX,
            render_scale: RENDER_SCALE,
            margin_mm: MARGIN_MM,
            pdf_quality: PdfQuality::default(),
            output_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ChecklistError::Config("diretório home não encontrado".into()))?;
        Ok(home.join(".config").join("device-checklist").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.brand.trim().is_empty() {
            return Err(ChecklistError::Config("brand vazio".into()));
        }
        if self.render_width_px < MIN_RENDER_WIDTH_PX {
            return Err(ChecklistError::Config(format!(
                "render_width_px deve ser pelo menos {}: {}",
                MIN_RENDER_WIDTH_PX, self.render_width_px
            )));
        }
        if self.render_scale == 0 {
            return Err(ChecklistError::Config(
                "render_scale deve ser maior que zero".into(),
            ));
        }
        if !(0.0..50.0).contains(&self.margin_mm) {
            return Err(ChecklistError::Config(format!(
                "margin_mm fora do intervalo: {}",
                self.margin_mm
            )));
        }
        Ok(())
    }

    pub fn set_brand(&mut self, brand: String) -> Result<()> {
        self.brand = brand;
        self.validate()?;
        self.save()
    }
}
