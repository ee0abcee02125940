use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "checklist")]
#[command(about = "Checklist técnico de recebimento de aparelhos com análise de defeitos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 空の受付レコードを作成（入力内容のリセット）
    New {
        /// 出力JSONファイル
        #[arg(default_value = "checklist.json")]
        output: PathBuf,

        /// 既存ファイルを上書き
        #[arg(long)]
        force: bool,
    },

    /// 対話的に受付情報・検査結果を入力
    Inspect {
        /// 受付レコードJSON（無ければ新規作成）
        #[arg(required = true)]
        record: PathBuf,
    },

    /// 写真を添付/削除
    Photo {
        /// 受付レコードJSON
        #[arg(required = true)]
        record: PathBuf,

        /// スロット番号 (1-3)
        #[arg(required = true)]
        slot: usize,

        /// 画像ファイル（省略時はスロットを空にする）
        path: Option<PathBuf>,
    },

    /// 故障診断のみ表示
    Diagnose {
        /// 受付レコードJSON
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 帳票をプレーンテキストで出力（クリップボード用）
    Text {
        /// 受付レコードJSON
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// PDFを生成
    Generate {
        /// 受付レコードJSON
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// PDF画像品質 (high/medium/low)
        #[arg(long)]
        pdf_quality: Option<PdfQuality>,

        /// 店舗名（設定値を上書き）
        #[arg(long)]
        brand: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 店舗名を設定
        #[arg(long)]
        set_brand: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// PDF画像品質設定
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfQuality {
    /// 高品質: 1600px, 90%
    High,
    /// 中品質: 1200px, 80%（デフォルト）
    #[default]
    Medium,
    /// 低品質: 500px, 60%
    Low,
}

impl PdfQuality {
    /// 最大ピクセル幅
    pub fn max_width(&self) -> u32 {
        match self {
            PdfQuality::High => 1600,
            PdfQuality::Medium => 1200,
            PdfQuality::Low => 500,
        }
    }

    /// JPEG品質 (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            PdfQuality::High => 90,
            PdfQuality::Medium => 80,
            PdfQuality::Low => 60,
        }
    }
}

impl std::str::FromStr for PdfQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" | "h" => Ok(PdfQuality::High),
            "medium" | "med" | "m" => Ok(PdfQuality::Medium),
            "low" | "l" => Ok(PdfQuality::Low),
            _ => Err(format!("Unknown quality: {}. Use high, medium, or low", s)),
        }
    }
}

impl std::fmt::Display for PdfQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PdfQuality::High => write!(f, "high"),
            PdfQuality::Medium => write!(f, "medium"),
            PdfQuality::Low => write!(f, "low"),
        }
    }
}
