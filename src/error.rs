use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChecklistError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error(transparent)]
    Record(#[from] device_checklist_common::Error),

    #[error("Arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("Por favor, selecione apenas arquivos de imagem: {0}")]
    InvalidImage(String),

    #[error("A imagem deve ter no máximo 5MB: {name} ({size} bytes)")]
    ImageTooLarge { name: String, size: u64 },

    #[error("Erro ao renderizar o checklist: {0}")]
    Render(String),

    #[error("Erro ao gerar PDF: {0}")]
    Export(String),

    #[error("Erro de entrada interativa: {0}")]
    Prompt(String),

    #[error("Erro ao ler JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),
}

impl ChecklistError {
    /// 必須項目不足（出力自体を行わない）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ChecklistError::Record(device_checklist_common::Error::Validation(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, ChecklistError>;
