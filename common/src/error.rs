//! エラー型定義

use thiserror::Error;

/// 出力前に必須入力されるべき受付項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    ServiceOrder,
    CustomerName,
}

impl RequiredField {
    /// 画面・帳票上の項目名
    pub fn label(&self) -> &'static str {
        match self {
            RequiredField::ServiceOrder => "Número da OS",
            RequiredField::CustomerName => "Cliente",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Campo obrigatório não preenchido: {0}")]
    Validation(RequiredField),

    #[error("Invalid photo data: {0}")]
    PhotoData(String),

    #[error("Photo slot out of range: {0}")]
    PhotoSlot(usize),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let error = Error::Validation(RequiredField::ServiceOrder);
        assert_eq!(
            format!("{}", error),
            "Campo obrigatório não preenchido: Número da OS"
        );
    }

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_required_field_labels() {
        assert_eq!(RequiredField::CustomerName.to_string(), "Cliente");
        assert_ne!(
            RequiredField::ServiceOrder.label(),
            RequiredField::CustomerName.label()
        );
    }
}
