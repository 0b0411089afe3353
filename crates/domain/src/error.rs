//! # ドメインエラー
//!
//! core 側でレスポンスエンベロープの 400 / 404 に振り分けられる。

use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// 不変条件を満たさない入力
    #[error("入力が不正です: {0}")]
    Validation(String),

    #[error("{entity_type} {id} は存在しません")]
    NotFound {
        /// 型名（"StoredObject" など）
        entity_type: &'static str,
        id:          String,
    },
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_not_foundは型名と識別子をメッセージに含める() {
        let error = DomainError::not_found("StoredObject", 42);

        assert_eq!(error.to_string(), "StoredObject 42 は存在しません");
    }
}
