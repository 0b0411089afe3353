//! # Storify Core エラー定義
//!
//! リクエスト処理中に発生する障害と、その HTTP レスポンスへの変換を定義する。
//!
//! ## 変換規則
//!
//! | 障害 | ステータス |
//! |------|-----------|
//! | [`AppError::Unauthorized`] / [`AppError::MissingToken`] | 401 |
//! | それ以外（パニックを含む） | 500 |
//!
//! レスポンスは `application/problem+json` の失敗エンベロープで、
//! メッセージは常に汎用文言とする。障害の詳細はログにのみ出力する。
//!
//! バリデーション失敗は障害ではないため、ここを経由せず
//! エンベロープとして直接返される（[`crate::validation`] を参照）。

use std::any::Any;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use storify_shared::ApiResponse;
use thiserror::Error;

/// 障害レスポンスの Content-Type
pub const PROBLEM_JSON: &str = "application/problem+json";

/// 401 レスポンスの汎用メッセージ
pub const UNAUTHORIZED_MESSAGE: &str = "認証が必要です";

/// 500 レスポンスの汎用メッセージ
pub const INTERNAL_ERROR_MESSAGE: &str = "サーバー内部でエラーが発生しました";

/// リクエスト処理中に発生する障害
#[derive(Debug, Error)]
pub enum AppError {
    /// Authorization ヘッダに Bearer トークンがない
    #[error("アクセストークンがありません")]
    MissingToken,

    /// 呼び出された機能が未実装
    #[error("未実装の機能です: {0}")]
    NotImplemented(&'static str),

    /// アクセスが拒否された
    #[error("アクセスが拒否されました: {0}")]
    Unauthorized(String),

    /// 予期しない内部エラー
    #[error("内部エラー: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// 障害に対応する HTTP ステータス
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingToken | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotImplemented(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::MissingToken => {
                tracing::warn!(
                    error.category = "auth",
                    error.kind = "missing_token",
                    "アクセストークンがありません"
                );
            }
            AppError::Unauthorized(detail) => {
                tracing::warn!(
                    error.category = "auth",
                    error.kind = "unauthorized",
                    "アクセスが拒否されました: {}",
                    detail
                );
            }
            AppError::NotImplemented(feature) => {
                tracing::error!(
                    error.category = "internal",
                    error.kind = "not_implemented",
                    "未実装の機能が呼び出されました: {}",
                    feature
                );
            }
            AppError::Internal(err) => {
                // セキュリティ: 内部エラー詳細はログのみ
                tracing::error!(
                    error.category = "internal",
                    error.kind = "unhandled",
                    "内部エラー: {:?}",
                    err
                );
            }
        }

        problem_response(self.status())
    }
}

/// 障害ステータスから problem+json の失敗エンベロープを組み立てる
///
/// [`AppError`] とパニックの両方がここを通るため、
/// 障害レスポンスの形はこの関数だけが決める。
pub fn problem_response(status: StatusCode) -> Response {
    let message = if status == StatusCode::UNAUTHORIZED {
        UNAUTHORIZED_MESSAGE
    } else {
        INTERNAL_ERROR_MESSAGE
    };

    let mut response = (
        status,
        Json(ApiResponse::<()>::failure(status.as_u16(), message)),
    )
        .into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
    response
}

/// ハンドラのパニックを 500 の障害レスポンスに変換する
///
/// `CatchPanicLayer::custom` に渡して使う。
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("不明なパニック");

    tracing::error!(
        error.category = "internal",
        error.kind = "panic",
        "リクエスト処理中にパニックが発生しました: {}",
        detail
    );

    problem_response(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::Value;

    use super::*;

    async fn into_parts(response: Response) -> (StatusCode, String, Value) {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, serde_json::from_slice(&body).unwrap())
    }

    #[rstest]
    #[case(AppError::MissingToken, StatusCode::UNAUTHORIZED)]
    #[case(AppError::Unauthorized("ロール不足".to_string()), StatusCode::UNAUTHORIZED)]
    #[case(AppError::NotImplemented("クレーム解析"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(
        AppError::Internal(anyhow::anyhow!("接続が切れました")),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[tokio::test]
    async fn test_障害は対応するステータスのproblem_jsonに変換される(
        #[case] error: AppError,
        #[case] expected: StatusCode,
    ) {
        // When
        let (status, content_type, json) = into_parts(error.into_response()).await;

        // Then
        assert_eq!(status, expected);
        assert_eq!(content_type, PROBLEM_JSON);
        assert_eq!(json["status_code"], expected.as_u16());
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_内部エラーの詳細はレスポンスに含まれない() {
        // Given
        let error = AppError::Internal(anyhow::anyhow!("password=secret の接続に失敗"));

        // When
        let (_, _, json) = into_parts(error.into_response()).await;

        // Then
        assert_eq!(json["message"], INTERNAL_ERROR_MESSAGE);
        assert!(!json.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_拒否理由はレスポンスに含まれない() {
        let error = AppError::Unauthorized("管理者ロールがありません".to_string());

        let (_, _, json) = into_parts(error.into_response()).await;

        assert_eq!(json["message"], UNAUTHORIZED_MESSAGE);
        assert!(!json.to_string().contains("管理者ロール"));
    }

    #[rstest]
    #[case(Box::new("静的な文字列") as Box<dyn Any + Send>)]
    #[case(Box::new("所有された文字列".to_string()) as Box<dyn Any + Send>)]
    #[case(Box::new(42_u8) as Box<dyn Any + Send>)]
    #[tokio::test]
    async fn test_パニックは500のproblem_jsonに変換される(#[case] panic: Box<dyn Any + Send>) {
        let (status, content_type, json) = into_parts(panic_response(panic)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type, PROBLEM_JSON);
        assert_eq!(json["message"], INTERNAL_ERROR_MESSAGE);
    }
}
