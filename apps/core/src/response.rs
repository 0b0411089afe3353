//! # エンベロープの HTTP レスポンス変換
//!
//! `storify_shared` は axum に依存しないため、[`ApiResponse`] を axum の
//! レスポンスに変換するアダプタをここに置く。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use storify_shared::ApiResponse;

/// [`ApiResponse`] を HTTP レスポンスとして返すためのラッパー
///
/// HTTP ステータスはエンベロープの `status_code` と常に一致する。
#[derive(Debug)]
pub struct Envelope<T>(pub ApiResponse<T>);

impl<T> From<ApiResponse<T>> for Envelope<T> {
    fn from(response: ApiResponse<T>) -> Self {
        Self(response)
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}

/// 400 Bad Request のエンベロープレスポンス
pub fn bad_request_response<I, E>(errors: I) -> Response
where
    I: IntoIterator<Item = E>,
    E: Into<String>,
{
    Envelope(ApiResponse::<()>::bad_request(errors)).into_response()
}

/// 任意ステータスの失敗エンベロープレスポンス
pub fn failure_response(status: StatusCode, message: impl Into<String>) -> Response {
    Envelope(ApiResponse::<()>::failure(status.as_u16(), message)).into_response()
}
