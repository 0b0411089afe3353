//! # パイプラインのミドルウェア
//!
//! - [`enforce_deadline`]: リクエスト処理の制限時間
//! - [`route_not_found`] / [`method_not_allowed`]: ルーティング失敗時のエンベロープ

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode, Uri},
    middleware::Next,
    response::Response,
};

use crate::response::failure_response;

/// 制限時間ミドルウェアの状態
#[derive(Debug, Clone, Copy)]
pub struct DeadlineState {
    pub timeout: Duration,
}

/// 制限時間内に下流が応答しなければ 408 エンベロープを返す
///
/// 下流の future はその時点で破棄され、以降の処理は行われない。
pub async fn enforce_deadline(
    State(state): State<DeadlineState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    match tokio::time::timeout(state.timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(
                %method,
                %uri,
                timeout_secs = state.timeout.as_secs_f64(),
                "リクエストが制限時間を超えたため中断しました"
            );
            failure_response(StatusCode::REQUEST_TIMEOUT, "リクエストがタイムアウトしました")
        }
    }
}

/// どのルートにも一致しない場合の 404
pub async fn route_not_found(uri: Uri) -> Response {
    tracing::debug!(%uri, "ルートが見つかりません");
    failure_response(StatusCode::NOT_FOUND, "リソースが見つかりません")
}

/// パスは一致したがメソッドが許可されていない場合の 405
pub async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    tracing::debug!(%method, %uri, "許可されていないメソッドです");
    failure_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "このメソッドは許可されていません",
    )
}
