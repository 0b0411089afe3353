//! # アプリケーション構築
//!
//! エンドポイントレジストリとパイプライン全体を 1 つのルーターにまとめる。
//! `main.rs` は設定読み込みとサーバー起動に集中する。
//!
//! ## パイプライン（外側から）
//!
//! ```text
//! SetRequestId → PropagateRequestId → Trace → CatchPanic → 制限時間
//!     → ルーティング（/ping, /api/..., 404/405 フォールバック）
//!         → ルート単位の検証ステージ → ハンドラ
//! ```

use std::time::Duration;

use axum::{Router, body::Body, middleware::from_fn_with_state, routing::get};
use storify_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    endpoint::{API_BASE_PATH, EndpointRegistry},
    error::panic_response,
    handler::ping,
    middleware::{DeadlineState, enforce_deadline, method_not_allowed, route_not_found},
};

/// ルーターを構築する
///
/// レイヤーは後から追加したものほど外側で実行される。
pub fn build_app(registry: &EndpointRegistry, request_timeout: Duration) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .merge(registry.mount(API_BASE_PATH))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(from_fn_with_state(
            DeadlineState {
                timeout: request_timeout,
            },
            enforce_deadline,
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
