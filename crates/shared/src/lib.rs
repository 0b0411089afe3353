//! # Storify 共有ユーティリティ
//!
//! レスポンスのエンベロープ、ページ情報、ログ初期化をまとめる。
//! HTTP フレームワークには依存せず、axum への変換は core 側で行う。
//!
//! `observability` フィーチャーを有効にすると、サブスクライバ初期化と
//! リクエスト ID 採番が使えるようになる。

pub mod api_response;
pub mod observability;
pub mod pagination;

pub use api_response::ApiResponse;
pub use pagination::{Paginated, Pagination};
