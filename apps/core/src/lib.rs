//! # Storify Core ライブラリ
//!
//! ストレージサービスの HTTP API 基盤。
//!
//! ## モジュール構成
//!
//! - `app_builder`: ルーターとパイプラインの組み立て
//! - `auth`: 呼び出し元クレームの取得
//! - `config`: 環境変数からの設定読み込み
//! - `endpoint`: エンドポイントの検出と登録
//! - `error`: 障害と HTTP レスポンスへの変換
//! - `handler`: HTTP ハンドラとエンドポイント一覧
//! - `middleware`: 制限時間とルーティング失敗時の応答
//! - `paging`: ページ指定クエリ
//! - `response`: エンベロープの HTTP レスポンス変換
//! - `usecase`: アプリケーションロジック
//! - `validation`: ルート単位のリクエスト検証

pub mod app_builder;
pub mod auth;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod paging;
pub mod response;
pub mod usecase;
pub mod validation;
