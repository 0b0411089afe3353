//! # HTTP リクエストハンドラ
//!
//! API エンドポイントとハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各エンドポイントはサブモジュールに配置し、[`ApiEndpoint`](crate::endpoint::ApiEndpoint) を実装する
//! - 起動時に登録するエンドポイントは [`ENDPOINTS`] に列挙する
//! - ハンドラは薄く保ち、ロジックはユースケースに委譲

pub mod account;
pub mod health;
pub mod storage;

pub use account::{AccountEndpoint, get_claims};
pub use health::{PING_GREETING, ping};
pub use storage::{StorageEndpoint, StorageState};

use crate::endpoint::{EndpointFactory, factory};

/// 起動時に登録するエンドポイント
pub const ENDPOINTS: &[EndpointFactory] = &[
    factory::<StorageEndpoint>,
    factory::<AccountEndpoint>,
];
