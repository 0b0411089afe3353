//! # Storify ドメイン層
//!
//! エンティティと値オブジェクトを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! core → domain
//! core → shared
//! ```
//!
//! domain と shared は互いに依存しない。
//!
//! ドメイン層は永続化や HTTP には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`clock`] - 現在時刻の供給元
//! - [`entity`] - 監査付きエンティティ基盤
//! - [`error`] - ドメインエラー
//! - [`id`] - UUID v7 ベースの識別子
//! - [`storage`] - 保存オブジェクト

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod storage;

pub use error::DomainError;
