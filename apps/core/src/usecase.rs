//! # ユースケース層
//!
//! エンドポイントから呼ばれるアプリケーションロジック。
//! 永続化は `Arc<dyn Trait>` で外部から注入する。

pub mod storage;

pub use storage::{
    CreateObjectInput,
    InMemoryObjectStore,
    ObjectStore,
    StorageUseCaseError,
    StorageUseCaseImpl,
};
