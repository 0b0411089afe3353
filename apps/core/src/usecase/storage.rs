//! # ストレージユースケース
//!
//! 保存オブジェクトの登録・名前変更・取得・一覧を扱う。

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use storify_domain::{
    DomainError,
    clock::Clock,
    entity::AuditedEntity,
    id::{ActorId, EntityId},
    storage::StoredObject,
};
use storify_shared::{Paginated, Pagination};
use thiserror::Error;
use tokio::sync::RwLock;

/// 保存オブジェクトの永続化
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 次のストア内連番を採番する
    async fn next_sub_id(&self) -> anyhow::Result<i64>;

    async fn insert(&self, object: &StoredObject) -> anyhow::Result<()>;

    async fn update(&self, object: &StoredObject) -> anyhow::Result<()>;

    async fn find_by_id(&self, id: EntityId) -> anyhow::Result<Option<StoredObject>>;

    async fn count(&self) -> anyhow::Result<i64>;

    /// 連番順に `skip` 件読み飛ばして最大 `take` 件を返す
    async fn list(&self, skip: usize, take: usize) -> anyhow::Result<Vec<StoredObject>>;
}

/// プロセス内メモリに保持するストア
///
/// プロセス終了とともに内容は失われる。
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects:  RwLock<Vec<StoredObject>>,
    sequence: AtomicI64,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn next_sub_id(&self) -> anyhow::Result<i64> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn insert(&self, object: &StoredObject) -> anyhow::Result<()> {
        self.objects.write().await.push(object.clone());
        Ok(())
    }

    async fn update(&self, object: &StoredObject) -> anyhow::Result<()> {
        let mut objects = self.objects.write().await;
        let slot = objects
            .iter_mut()
            .find(|o| o.id() == object.id())
            .ok_or_else(|| anyhow::anyhow!("更新対象のオブジェクトが存在しません: {}", object.id()))?;
        *slot = object.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: EntityId) -> anyhow::Result<Option<StoredObject>> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .find(|o| o.id() == id)
            .cloned())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(i64::try_from(self.objects.read().await.len())?)
    }

    async fn list(&self, skip: usize, take: usize) -> anyhow::Result<Vec<StoredObject>> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }
}

/// ストレージユースケースのエラー
#[derive(Debug, Error)]
pub enum StorageUseCaseError {
    /// ビジネスルール違反・対象なし
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// ストアの障害
    #[error("ストアエラー: {0}")]
    Store(#[from] anyhow::Error),
}

/// オブジェクト登録の入力
pub struct CreateObjectInput {
    pub name:         String,
    pub content_type: String,
    pub size_bytes:   i64,
    pub actor:        Option<ActorId>,
}

/// ストレージユースケース
pub struct StorageUseCaseImpl {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
}

impl StorageUseCaseImpl {
    pub fn new(store: Arc<dyn ObjectStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// オブジェクトを登録する
    pub async fn create_object(
        &self,
        input: CreateObjectInput,
    ) -> Result<StoredObject, StorageUseCaseError> {
        let sub_id = self.store.next_sub_id().await?;
        let object = StoredObject::new(
            sub_id,
            input.name,
            input.content_type,
            input.size_bytes,
            input.actor,
            self.clock.now(),
        )?;
        self.store.insert(&object).await?;

        tracing::info!(object_id = %object.id(), sub_id, "オブジェクトを登録しました");
        Ok(object)
    }

    /// オブジェクトの名前を変更する
    pub async fn rename_object(
        &self,
        id: EntityId,
        name: String,
        actor: Option<ActorId>,
    ) -> Result<StoredObject, StorageUseCaseError> {
        let mut object = self.get_object(id).await?;
        object.rename(name, actor, self.clock.now())?;
        self.store.update(&object).await?;
        Ok(object)
    }

    pub async fn get_object(&self, id: EntityId) -> Result<StoredObject, StorageUseCaseError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("StoredObject", id).into())
    }

    /// オブジェクト一覧を連番順に取得する
    pub async fn list_objects(
        &self,
        page_index: i64,
        page_size: i64,
    ) -> Result<Paginated<StoredObject>, StorageUseCaseError> {
        let total = self.store.count().await?;
        let pagination = Pagination::from_total(page_index, page_size, total);

        let skip = pagination
            .checked_skip_count()
            .ok_or_else(|| DomainError::Validation("ページ番号が大きすぎます".to_string()))?;
        let skip = usize::try_from(skip).map_err(|_| {
            DomainError::Validation("ページ番号は 1 以上である必要があります".to_string())
        })?;
        let take = usize::try_from(page_size).map_err(|_| {
            DomainError::Validation("ページサイズは 1 以上である必要があります".to_string())
        })?;

        let items = self.store.list(skip, take).await?;
        Ok(Paginated { items, pagination })
    }
}
