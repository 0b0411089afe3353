//! # 監査付きエンティティ基盤
//!
//! すべての永続化対象エンティティが共通で持つ識別子と監査フィールドを定義する。
//!
//! ## フィールド
//!
//! | フィールド | 型 | 説明 |
//! |-----------|----|------|
//! | `id` | [`EntityId`] | 大域的に一意な識別子 |
//! | `sub_id` | `i64` | 並び順のヒントとなる連番（シャードを跨いだ一意性は保証しない） |
//! | `created_at` / `created_by` | `Option` | 作成日時・作成者 |
//! | `modified_at` / `modified_by` | `Option` | 最終更新日時・更新者 |
//!
//! 削除の遷移は定義しない（削除ポリシーは永続化層の責務）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{ActorId, EntityId};

/// エンティティの識別子と監査フィールド
///
/// 各エンティティはこの型をフィールドとして保持し、
/// [`AuditedEntity`] を実装して遷移メソッドを公開する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    id:          EntityId,
    sub_id:      i64,
    created_at:  Option<DateTime<Utc>>,
    modified_at: Option<DateTime<Utc>>,
    created_by:  Option<ActorId>,
    modified_by: Option<ActorId>,
}

impl EntityMeta {
    /// 新しい識別子を採番し、監査フィールドが空の状態で作成する
    pub fn new(sub_id: i64) -> Self {
        Self::from_db(EntityId::new(), sub_id, None, None, None, None)
    }

    /// 既存のデータから復元する
    pub fn from_db(
        id: EntityId,
        sub_id: i64,
        created_at: Option<DateTime<Utc>>,
        modified_at: Option<DateTime<Utc>>,
        created_by: Option<ActorId>,
        modified_by: Option<ActorId>,
    ) -> Self {
        Self {
            id,
            sub_id,
            created_at,
            modified_at,
            created_by,
            modified_by,
        }
    }

    /// 作成済みとして記録する
    ///
    /// `created_at` と `created_by` のみを更新し、更新系フィールドには触れない。
    pub fn mark_created(&mut self, actor: Option<ActorId>, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.created_by = actor;
    }

    /// 更新済みとして記録する
    ///
    /// `modified_at` と `modified_by` のみを更新する。作成者は変更しない。
    pub fn mark_modified(&mut self, actor: Option<ActorId>, now: DateTime<Utc>) {
        self.modified_at = Some(now);
        self.modified_by = actor;
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn sub_id(&self) -> i64 {
        self.sub_id
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    pub fn created_by(&self) -> Option<ActorId> {
        self.created_by
    }

    pub fn modified_by(&self) -> Option<ActorId> {
        self.modified_by
    }
}

/// 監査フィールドを持つエンティティ
///
/// `meta` / `meta_mut` を実装すれば、遷移メソッドは既定実装が使われる。
pub trait AuditedEntity {
    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    fn id(&self) -> EntityId {
        self.meta().id()
    }

    fn mark_created(&mut self, actor: Option<ActorId>, now: DateTime<Utc>) {
        self.meta_mut().mark_created(actor, now);
    }

    fn mark_modified(&mut self, actor: Option<ActorId>, now: DateTime<Utc>) {
        self.meta_mut().mark_modified(actor, now);
    }
}
