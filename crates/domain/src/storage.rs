//! # 保存オブジェクト
//!
//! ストレージに保存されたオブジェクトのメタデータを表すエンティティ。
//! 実体（バイト列）の保管は永続化層の責務であり、ここでは扱わない。

use chrono::{DateTime, Utc};

use crate::{
    DomainError,
    entity::{AuditedEntity, EntityMeta},
    id::ActorId,
};

/// オブジェクト名の最大文字数
pub const OBJECT_NAME_MAX_LENGTH: usize = 255;

/// 保存オブジェクト（エンティティ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    meta:         EntityMeta,
    name:         String,
    content_type: String,
    size_bytes:   i64,
}

impl StoredObject {
    /// 新しい保存オブジェクトを作成する
    ///
    /// 作成者と作成日時を記録した状態で返す。
    pub fn new(
        sub_id: i64,
        name: impl Into<String>,
        content_type: impl Into<String>,
        size_bytes: i64,
        actor: Option<ActorId>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if size_bytes < 0 {
            return Err(DomainError::Validation(
                "サイズは 0 以上である必要があります".to_string(),
            ));
        }

        let mut object = Self {
            meta: EntityMeta::new(sub_id),
            name: validate_name(name.into())?,
            content_type: content_type.into(),
            size_bytes,
        };
        object.mark_created(actor, now);
        Ok(object)
    }

    /// 名前を変更する
    pub fn rename(
        &mut self,
        name: impl Into<String>,
        actor: Option<ActorId>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.name = validate_name(name.into())?;
        self.mark_modified(actor, now);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size_bytes(&self) -> i64 {
        self.size_bytes
    }
}

impl AuditedEntity for StoredObject {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

fn validate_name(name: String) -> Result<String, DomainError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("オブジェクト名は必須です".to_string()));
    }
    if name.chars().count() > OBJECT_NAME_MAX_LENGTH {
        return Err(DomainError::Validation(format!(
            "オブジェクト名は {OBJECT_NAME_MAX_LENGTH} 文字以内である必要があります"
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[rstest]
    fn test_newは作成者と作成日時を記録する(now: DateTime<Utc>) {
        let actor = ActorId::new();

        let object = StoredObject::new(1, " report.pdf ", "application/pdf", 1024, Some(actor), now)
            .unwrap();

        assert_eq!(object.name(), "report.pdf");
        assert_eq!(object.content_type(), "application/pdf");
        assert_eq!(object.size_bytes(), 1024);
        assert_eq!(object.meta().sub_id(), 1);
        assert_eq!(object.meta().created_at(), Some(now));
        assert_eq!(object.meta().created_by(), Some(actor));
        assert_eq!(object.meta().modified_at(), None);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_newで空の名前はエラーになる(#[case] name: &str, now: DateTime<Utc>) {
        let result = StoredObject::new(1, name, "text/plain", 0, None, now);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[rstest]
    fn test_newで最大長を超える名前はエラーになる(now: DateTime<Utc>) {
        let name = "a".repeat(OBJECT_NAME_MAX_LENGTH + 1);

        let result = StoredObject::new(1, name, "text/plain", 0, None, now);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[rstest]
    fn test_newで負のサイズはエラーになる(now: DateTime<Utc>) {
        let result = StoredObject::new(1, "a.txt", "text/plain", -1, None, now);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[rstest]
    fn test_renameは更新者と更新日時を記録する(now: DateTime<Utc>) {
        let creator = ActorId::new();
        let editor = ActorId::new();
        let later = now + chrono::Duration::minutes(5);
        let mut object =
            StoredObject::new(1, "a.txt", "text/plain", 3, Some(creator), now).unwrap();

        object.rename("b.txt", Some(editor), later).unwrap();

        assert_eq!(object.name(), "b.txt");
        assert_eq!(object.meta().modified_at(), Some(later));
        assert_eq!(object.meta().modified_by(), Some(editor));
        assert_eq!(object.meta().created_by(), Some(creator));
    }
}
