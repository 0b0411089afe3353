//! # 識別子
//!
//! UUID v7 をラップした Newtype の識別子を定義する。

/// UUID v7 ベースの ID 型を定義する宣言型マクロ
///
/// 生成されるもの:
/// - `Uuid` をラップした Newtype 構造体（`Display` は UUID 文字列）
/// - `new()`: UUID v7 を採番
/// - `from_uuid()` / `as_uuid()`
/// - `Default`（`new()` に委譲）
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        #[serde(transparent)]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            /// 新しい ID を採番する（UUID v7）
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_uuid_id! {
    /// エンティティの大域的に一意な識別子
    pub struct EntityId;
}

define_uuid_id! {
    /// 操作を行った主体（ユーザーやシステム）の識別子
    ///
    /// 監査フィールド `created_by` / `modified_by` に記録される。
    pub struct ActorId;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_newはuuid_v7を採番する() {
        let id = EntityId::new();

        assert_eq!(id.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_from_uuidで復元したidは元のidと等しい() {
        let id = ActorId::new();
        let restored = ActorId::from_uuid(*id.as_uuid());

        assert_eq!(id, restored);
    }

    #[test]
    fn test_displayとserializeはuuid文字列になる() {
        let uuid = uuid::Uuid::parse_str("01890a5d-ac96-774b-bcce-b302099a8057").unwrap();
        let id = EntityId::from_uuid(uuid);

        assert_eq!(id.to_string(), "01890a5d-ac96-774b-bcce-b302099a8057");
        assert_eq!(
            serde_json::to_value(id).unwrap(),
            serde_json::json!("01890a5d-ac96-774b-bcce-b302099a8057")
        );
    }
}
