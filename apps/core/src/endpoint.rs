//! # エンドポイントレジストリ
//!
//! API エンドポイントを起動時に一括で生成し、共通のベースパス配下に
//! ルートを登録する。
//!
//! ## 流れ
//!
//! ```text
//! ENDPOINTS（ファクトリ一覧）
//!     │ EndpointRegistry::discover(context)
//!     ▼
//! Box<dyn ApiEndpoint> × N   ← 依存コンポーネントは EndpointContext から取得
//!     │ EndpointRegistry::mount("/api")
//!     ▼
//! Router（/api 配下に全ルート）
//! ```
//!
//! 依存コンポーネントが 1 つでも欠けていれば登録全体が失敗し、
//! サーバーは起動しない。

use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    sync::Arc,
};

use axum::Router;
use thiserror::Error;

/// エンドポイントを登録するベースパス
pub const API_BASE_PATH: &str = "/api";

/// エンドポイント登録時のエラー
#[derive(Debug, Error)]
pub enum RegistryError {
    /// エンドポイントが必要とするコンポーネントが提供されていない
    #[error("{endpoint} に必要なコンポーネントが登録されていません: {collaborator}")]
    MissingCollaborator {
        endpoint:     &'static str,
        collaborator: &'static str,
    },
}

/// API エンドポイント
///
/// 実装は [`ApiEndpoint::from_context`] で依存を受け取り、
/// [`ApiEndpoint::map_endpoints`] で共有のルートグループに自身のルートを追加する。
pub trait ApiEndpoint: Send + Sync + 'static {
    /// 重複検出とログに使う名前
    fn name(&self) -> &'static str;

    /// ルートグループに自身のルートを追加する
    fn map_endpoints(&self, group: Router) -> Router;

    /// 依存コンポーネントからインスタンスを生成する
    fn from_context(context: &EndpointContext) -> Result<Self, RegistryError>
    where
        Self: Sized;
}

/// エンドポイントのファクトリ
pub type EndpointFactory = fn(&EndpointContext) -> Result<Box<dyn ApiEndpoint>, RegistryError>;

/// `E` のファクトリ
///
/// `ENDPOINTS` 一覧に `factory::<E>` の形で並べる。
pub fn factory<E: ApiEndpoint>(
    context: &EndpointContext,
) -> Result<Box<dyn ApiEndpoint>, RegistryError> {
    Ok(Box::new(E::from_context(context)?))
}

/// エンドポイントに提供する依存コンポーネントの集合
///
/// 型ごとに 1 つの値を保持する。トレイトオブジェクトは
/// `Arc<dyn Trait>` の型で登録・取得する。
#[derive(Clone, Default)]
pub struct EndpointContext {
    collaborators: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl EndpointContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// コンポーネントを登録する（同じ型は上書き）
    pub fn provide<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.collaborators.insert(TypeId::of::<T>(), Arc::new(value));
        self
    }

    /// コンポーネントを取得する
    ///
    /// `endpoint` はエラーメッセージに使う要求元の名前。
    pub fn require<T>(&self, endpoint: &'static str) -> Result<T, RegistryError>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.collaborators
            .get(&TypeId::of::<T>())
            .and_then(|value| value.as_ref().downcast_ref::<T>())
            .cloned()
            .ok_or(RegistryError::MissingCollaborator {
                endpoint,
                collaborator: type_name::<T>(),
            })
    }
}

/// 生成済みエンドポイントの一覧
pub struct EndpointRegistry {
    endpoints: Vec<Box<dyn ApiEndpoint>>,
}

impl EndpointRegistry {
    /// ファクトリ一覧からエンドポイントを生成する
    ///
    /// 1 つでも生成に失敗した場合はエラーを返し、部分的な登録は行わない。
    /// 同じ名前のエンドポイントは最初の 1 つだけを採用する。
    pub fn discover(
        context: &EndpointContext,
        factories: &[EndpointFactory],
    ) -> Result<Self, RegistryError> {
        let mut endpoints: Vec<Box<dyn ApiEndpoint>> = Vec::with_capacity(factories.len());

        for factory in factories {
            let endpoint = factory(context).inspect_err(|e| {
                tracing::error!("エンドポイントを生成できません: {}", e);
            })?;

            if endpoints.iter().any(|e| e.name() == endpoint.name()) {
                tracing::warn!(
                    endpoint = endpoint.name(),
                    "同名のエンドポイントが既に登録されているためスキップします"
                );
                continue;
            }

            tracing::info!(endpoint = endpoint.name(), "エンドポイントを検出しました");
            endpoints.push(endpoint);
        }

        Ok(Self { endpoints })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// 登録順のエンドポイント名
    pub fn names(&self) -> Vec<&'static str> {
        self.endpoints.iter().map(|e| e.name()).collect()
    }

    /// 全エンドポイントのルートを `base_path` 配下に登録したルーターを返す
    ///
    /// 各エンドポイントの [`ApiEndpoint::map_endpoints`] はちょうど 1 回呼ばれる。
    pub fn mount(&self, base_path: &str) -> Router {
        let group = self.endpoints.iter().fold(Router::new(), |group, endpoint| {
            tracing::debug!(
                endpoint = endpoint.name(),
                base_path,
                "エンドポイントのルートを登録します"
            );
            endpoint.map_endpoints(group)
        });

        Router::new().nest(base_path, group)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        routing::get,
    };
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    /// map_endpoints の呼び出し回数
    #[derive(Clone, Default)]
    struct MapCalls(Arc<AtomicUsize>);

    impl MapCalls {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    const NAMES: [&str; 3] = ["alpha", "beta", "gamma"];

    struct CountingEndpoint<const ID: usize> {
        calls: MapCalls,
    }

    impl<const ID: usize> ApiEndpoint for CountingEndpoint<ID> {
        fn name(&self) -> &'static str {
            NAMES[ID]
        }

        fn map_endpoints(&self, group: Router) -> Router {
            self.calls.0.fetch_add(1, Ordering::SeqCst);
            group.route(&format!("/{}", NAMES[ID]), get(|| async { NAMES[ID] }))
        }

        fn from_context(context: &EndpointContext) -> Result<Self, RegistryError> {
            Ok(Self {
                calls: context.require::<MapCalls>(NAMES[ID])?,
            })
        }
    }

    /// 依存を持たないが CountingEndpoint<0> と同じ名前を名乗る
    struct DuplicateAlpha;

    impl ApiEndpoint for DuplicateAlpha {
        fn name(&self) -> &'static str {
            "alpha"
        }

        fn map_endpoints(&self, group: Router) -> Router {
            group.route("/duplicate", get(|| async { "duplicate" }))
        }

        fn from_context(_context: &EndpointContext) -> Result<Self, RegistryError> {
            Ok(Self)
        }
    }

    const COUNTING: &[EndpointFactory] = &[
        factory::<CountingEndpoint<0>>,
        factory::<CountingEndpoint<1>>,
        factory::<CountingEndpoint<2>>,
    ];

    #[test]
    fn test_discoverは全ファクトリからエンドポイントを生成する() {
        // Given
        let context = EndpointContext::new().provide(MapCalls::default());

        // When
        let registry = EndpointRegistry::discover(&context, COUNTING).unwrap();

        // Then
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_mountは各エンドポイントのルート登録を1回ずつ呼ぶ() {
        // Given
        let calls = MapCalls::default();
        let context = EndpointContext::new().provide(calls.clone());
        let registry = EndpointRegistry::discover(&context, COUNTING).unwrap();

        // When
        let _router = registry.mount(API_BASE_PATH);

        // Then
        assert_eq!(calls.count(), 3);
    }

    #[test]
    fn test_依存が欠けていると登録全体が失敗する() {
        // Given: MapCalls を提供しない
        let context = EndpointContext::new();

        // When
        let result = EndpointRegistry::discover(&context, COUNTING);

        // Then
        match result {
            Err(RegistryError::MissingCollaborator {
                endpoint,
                collaborator,
            }) => {
                assert_eq!(endpoint, "alpha");
                assert!(collaborator.ends_with("MapCalls"));
            }
            Ok(_) => panic!("依存が欠けているのに登録に成功した"),
        }
    }

    #[test]
    fn test_同名のエンドポイントは最初の1つだけ採用する() {
        let context = EndpointContext::new().provide(MapCalls::default());
        let factories: &[EndpointFactory] = &[
            factory::<CountingEndpoint<0>>,
            factory::<DuplicateAlpha>,
            factory::<CountingEndpoint<1>>,
        ];

        let registry = EndpointRegistry::discover(&context, factories).unwrap();

        assert_eq!(registry.names(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_ファクトリがなければ空のレジストリになる() {
        let registry = EndpointRegistry::discover(&EndpointContext::new(), &[]).unwrap();

        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_登録したルートはベースパス配下で応答する() {
        // Given
        let context = EndpointContext::new().provide(MapCalls::default());
        let sut = EndpointRegistry::discover(&context, COUNTING)
            .unwrap()
            .mount(API_BASE_PATH);

        // When
        let response = sut
            .oneshot(Request::builder().uri("/api/beta").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"beta");
    }

    #[test]
    fn test_provideは同じ型の値を上書きする() {
        let context = EndpointContext::new()
            .provide(Arc::new("first".to_string()))
            .provide(Arc::new("second".to_string()));

        let value = context.require::<Arc<String>>("test").unwrap();

        assert_eq!(value.as_str(), "second");
    }
}
