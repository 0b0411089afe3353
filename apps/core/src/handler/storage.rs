//! # ストレージハンドラ
//!
//! 保存オブジェクトのメタデータを管理する API を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /api/storage/objects` - オブジェクト一覧（ページ指定）
//! - `POST /api/storage/objects` - オブジェクト登録
//! - `GET /api/storage/objects/{id}` - オブジェクト取得
//! - `PUT /api/storage/objects/{id}` - オブジェクト名の変更
//!
//! ## 必要なコンポーネント
//!
//! - `Arc<dyn ObjectStore>`
//! - `Arc<dyn Clock>`

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storify_domain::{
    DomainError,
    clock::Clock,
    entity::AuditedEntity,
    id::{ActorId, EntityId},
    storage::StoredObject,
};
use storify_shared::{ApiResponse, Paginated};
use uuid::Uuid;
use validator::Validate;

use crate::{
    endpoint::{ApiEndpoint, EndpointContext, RegistryError},
    error::AppError,
    paging::PageQuery,
    response::{Envelope, bad_request_response, failure_response},
    usecase::{CreateObjectInput, ObjectStore, StorageUseCaseError, StorageUseCaseImpl},
    validation::{JsonPayload, QueryPayload, WithRequestValidation},
};

const ENDPOINT_NAME: &str = "storage";
const OBJECTS_PATH: &str = "/storage/objects";
const OBJECT_PATH: &str = "/storage/objects/{id}";

/// ストレージ API の共有状態
pub struct StorageState {
    pub usecase: StorageUseCaseImpl,
}

/// ストレージ API のエンドポイント
pub struct StorageEndpoint {
    state: Arc<StorageState>,
}

impl ApiEndpoint for StorageEndpoint {
    fn name(&self) -> &'static str {
        ENDPOINT_NAME
    }

    fn map_endpoints(&self, group: Router) -> Router {
        let routes = Router::new()
            .route(
                OBJECTS_PATH,
                get(list_objects).with_request_validation::<PageQuery>(),
            )
            .route(
                OBJECTS_PATH,
                post(create_object).with_request_validation::<CreateObjectRequest>(),
            )
            .route(OBJECT_PATH, get(get_object))
            .route(
                OBJECT_PATH,
                put(rename_object).with_request_validation::<RenameObjectRequest>(),
            )
            .with_state(self.state.clone());

        group.merge(routes)
    }

    fn from_context(context: &EndpointContext) -> Result<Self, RegistryError> {
        let store = context.require::<Arc<dyn ObjectStore>>(ENDPOINT_NAME)?;
        let clock = context.require::<Arc<dyn Clock>>(ENDPOINT_NAME)?;

        Ok(Self {
            state: Arc::new(StorageState {
                usecase: StorageUseCaseImpl::new(store, clock),
            }),
        })
    }
}

// --- リクエスト/レスポンス型 ---

/// オブジェクト登録リクエスト
#[derive(Debug, Deserialize, Validate)]
pub struct CreateObjectRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "'name' は 1 文字以上 255 文字以内で指定してください"
    ))]
    pub name:         String,
    #[validate(
        length(
            min = 1,
            max = 127,
            message = "'content_type' は 1 文字以上 127 文字以内で指定してください"
        ),
        contains(pattern = "/", message = "'content_type' は type/subtype 形式で指定してください")
    )]
    pub content_type: String,
    #[validate(range(min = 0, message = "'size_bytes' は 0 以上で指定してください"))]
    pub size_bytes:   i64,
}

/// オブジェクト名変更リクエスト
#[derive(Debug, Deserialize, Validate)]
pub struct RenameObjectRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "'name' は 1 文字以上 255 文字以内で指定してください"
    ))]
    pub name: String,
}

/// 保存オブジェクト DTO
#[derive(Debug, Serialize)]
pub struct StoredObjectDto {
    pub id:           EntityId,
    pub sub_id:       i64,
    pub name:         String,
    pub content_type: String,
    pub size_bytes:   i64,
    pub created_at:   Option<DateTime<Utc>>,
    pub created_by:   Option<ActorId>,
    pub modified_at:  Option<DateTime<Utc>>,
    pub modified_by:  Option<ActorId>,
}

impl From<&StoredObject> for StoredObjectDto {
    fn from(object: &StoredObject) -> Self {
        let meta = object.meta();
        Self {
            id:           meta.id(),
            sub_id:       meta.sub_id(),
            name:         object.name().to_string(),
            content_type: object.content_type().to_string(),
            size_bytes:   object.size_bytes(),
            created_at:   meta.created_at(),
            created_by:   meta.created_by(),
            modified_at:  meta.modified_at(),
            modified_by:  meta.modified_by(),
        }
    }
}

// --- ハンドラ ---

/// GET /api/storage/objects
#[tracing::instrument(skip_all)]
pub async fn list_objects(
    State(state): State<Arc<StorageState>>,
    QueryPayload(query): QueryPayload<PageQuery>,
) -> Result<Response, AppError> {
    let result = state
        .usecase
        .list_objects(query.page_index, query.page_size)
        .await
        .map(|page| Paginated {
            items:      page.items.iter().map(StoredObjectDto::from).collect::<Vec<_>>(),
            pagination: page.pagination,
        });
    respond(result)
}

/// POST /api/storage/objects
///
/// ## レスポンス
///
/// - `200 OK`: 登録されたオブジェクト
/// - `400 Bad Request`: 入力値の違反
#[tracing::instrument(skip_all)]
pub async fn create_object(
    State(state): State<Arc<StorageState>>,
    JsonPayload(req): JsonPayload<CreateObjectRequest>,
) -> Result<Response, AppError> {
    let input = CreateObjectInput {
        name:         req.name,
        content_type: req.content_type,
        size_bytes:   req.size_bytes,
        actor:        None,
    };

    let result = state.usecase.create_object(input).await;
    respond(result.map(|object| StoredObjectDto::from(&object)))
}

/// GET /api/storage/objects/{id}
#[tracing::instrument(skip_all)]
pub async fn get_object(
    State(state): State<Arc<StorageState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_object_id(&id) else {
        return Ok(invalid_id_response());
    };

    let result = state.usecase.get_object(id).await;
    respond(result.map(|object| StoredObjectDto::from(&object)))
}

/// PUT /api/storage/objects/{id}
///
/// ## レスポンス
///
/// - `200 OK`: 変更後のオブジェクト
/// - `400 Bad Request`: 入力値の違反
/// - `404 Not Found`: オブジェクトが存在しない
#[tracing::instrument(skip_all)]
pub async fn rename_object(
    State(state): State<Arc<StorageState>>,
    Path(id): Path<String>,
    JsonPayload(req): JsonPayload<RenameObjectRequest>,
) -> Result<Response, AppError> {
    let Some(id) = parse_object_id(&id) else {
        return Ok(invalid_id_response());
    };

    let result = state.usecase.rename_object(id, req.name, None).await;
    respond(result.map(|object| StoredObjectDto::from(&object)))
}

fn parse_object_id(raw: &str) -> Option<EntityId> {
    Uuid::parse_str(raw).ok().map(EntityId::from_uuid)
}

fn invalid_id_response() -> Response {
    bad_request_response(["id は UUID 形式で指定してください"])
}

/// ユースケースの結果をエンベロープに変換する
///
/// ドメインエラーは 400 / 404 のエンベロープ、ストアの障害は [`AppError`] に回す。
fn respond<T: Serialize>(result: Result<T, StorageUseCaseError>) -> Result<Response, AppError> {
    match result {
        Ok(data) => Ok(Envelope(ApiResponse::ok_with(data)).into_response()),
        Err(StorageUseCaseError::Domain(DomainError::Validation(message))) => {
            Ok(bad_request_response([message]))
        }
        Err(StorageUseCaseError::Domain(e @ DomainError::NotFound { .. })) => {
            Ok(failure_response(StatusCode::NOT_FOUND, e.to_string()))
        }
        Err(StorageUseCaseError::Store(e)) => Err(AppError::Internal(e)),
    }
}
