//! # リクエスト検証ステージ
//!
//! ルート単位で型 `T` の入力を検証するミドルウェア。
//!
//! ## 動作
//!
//! 1. JSON ボディ、なければクエリ文字列から `T` を取り出す
//! 2. 取り出せなければ何もせずハンドラへ進む
//! 3. [`Ruleset`] で検証し、違反があれば 400 エンベロープで打ち切る
//! 4. 違反がなければ元のリクエストのままハンドラへ進む
//!
//! 違反メッセージはフィールド名の昇順で並び、同じフィールド内では
//! ルールの宣言順を保つ。
//!
//! ## 使い方
//!
//! ```ignore
//! Router::new().route(
//!     "/storage/objects",
//!     post(create_object).with_request_validation::<CreateObjectRequest>(),
//! )
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{FromRequest, FromRequestParts, Query, Request, State},
    http::{HeaderMap, header::CONTENT_TYPE, request::Parts},
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::MethodRouter,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::response::bad_request_response;

/// 検証のために読み込むボディの上限（2 MiB）
pub const MAX_PAYLOAD_BYTES: usize = 2 * 1024 * 1024;

/// 型 `T` に対する検証ルール一式
#[async_trait]
pub trait Ruleset<T>: Send + Sync + 'static {
    async fn validate(&self, payload: &T) -> Result<(), ValidationErrors>;
}

/// `#[derive(Validate)]` で宣言されたルールをそのまま使う
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedRules;

#[async_trait]
impl<T> Ruleset<T> for DerivedRules
where
    T: Validate + Send + Sync + 'static,
{
    async fn validate(&self, payload: &T) -> Result<(), ValidationErrors> {
        payload.validate()
    }
}

/// 検証ミドルウェアの状態
pub struct ValidationStage<T> {
    rules: Arc<dyn Ruleset<T>>,
}

impl<T> ValidationStage<T> {
    pub fn new(rules: impl Ruleset<T>) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }
}

impl<T> Clone for ValidationStage<T> {
    fn clone(&self) -> Self {
        Self {
            rules: Arc::clone(&self.rules),
        }
    }
}

/// 検証ミドルウェア本体
///
/// `from_fn_with_state` で [`ValidationStage`] と組み合わせて使う。
pub async fn validate_request<T>(
    State(stage): State<ValidationStage<T>>,
    request: Request,
    next: Next,
) -> Response
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let (payload, request) = match locate_payload::<T>(request).await {
        Ok(located) => located,
        Err(response) => return response,
    };

    let Some(payload) = payload else {
        tracing::debug!(
            payload = std::any::type_name::<T>(),
            "検証対象の入力がないため検証をスキップします"
        );
        return next.run(request).await;
    };

    if let Err(errors) = stage.rules.validate(&payload).await {
        let messages = violation_messages(&errors);
        tracing::debug!(
            payload = std::any::type_name::<T>(),
            violations = messages.len(),
            "リクエストの検証に失敗しました"
        );
        return bad_request_response(messages);
    }

    next.run(request).await
}

/// リクエストから `T` を取り出す
///
/// ボディを読んだ場合は同じバイト列でボディを組み直して返す。
async fn locate_payload<T>(request: Request) -> Result<(Option<T>, Request), Response>
where
    T: DeserializeOwned,
{
    if !is_json_content(request.headers()) {
        let payload = Query::<T>::try_from_uri(request.uri())
            .ok()
            .map(|Query(payload)| payload);
        return Ok((payload, request));
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_PAYLOAD_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!("リクエストボディを読み取れません: {}", err);
            return Err(bad_request_response([format!(
                "リクエストボディを読み取れません（上限 {MAX_PAYLOAD_BYTES} バイト）"
            )]));
        }
    };

    let payload = serde_json::from_slice::<T>(&bytes).ok().or_else(|| {
        Query::<T>::try_from_uri(&parts.uri)
            .ok()
            .map(|Query(payload)| payload)
    });
    Ok((payload, Request::from_parts(parts, Body::from(bytes))))
}

fn is_json_content(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// 検証エラーを利用者向けメッセージの一覧に変換する
///
/// メッセージ中の `'field'` はクォートを外して `field` にする。
/// ネストした構造体やリストの違反は `inner.field` / `items[1].field` のように
/// パスを付けて展開する。
pub fn violation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect_violations("", errors, &mut messages);
    messages
}

fn collect_violations(prefix: &str, errors: &ValidationErrors, messages: &mut Vec<String>) {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (field, kind) in entries {
        let field: &str = field.as_ref();
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(violations) => {
                for violation in violations {
                    let message = describe(field, violation);
                    messages.push(message.replace(&format!("'{field}'"), &path));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_violations(&path, inner, messages),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_violations(&format!("{path}[{index}]"), inner, messages);
                }
            }
        }
    }
}

fn describe(field: &str, violation: &ValidationError) -> String {
    match &violation.message {
        Some(message) => message.to_string(),
        None => format!("'{field}' は不正な値です（{}）", violation.code),
    }
}

/// ルートに検証ステージを付ける拡張
pub trait WithRequestValidation: Sized {
    /// 任意の [`Ruleset`] で検証する
    fn with_validation<T, R>(self, rules: R) -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
        R: Ruleset<T>;

    /// `T` の derive ルールで検証する
    fn with_request_validation<T>(self) -> Self
    where
        T: Validate + DeserializeOwned + Send + Sync + 'static,
    {
        self.with_validation::<T, _>(DerivedRules)
    }
}

impl<S> WithRequestValidation for MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_validation<T, R>(self, rules: R) -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
        R: Ruleset<T>,
    {
        self.route_layer(from_fn_with_state(
            ValidationStage::<T>::new(rules),
            validate_request::<T>,
        ))
    }
}

/// JSON ボディの抽出子
///
/// 解析に失敗した場合は axum 既定のテキストではなく
/// 400 エンベロープを返す。
#[derive(Debug)]
pub struct JsonPayload<T>(pub T);

impl<S, T> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(payload)) => Ok(Self(payload)),
            Err(rejection) => {
                tracing::debug!("JSON ボディを解析できません: {}", rejection.body_text());
                Err(bad_request_response([rejection.body_text()]))
            }
        }
    }
}

/// クエリ文字列の抽出子
///
/// 解析に失敗した場合は 400 エンベロープを返す。
#[derive(Debug)]
pub struct QueryPayload<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(payload)) => Ok(Self(payload)),
            Err(rejection) => Err(bad_request_response([rejection.body_text()])),
        }
    }
}
