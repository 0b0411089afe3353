//! # 呼び出し元のクレーム
//!
//! Authorization ヘッダから Bearer トークンを取り出し、呼び出し元の
//! クレームを得る。トークンの検証とクレームの解析は未実装で、
//! トークンがあっても [`AppError::NotImplemented`] を返す。

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;
use storify_domain::id::ActorId;

use crate::error::AppError;

/// Authorization ヘッダの認証スキーム
pub const BEARER_SCHEME: &str = "Bearer";

/// 呼び出し元のクレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserClaims {
    pub user_id: ActorId,
    pub roles:   Vec<String>,
}

/// Authorization ヘッダから Bearer トークンを取り出す
///
/// ヘッダがない・空白のみ・Bearer 以外のスキームの場合は
/// [`AppError::MissingToken`] を返す。スキーム名の大文字小文字は区別しない。
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    let token = value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case(BEARER_SCHEME))
        .map(|(_, token)| token.trim())
        .unwrap_or_default();

    if token.is_empty() {
        return Err(AppError::MissingToken);
    }
    Ok(token)
}

/// リクエストヘッダから呼び出し元のクレームを得る
pub fn decode_user_claims(headers: &HeaderMap) -> Result<UserClaims, AppError> {
    let _token = extract_bearer_token(headers)?;
    // TODO: 認可サーバーの公開鍵でトークンを検証し、sub と roles を取り出す
    Err(AppError::NotImplemented("アクセストークンのクレーム解析"))
}

impl<S> FromRequestParts<S> for UserClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        decode_user_claims(&parts.headers)
    }
}
