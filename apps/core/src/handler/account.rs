//! # アカウントハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/account/claims` - 呼び出し元のクレーム
//!
//! クレームの解析は未実装のため、トークンがない場合は 401、
//! ある場合は 500 になる。

use axum::{Router, routing::get};
use storify_shared::ApiResponse;

use crate::{
    auth::UserClaims,
    endpoint::{ApiEndpoint, EndpointContext, RegistryError},
    response::Envelope,
};

/// アカウント API のエンドポイント
pub struct AccountEndpoint;

impl ApiEndpoint for AccountEndpoint {
    fn name(&self) -> &'static str {
        "account"
    }

    fn map_endpoints(&self, group: Router) -> Router {
        group.route("/account/claims", get(get_claims))
    }

    fn from_context(_context: &EndpointContext) -> Result<Self, RegistryError> {
        Ok(Self)
    }
}

/// GET /api/account/claims
#[tracing::instrument(skip_all)]
pub async fn get_claims(claims: UserClaims) -> Envelope<UserClaims> {
    Envelope(ApiResponse::ok_with(claims))
}
