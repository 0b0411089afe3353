//! # 死活確認ハンドラ
//!
//! ```text
//! GET /ping
//! ```
//!
//! エンドポイントレジストリを経由せず、ベースパスの外に置く。

use storify_shared::ApiResponse;

use crate::response::Envelope;

/// 死活確認の応答データ
pub const PING_GREETING: &str = "Hello World!";

/// 死活確認エンドポイント
pub async fn ping() -> Envelope<&'static str> {
    Envelope(ApiResponse::ok_with(PING_GREETING))
}
