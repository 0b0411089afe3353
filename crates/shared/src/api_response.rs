//! # API レスポンスエンベロープ
//!
//! 公開 API の統一レスポンス形式を提供する。
//!
//! 成功・バリデーションエラー・内部エラーのいずれの結果も、最終的にこの
//! エンベロープの形でクライアントに返される。
//!
//! ## JSON 形式
//!
//! ```json
//! {
//!   "timestamp": "2024-01-01T00:00:00Z",
//!   "status_code": 200,
//!   "success": true,
//!   "message": "任意のメッセージ",
//!   "data": { "...": "..." }
//! }
//! ```
//!
//! `message` / `errors` / `data` は値がない場合 JSON から省略される。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

/// 200 OK
pub const STATUS_OK: u16 = 200;

/// 400 Bad Request
pub const STATUS_BAD_REQUEST: u16 = 400;

/// ステータスコードが成功（2xx）を表すかどうか
pub fn is_success_status(status_code: u16) -> bool {
    (200..=299).contains(&status_code)
}

/// 公開 API の統一レスポンス型
///
/// `success` フィールドは保持せず、シリアライズのたびに `status_code`
/// から再計算する。コンストラクタ経由でしか生成できないため、
/// `status_code` と `success` が食い違うことはない。
///
/// ## 使用例
///
/// ```
/// use storify_shared::ApiResponse;
///
/// let response = ApiResponse::ok_with("hello").with_message("取得しました");
/// assert_eq!(response.status_code(), 200);
/// assert!(response.success());
/// assert_eq!(response.data(), Some(&"hello"));
///
/// let error = ApiResponse::<()>::bad_request(["name は必須です"]);
/// assert!(!error.success());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiResponse<T = ()> {
    timestamp:   DateTime<Utc>,
    status_code: u16,
    message:     Option<String>,
    errors:      Option<Vec<String>>,
    data:        Option<T>,
}

impl ApiResponse<()> {
    /// データを持たない 200 OK を作成する
    pub fn ok() -> Self {
        Self::build(STATUS_OK, None, None)
    }
}

impl<T> ApiResponse<T> {
    fn build(status_code: u16, errors: Option<Vec<String>>, data: Option<T>) -> Self {
        Self {
            timestamp: Utc::now(),
            status_code,
            message: None,
            errors,
            data,
        }
    }

    /// データ付きの 200 OK を作成する
    pub fn ok_with(data: T) -> Self {
        Self::build(STATUS_OK, None, Some(data))
    }

    /// 400 Bad Request を作成する
    ///
    /// `errors` の順序はそのまま保持される。
    pub fn bad_request<I, E>(errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        let errors = errors.into_iter().map(Into::into).collect();
        Self::build(STATUS_BAD_REQUEST, Some(errors), None)
    }

    /// 任意のステータスで失敗レスポンスを作成する
    ///
    /// エラー変換やルーティング失敗など、エラー一覧を持たない失敗に使う。
    pub fn failure(status_code: u16, message: impl Into<String>) -> Self {
        Self::build(status_code, None, None).with_message(message)
    }

    /// メッセージを設定する
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// エンベロープの生成時刻
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// 成功（2xx）かどうか
    pub fn success(&self) -> bool {
        is_success_status(self.status_code)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn errors(&self) -> Option<&[String]> {
        self.errors.as_deref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 3
            + usize::from(self.message.is_some())
            + usize::from(self.errors.is_some())
            + usize::from(self.data.is_some());
        let mut state = serializer.serialize_struct("ApiResponse", len)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("status_code", &self.status_code)?;
        state.serialize_field("success", &self.success())?;
        match &self.message {
            Some(message) => state.serialize_field("message", message)?,
            None => state.skip_field("message")?,
        }
        match &self.errors {
            Some(errors) => state.serialize_field("errors", errors)?,
            None => state.skip_field("errors")?,
        }
        match &self.data {
            Some(data) => state.serialize_field("data", data)?,
            None => state.skip_field("data")?,
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_okは200でメッセージなしのレスポンスを返す() {
        let response = ApiResponse::ok();

        assert_eq!(response.status_code(), 200);
        assert!(response.success());
        assert_eq!(response.message(), None);
        assert_eq!(response.errors(), None);
        assert_eq!(response.data(), None);
    }

    #[test]
    fn test_ok_withはデータとメッセージを保持する() {
        let response = ApiResponse::ok_with(vec![1, 2, 3]).with_message("取得しました");

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.data(), Some(&vec![1, 2, 3]));
        assert_eq!(response.message(), Some("取得しました"));
        assert_eq!(response.errors(), None);
    }

    #[test]
    fn test_bad_requestはエラーの順序を保持する() {
        let response = ApiResponse::<()>::bad_request(["b のエラー", "a のエラー"]);

        assert_eq!(response.status_code(), 400);
        assert!(!response.success());
        assert_eq!(
            response.errors(),
            Some(&["b のエラー".to_string(), "a のエラー".to_string()][..])
        );
        assert_eq!(response.data(), None);
    }

    #[test]
    fn test_timestampは生成時刻になる() {
        let before = Utc::now();
        let response = ApiResponse::ok();
        let after = Utc::now();

        assert!(response.timestamp() >= before);
        assert!(response.timestamp() <= after);
    }

    #[rstest]
    #[case(199, false)]
    #[case(200, true)]
    #[case(204, true)]
    #[case(299, true)]
    #[case(300, false)]
    #[case(401, false)]
    #[case(500, false)]
    fn test_failureのsuccessは境界値で判定される(#[case] status: u16, #[case] expected: bool) {
        let response = ApiResponse::<()>::failure(status, "結果");

        assert_eq!(response.success(), expected);
    }

    #[test]
    fn test_serializeでsuccessが計算済みフィールドとして出力される() {
        let response = ApiResponse::ok_with("hello").with_message("ok");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status_code"], 200);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "ok");
        assert_eq!(json["data"], "hello");
        assert!(json.get("errors").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_serializeで空のフィールドは省略される() {
        let response = ApiResponse::<()>::bad_request(["name は必須です"]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["errors"], serde_json::json!(["name は必須です"]));
        assert!(json.get("data").is_none());
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_deserializeでsuccessは無視されstatus_codeから再計算される() {
        let json = r#"{
            "timestamp": "2024-01-01T00:00:00Z",
            "status_code": 500,
            "success": true,
            "message": "内部エラーが発生しました"
        }"#;
        let response: ApiResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.status_code(), 500);
        assert!(!response.success());
        assert_eq!(response.message(), Some("内部エラーが発生しました"));
    }

    proptest! {
        #[test]
        fn prop_failureのsuccessはステータスが2xxのときだけtrue(status in any::<u16>()) {
            let response = ApiResponse::<()>::failure(status, "任意");
            prop_assert_eq!(response.success(), (200..=299).contains(&status));
        }

        #[test]
        fn prop_シリアライズ結果のsuccessはstatus_codeと一致する(status in 100u16..600) {
            let response = ApiResponse::<()>::failure(status, "任意");
            let json = serde_json::to_value(&response).unwrap();
            prop_assert_eq!(json["success"].as_bool(), Some((200..=299).contains(&status)));
        }
    }
}
