//! # ログとリクエスト追跡
//!
//! サブスクライバの初期化、出力形式の選択、リクエスト ID の採番を扱う。
//!
//! 出力形式は `LOG_FORMAT`（`json` / `pretty`）、フィルタは `RUST_LOG` で切り替える。

use std::str::FromStr;

use thiserror::Error;

/// リクエスト ID を運ぶヘッダー名
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 出力形式を指定する環境変数
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_DIRECTIVES: &str = "info,storify=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 イベントの JSON
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("未知のログ形式です: {0:?}")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if value.eq_ignore_ascii_case("pretty") {
            Ok(Self::Pretty)
        } else {
            Err(UnknownLogFormat(s.to_string()))
        }
    }
}

/// サブスクライバの初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub service_name:       String,
    pub log_format:         LogFormat,
    pub default_directives: String,
    rejected_format:        Option<String>,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            default_directives: DEFAULT_DIRECTIVES.to_string(),
            rejected_format: None,
        }
    }

    pub fn with_default_directives(mut self, directives: impl Into<String>) -> Self {
        self.default_directives = directives.into();
        self
    }

    /// 任意の参照元から出力形式を読む
    ///
    /// 解釈できない値は [`LogFormat::Pretty`] に置き換え、
    /// 初期化後に警告できるよう元の値を保持する。
    pub fn from_lookup(
        service_name: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = Self::new(service_name, LogFormat::default());
        if let Some(raw) = lookup(LOG_FORMAT_VAR) {
            match raw.parse() {
                Ok(format) => config.log_format = format,
                Err(UnknownLogFormat(value)) => config.rejected_format = Some(value),
            }
        }
        config
    }

    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::from_lookup(service_name, |name| std::env::var(name).ok())
    }

    /// 読み込み時に捨てた `LOG_FORMAT` の値
    pub fn rejected_format(&self) -> Option<&str> {
        self.rejected_format.as_deref()
    }
}

/// グローバルサブスクライバを登録する
///
/// 2 回目以降の呼び出しはエラーを返す。サービス名をログに含めるには、
/// 呼び出し側で `info_span!("app", service = ...)` に入っておく。
#[cfg(feature = "observability")]
pub fn init_tracing(
    config: &TracingConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directives));

    let json = (config.log_format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
    });
    let pretty = (config.log_format == LogFormat::Pretty).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()?;

    if let Some(value) = config.rejected_format() {
        tracing::warn!(log_format = value, "未知の LOG_FORMAT のため pretty で出力します");
    }
    Ok(())
}

/// UUID v7 のリクエスト ID を採番する
///
/// クライアントが `x-request-id` を付けてきた場合は `SetRequestIdLayer` が
/// そちらを優先するため、ここは呼ばれない。
#[cfg(feature = "observability")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV7;

#[cfg(feature = "observability")]
impl tower_http::request_id::MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(
        &mut self,
        _request: &http::Request<B>,
    ) -> Option<tower_http::request_id::RequestId> {
        let id = uuid::Uuid::now_v7().hyphenated().to_string();
        let value = http::HeaderValue::try_from(id).ok()?;
        Some(tower_http::request_id::RequestId::new(value))
    }
}

/// `TraceLayer::make_span_with` 用のスパン
///
/// クエリ文字列は記録せず、パスのみを残す。
#[cfg(feature = "observability")]
pub fn make_request_span<B>(request: &http::Request<B>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<tower_http::request_id::RequestId>()
        .map(tower_http::request_id::RequestId::header_value)
        .or_else(|| request.headers().get(REQUEST_ID_HEADER))
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = request.uri().path(),
        request_id,
    )
}
