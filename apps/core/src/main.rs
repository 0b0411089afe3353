//! # Storify Core サーバー
//!
//! ストレージサービスの HTTP API サーバー。
//!
//! ## 起動の流れ
//!
//! 1. `.env` と環境変数から設定を読み込む
//! 2. エンドポイントが必要とするコンポーネントを [`EndpointContext`] に登録する
//! 3. [`ENDPOINTS`] からエンドポイントを生成する（1 つでも失敗すれば起動しない）
//! 4. `/api` 配下にルートを登録してリクエストの待ち受けを開始する
//!
//! 環境変数は [`storify_core::config`] を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! STORIFY_PORT=8080 DATABASE_URL=postgres://... cargo run -p storify-core
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use storify_core::{
    app_builder::build_app,
    config::AppSettings,
    endpoint::{EndpointContext, EndpointRegistry},
    handler::ENDPOINTS,
    usecase::{InMemoryObjectStore, ObjectStore},
};
use storify_domain::clock::{Clock, SystemClock};
use storify_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("storify-core");
    init_tracing(&tracing_config).context("トレーシングの初期化に失敗しました")?;
    let _app_span = tracing::info_span!("app", service = %tracing_config.service_name).entered();

    let settings = AppSettings::from_env().context("設定の読み込みに失敗しました")?;
    tracing::info!(
        database = ?settings.database,
        request_timeout_secs = settings.request_timeout.as_secs(),
        "Storify Core サーバーを起動します: {}",
        settings.bind_address()
    );

    let context = EndpointContext::new()
        .provide::<Arc<dyn ObjectStore>>(Arc::new(InMemoryObjectStore::new()))
        .provide::<Arc<dyn Clock>>(Arc::new(SystemClock))
        .provide(Arc::new(settings.database.clone()));

    let registry = EndpointRegistry::discover(&context, ENDPOINTS)
        .context("エンドポイントの登録に失敗しました")?;
    tracing::info!(endpoints = ?registry.names(), "エンドポイントを登録しました");

    let app = build_app(&registry, settings.request_timeout);

    let addr: SocketAddr = settings
        .bind_address()
        .parse()
        .context("アドレスのパースに失敗しました")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Storify Core サーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Storify Core サーバーを停止しました");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("シグナルの待ち受けに失敗しました: {}", e);
    }
}
