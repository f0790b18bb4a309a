use slipway_core::domain::theme::Theme;
use slipway_testkit::{FakeWorker, SharedState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Standalone fake worker for exercising the CLI by hand
#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slipway_testkit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("SLIPWAY_FAKE_ADDR").unwrap_or_else(|_| "127.0.0.1:8081".to_string());
    let worker = FakeWorker::serve(SharedState::default(), &addr).await?;

    worker.set_themes(vec![Theme {
        name: "seriph".to_string(),
        version: "0.25.0".to_string(),
        description: "Serif theme".to_string(),
        installed: true,
        npm_package: Some("@slidev/theme-seriph".to_string()),
    }]);
    worker
        .set_result_files(&[("index.html", "<html><body>demo</body></html>".as_bytes())])
        .map_err(std::io::Error::other)?;

    tracing::info!("Fake worker listening on {}", worker.base_url());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    Ok(())
}
