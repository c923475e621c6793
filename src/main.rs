use std::error::Error;

use tracing::Level;
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file when present.
    dotenvy::dotenv().ok();

    let filter = ai_llm_service::telemetry::env_filter_with_level("info", Level::INFO);

    // Library events go through the library's own layer only.
    let app_layer = fmt::layer()
        .with_target(false)
        .with_filter(filter::filter_fn(|meta| {
            !ai_llm_service::telemetry::is_library_target(meta.target())
        }));

    tracing_subscriber::registry()
        .with(filter)
        .with(app_layer)
        .with(ai_llm_service::telemetry::layer())
        .init();

    api::start().await?;

    Ok(())
}
