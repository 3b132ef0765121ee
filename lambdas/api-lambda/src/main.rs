mod http_handler;
mod responses;

use gth_shared::{AppState, Config};
use lambda_http::{run, service_fn, Error, Request};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gth_api_lambda=info,gth_shared=info,gth_atoms=info".into()),
        )
        .without_time() // CloudWatch adds timestamps
        .init();

    let config = Config::from_env()?;
    tracing::info!("Using table {}", config.table_name);

    let state = Arc::new(AppState::from_config(config).await);

    run(service_fn(move |event: Request| {
        let state = state.clone();
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
