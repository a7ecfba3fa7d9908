use anyhow::Context;

use billbook_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    billbook_observability::init(config.log_format);

    let services = billbook_api::app::services::build_services(&config)
        .await
        .context("failed to initialize storage")?;
    services
        .seed_admin(&config.admin)
        .await
        .context("failed to seed admin user")?;

    let app = billbook_api::app::build_app(services, &config.jwt_secret, config.token_ttl);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
