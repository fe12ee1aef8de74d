use std::sync::Arc;

use anyhow::Context;

use fitclub_api::app::{build_app, services::AppServices};
use fitclub_api::bootstrap::seed_account;
use fitclub_auth::TokenService;
use fitclub_infra::{AppConfig, ClubStore, InMemoryClubStore, PostgresClubStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    fitclub_observability::init(config.log_format);

    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let store: Arc<dyn ClubStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresClubStore::connect(url, config.db_max_connections)
                .await
                .context("failed to connect to postgres")?;
            store.migrate().await.context("failed to apply schema")?;
            tracing::info!("using postgres store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
            if config.bootstrap_account.is_none() {
                tracing::warn!(
                    "FITCLUB_BOOTSTRAP_USER/FITCLUB_BOOTSTRAP_PASSWORD not set; nobody can log in to the in-memory store"
                );
            }
            Arc::new(InMemoryClubStore::new())
        }
    };

    if let Some(account) = &config.bootstrap_account {
        seed_account(store.as_ref(), account)
            .await
            .context("failed to seed bootstrap account")?;
    }

    let tokens = TokenService::new(
        config.jwt_secret.as_bytes(),
        config.access_token_ttl,
        config.refresh_token_ttl,
    );
    let services = Arc::new(AppServices::new(store, tokens, config.page_size));
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
