//! Session demo.
//!
//! Logs in against a real backend, prints the profile and saved field
//! mappings, then logs out.
//!
//! # Running
//!
//! ```bash
//! IMPORTER_INSTANCE_URL=acme-uat \
//! IMPORTER_USERNAME=alice \
//! IMPORTER_PASSWORD=secret \
//! RUST_LOG=importer_session=debug \
//! cargo run -p importer-session
//! ```

use anyhow::Context;
use importer_session::providers::{
    ApiSettings, ConfigAdapter, ConsoleNotifier, ConsoleOrderList, HttpUserService,
};
use importer_session::{SessionConfig, SessionController};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "importer_session=info,importer_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = SessionConfig::from_env();
    let instance = config
        .instance_url
        .clone()
        .context("IMPORTER_INSTANCE_URL must be set")?;
    let username = std::env::var("IMPORTER_USERNAME").context("IMPORTER_USERNAME must be set")?;
    let password = std::env::var("IMPORTER_PASSWORD").context("IMPORTER_PASSWORD must be set")?;

    let settings = ApiSettings::new();
    settings.update_instance_url(&instance);

    let controller = SessionController::new(
        HttpUserService::new(settings.clone()),
        ConsoleNotifier::new(),
        settings,
        ConsoleOrderList::new(),
        config,
    );

    controller
        .login(username, password)
        .await
        .context("login failed")?;

    if let Some(user) = controller.current_user().await {
        tracing::info!(
            user = user.user_login_id.as_deref().unwrap_or("?"),
            name = user.party_name.as_deref().unwrap_or("?"),
            time_zone = user.user_time_zone.as_deref().unwrap_or("?"),
            "Signed in"
        );
    }

    let mut mappings: Vec<_> = controller.field_mappings().await.into_values().collect();
    mappings.sort_by(|a, b| a.name.cmp(&b.name));
    for mapping in mappings {
        tracing::info!(id = %mapping.id, name = %mapping.name, fields = mapping.value.len(), "Saved mapping");
    }

    controller.logout().await;
    Ok(())
}
