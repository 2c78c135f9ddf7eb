use chrono::Duration;
use domain::{DbTokenStore, TokenStore};
use log::{error, info};
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Sweeping API tokens in [{}]...", config.database_location());

    let db = match service::init_database(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {e}");
        std::process::exit(1);
    }

    let lifetime = Duration::minutes(config.token_lifetime_minutes);
    match DbTokenStore::new(db).delete_older_than(lifetime).await {
        Ok(removed) => info!(
            "Removed {removed} token(s) older than {} minutes",
            config.token_lifetime_minutes
        ),
        Err(e) => {
            error!("Failed to sweep tokens: {e}");
            std::process::exit(1);
        }
    }
}
