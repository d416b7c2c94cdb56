use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use product_api::auth::JwtKeys;
use product_api::config::{self, AppConfig, StorageBackend};
use product_api::database::{
    DatabaseManager, MemoryProductRepository, MemoryUserRepository, PgProductRepository,
    PgUserRepository, UserRepository,
};
use product_api::database::models::{user::ADMIN_ROLE, User};
use product_api::{app, AppState};

const DEV_USER_EMAIL: &str = "dev@localhost";

#[derive(Parser)]
#[command(name = "product-api")]
#[command(about = "Product catalogue API - user-owned product records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Issue a bearer token for an existing user")]
    Token {
        #[arg(long, help = "Email of the user to issue the token for")]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("product_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::config();
    tracing::info!("Starting Product API in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
        Commands::Token { email } => issue_token(config, &email).await,
    }
}

async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let jwt = jwt_keys(config)?;

    let state = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            AppState::new(
                Arc::new(PgProductRepository::new(pool.clone())),
                Arc::new(PgUserRepository::new(pool)),
                jwt,
            )
        }
        StorageBackend::Memory => {
            if product_api::is_production!() {
                anyhow::bail!("the memory storage backend is not allowed in production");
            }
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            let users = Arc::new(MemoryUserRepository::new());
            seed_dev_user(users.as_ref(), &jwt).await?;
            AppState::new(Arc::new(MemoryProductRepository::new()), users, jwt)
        }
    };

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Product API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn issue_token(config: &AppConfig, email: &str) -> anyhow::Result<()> {
    let jwt = jwt_keys(config)?;
    let pool = DatabaseManager::connect(&config.database).await?;
    let users = PgUserRepository::new(pool);

    let user = users
        .find_by_email(email)
        .await?
        .with_context(|| format!("no user with email {}", email))?;

    let token = jwt.generate(user.id, user.email)?;
    println!("{}", token);
    Ok(())
}

/// The memory backend starts empty; give it one admin to act as
async fn seed_dev_user(users: &dyn UserRepository, jwt: &JwtKeys) -> anyhow::Result<()> {
    let user = users
        .save(User::new(DEV_USER_EMAIL, vec![ADMIN_ROLE.to_string()]))
        .await?;
    let token = jwt.generate(user.id, user.email.clone())?;
    tracing::info!(user_id = %user.id, "Seeded {} (admin); bearer token: {}", user.email, token);
    Ok(())
}

fn jwt_keys(config: &AppConfig) -> anyhow::Result<JwtKeys> {
    JwtKeys::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)
        .context("JWT_SECRET must be set")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
