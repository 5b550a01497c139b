//! Workshop API server binary

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use workshop_api::{
    config::Args,
    db::{DocumentStore, MemoryDocumentStore, MongoClient, MongoDocumentStore},
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("workshop_api={},info", log_level).into());
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Workshop API v{}", env!("CARGO_PKG_VERSION"));
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} / {}", args.mongodb_uri, args.mongodb_db);
    info!("Access policy: {:?}", args.access_policy);
    info!("======================================");

    // MongoDB is required in production; dev mode falls back to memory
    let (store, store_kind): (Arc<dyn DocumentStore>, &'static str) =
        match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => {
                info!("MongoDB connected successfully");
                let store = MongoDocumentStore::new(client);
                if let Err(e) = store.ensure_indexes().await {
                    warn!("Failed to ensure indexes: {}", e);
                }
                (Arc::new(store), "mongodb")
            }
            Err(e) => {
                if args.dev_mode {
                    warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                    (Arc::new(MemoryDocumentStore::new()), "memory")
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    let state = Arc::new(AppState::new(args, store, store_kind));

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
