pub mod api;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod mail;
pub mod models;
pub mod services;

pub use config::Config;

use db::Store;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" | "-s" | "--serve" => serve(config).await,

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "news" => {
            if args.len() < 4 {
                println!("Usage: followarr news <title> <text>");
                return Ok(());
            }
            cmd_add_news(&config, &args[2], &args[3]).await
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Followarr - episode notification service");
    println!("Tracks TV shows and tells you when new episodes air");
    println!();
    println!("USAGE:");
    println!("  followarr <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("  serve             Start the API server");
    println!("  news <title> <text>");
    println!("                    Publish a site news item");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure the server, catalog and mail.");
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!(
        "Followarr v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let state = api::create_app_state(config.clone()).await?;

    let app = api::router(state);
    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server running at http://{addr}");

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {e}");
        }
    });

    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {e}"),
    }

    server.abort();
    info!("Server stopped");

    Ok(())
}

async fn cmd_add_news(config: &Config, title: &str, text: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.database_url()).await?;

    let item = store.add_news(title, text, None).await?;
    println!("Published news item #{}: {}", item.id, item.title);

    Ok(())
}
