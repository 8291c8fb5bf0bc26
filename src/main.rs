use std::sync::Arc;

use clap::{Parser, Subcommand};
use wbrank::api::{AppState, create_router};
use wbrank::config::CONFIG;
use wbrank::fetcher::build_client;
use wbrank::search_client::WbSearchClient;
use wbrank::service::{get_search_position, parse_search_args};

/// Find where a product ranks in marketplace search results.
#[derive(Parser)]
#[command(name = "wbrank", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up an item: `search <query words...> <item id>`.
    Search {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Serve the HTTP API.
    Serve {
        /// Listen address, defaults to SERVER_ADDR.
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // One pooled client for the whole process, dropped on exit.
    let http_client = build_client(CONFIG.request_timeout())?;
    let search_client = WbSearchClient::with_http_client(http_client, CONFIG.client_options())?;

    match cli.command {
        Command::Search { words } => run_search(search_client, &words).await,
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| CONFIG.server_addr.clone());
            serve(search_client, &addr).await
        }
    }
}

async fn run_search(client: WbSearchClient, words: &[String]) -> anyhow::Result<()> {
    let (query, item_id) = parse_search_args(words)?;

    let outcome = tokio::time::timeout(
        CONFIG.search_timeout(),
        get_search_position(&client, &query, item_id),
    )
    .await
    .map_err(|_| {
        anyhow::anyhow!(
            "search did not finish within {}s",
            CONFIG.search_timeout_secs
        )
    })?;

    match outcome? {
        Some(result) => {
            println!("{result}");
            println!(
                "Absolute position: {}",
                result.absolute_position(client.page_item_count())
            );
        }
        None => println!(
            "Item {item_id} was not found in the first {} pages for {query:?}",
            client.max_pages()
        ),
    }
    Ok(())
}

async fn serve(client: WbSearchClient, addr: &str) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        client,
        search_timeout: CONFIG.search_timeout(),
    });
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {:#}", e);
    }
    log::info!("shutting down");
}
