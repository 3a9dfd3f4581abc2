use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;

use payconfirm::backend::HttpBackend;
use payconfirm::config::Config;
use payconfirm::handlers;
use payconfirm::models::RedirectParams;
use payconfirm::reconciler::{CancelFlag, Outcome, PollSettings, Reconciler};
use payconfirm::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "payconfirm")]
#[command(about = "Payment confirmation service for the storefront checkout flow")]
struct Cli {
    /// Run a single confirmation for this order id and print the outcome
    /// instead of starting the server (operational debugging)
    #[arg(long)]
    order_id: Option<String>,

    /// Session token for the one-shot confirmation, if needed
    #[arg(long, requires = "order_id")]
    session: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payconfirm=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let backend = HttpBackend::new(&config.backend_url).expect("Failed to build backend client");

    // One-shot mode: confirm a single order from the command line and exit
    if let Some(order_id) = cli.order_id {
        let reconciler = Reconciler::new(Arc::new(backend), PollSettings::default());
        let params = RedirectParams {
            order_id: Some(order_id.clone()),
            ..Default::default()
        };

        match reconciler
            .confirm(&params, cli.session.as_deref(), &CancelFlag::new())
            .await
        {
            Outcome::Success { order, voucher } => {
                println!("CONFIRMED order {} (total {})", order.id, order.total_price);
                if let Some(voucher) = voucher {
                    println!("Voucher: {}", voucher);
                }
            }
            Outcome::Failed => {
                eprintln!("Could not confirm payment for order {}", order_id);
                std::process::exit(1);
            }
            Outcome::Cancelled => unreachable!("one-shot flag is never cancelled"),
        }
        return;
    }

    let state = AppState::new(Arc::new(backend), PollSettings::default());

    let app = handlers::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Payconfirm listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
