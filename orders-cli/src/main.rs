//! Orders CLI
//!
//! Command-line interface for the purchase-order gateway API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use orders_client::OrdersClient;

#[derive(Parser)]
#[command(name = "orders")]
#[command(author, version, about = "Purchase-order gateway CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Orders API
    #[arg(long, env = "ORDERS_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Order operations
    Order {
        #[command(subcommand)]
        action: OrderCommands,
    },
    /// Webhook operations
    Webhook {
        #[command(subcommand)]
        action: WebhookCommands,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum OrderCommands {
    /// Create a new purchase order
    Create {
        /// Token amount, e.g. "1.5"
        amount: String,
        /// Optional memo stored in the order metadata
        #[arg(long)]
        memo: Option<String>,
    },
    /// Get order details
    Get {
        /// Merchant reference (PO-XXXXXXXXXX)
        reference: String,
    },
}

#[derive(Subcommand)]
enum WebhookCommands {
    /// Sign and send a payment.completed event (provider simulation)
    Send {
        /// Merchant reference the payment is for
        #[arg(long)]
        reference: String,
        /// Provider payment id to report
        #[arg(long, default_value = "PAY-LOCAL")]
        payment_id: String,
        /// Shared webhook secret to sign with
        #[arg(long, env = "PROVIDER_WEBHOOK_SECRET")]
        secret: String,
    },
    /// Start a local webhook listener that echoes deliveries
    Listen {
        /// Port to listen on
        #[arg(long, default_value = "3001")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = OrdersClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Order { action } => match action {
            OrderCommands::Create { amount, memo } => {
                let metadata = match memo {
                    Some(memo) => serde_json::json!({"memo": memo}),
                    None => serde_json::Value::Null,
                };
                let order = client.create_order(&amount, metadata).await?;
                println!("{}", serde_json::to_string_pretty(&order)?);
            }
            OrderCommands::Get { reference } => {
                let order = client.get_order(&reference).await?;
                println!("{}", serde_json::to_string_pretty(&order)?);
            }
        },

        Commands::Webhook { action } => match action {
            WebhookCommands::Send {
                reference,
                payment_id,
                secret,
            } => {
                let event = serde_json::json!({
                    "event": "payment.completed",
                    "paymentId": payment_id,
                    "merchantRef": reference,
                    "status": "paid",
                })
                .to_string();
                let signature = orders_repo::security::sign_webhook(event.as_bytes(), &secret);
                let accepted = client.post_webhook(&event, &signature).await?;
                if accepted {
                    println!("✓ Webhook acknowledged");
                } else {
                    println!("✗ Webhook rejected");
                    std::process::exit(1);
                }
            }
            WebhookCommands::Listen { port } => {
                let app =
                    axum::Router::new().route("/webhook", axum::routing::post(handle_webhook));
                let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
                println!("Listening for webhooks on {addr}");
                let listener = tokio::net::TcpListener::bind(&addr).await?;
                axum::serve(listener, app).await?;
            }
        },
    }

    Ok(())
}

async fn handle_webhook(
    headers: axum::http::HeaderMap,
    body: String,
) -> impl axum::response::IntoResponse {
    println!("POST /webhook HTTP/1.1");
    for (name, value) in &headers {
        println!("{}: {:?}", name, value);
    }
    println!();
    println!("{body}");
    println!("----------------------------------------");
    axum::http::StatusCode::OK
}
