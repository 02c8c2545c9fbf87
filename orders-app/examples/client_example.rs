//! Client example demonstrating the full order lifecycle against a running
//! server: create an order, deliver a signed `payment.completed` webhook,
//! and watch the order become paid.
//!
//! Run with: cargo run -p orders-app --example client_example

use std::net::SocketAddr;

use tempfile::tempdir;
use tokio::net::TcpListener;

use orders_client::OrdersClient;
use orders_hex::{OrderService, inbound::HttpServer};
use orders_repo::build_repo;
use orders_repo::security::sign_webhook;
use orders_types::OrderStatus;

const WEBHOOK_SECRET: &str = "example_webhook_secret";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();
    drop(listener);

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("orders.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    println!("🚀 Starting server on port {port}...");
    println!("   Database: {db_url}");

    // Build repository (handles connection and migration)
    let repo = build_repo(&db_url).await?;

    // Start server in background
    let service = OrderService::new(repo, WEBHOOK_SECRET);
    let server = HttpServer::new(service);
    let router = server.router();

    let server_addr = format!("127.0.0.1:{port}");
    tokio::spawn(async move {
        axum::serve(
            TcpListener::bind(&server_addr).await.unwrap(),
            router.into_make_service(),
        )
        .await
        .unwrap();
    });

    // Wait for server to start
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    // Create client
    let base_url = format!("http://127.0.0.1:{port}");
    let client = OrdersClient::new(&base_url);

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: order lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    // Health check
    let health = client.health().await?;
    println!("✅ Server health: {health}");

    // Create an order for 1.5 tokens
    let order = client
        .create_order("1.5", serde_json::json!({"memo": "Premium"}))
        .await?;
    println!(
        "✅ Created order {} for {} tokens (status: {})",
        order.merchant_ref, order.amount, order.status
    );

    // Simulate the provider reporting the payment, signed with the shared secret
    let event = serde_json::json!({
        "event": "payment.completed",
        "paymentId": "PAY123",
        "merchantRef": order.merchant_ref.as_str(),
        "status": "paid",
    })
    .to_string();
    let signature = sign_webhook(event.as_bytes(), WEBHOOK_SECRET);

    let accepted = client.post_webhook(&event, &signature).await?;
    println!("✅ Webhook delivered, acknowledged: {accepted}");

    // Redeliver the same event - the gateway absorbs the replay
    let accepted_again = client.post_webhook(&event, &signature).await?;
    println!("✅ Webhook replayed, acknowledged: {accepted_again}");

    // Fetch the reconciled order
    let paid = client.get_order(order.merchant_ref.as_str()).await?;
    assert_eq!(paid.status, OrderStatus::Paid);
    println!(
        "✅ Order {} is now {} (provider payment {})",
        paid.merchant_ref,
        paid.status,
        paid.provider_payment_id.as_deref().unwrap_or("-")
    );

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
