use vibex_backend::ClientHandle;

/// Run the connectivity probe; returns whether the backend answered
pub async fn run_check(client: &ClientHandle) -> bool {
    println!("🔗 Checking connection to {}...", client.config().url());

    let status = client.check_connection().await;
    if status.is_ok() {
        println!("✅ Backend reachable");
    } else {
        println!(
            "❌ Backend check failed: {}",
            status.message().unwrap_or("unknown error")
        );
    }

    status.is_ok()
}
