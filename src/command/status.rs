use anyhow::Result;
use vibex_backend::ClientHandle;

pub async fn run_status(client: &ClientHandle) -> Result<()> {
    let options = client.options();
    let auth = options.auth();

    println!("Backend: {}", client.config().url());
    println!("   Anon key: set");
    println!("   Flow type: {}", auth.flow_type().as_str());
    println!("   Auto refresh token: {}", auth.auto_refresh_token());
    println!("   Persist session: {}", auth.persist_session());
    println!("   Detect session in URL: {}", auth.detect_session_in_url());
    for (name, value) in options.global().headers() {
        println!("   Header {}: {}", name, value);
    }
    println!(
        "   Realtime: {} events/s per channel",
        options.realtime().events_per_second()
    );
    if let Ok(mut endpoint) = client.realtime_endpoint() {
        endpoint.set_query(None);
        println!("   Realtime endpoint: {}", endpoint);
    }

    match client.current_session() {
        Some(session) => {
            let who = session
                .user_email
                .as_deref()
                .or(session.user_id.as_deref())
                .unwrap_or("unknown user");
            if session.is_expired() {
                println!("⚠️  Session for {} expired at {}", who, session.expires_at);
            } else {
                println!("✅ Logged in as {}", who);
                println!("   Expires at: {}", session.expires_at);
            }
        }
        None => {
            println!("❌ Not logged in");
            println!("   Run 'vibex login' to authenticate.");
        }
    }

    Ok(())
}
