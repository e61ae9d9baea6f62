use std::io::{self, Write};

use anyhow::Result;
use vibex_backend::ClientHandle;

fn prompt(question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

pub async fn run_login(client: &ClientHandle, provider: &str, redirect_to: &str) -> Result<()> {
    // Check if already logged in
    if client.current_session().is_some() {
        println!("⚠️  You are already logged in.");
        println!("Re-authenticating will replace your current session.\n");

        let answer =
            prompt("Do you want to continue with re-authentication? [y/N]: ")?.to_lowercase();
        if answer != "y" && answer != "yes" {
            println!("Authentication cancelled. Your existing session remains active.");
            return Ok(());
        }

        println!("Removing existing session...");
        client.sign_out()?;
    }

    println!("🔐 Starting sign-in with {}...\n", provider);

    let authorize_url = client.start_sign_in(provider, redirect_to)?;

    // Default to yes if user just presses Enter
    let answer = prompt("Open sign-in page in browser? [Y/n]: ")?.to_lowercase();
    if answer.is_empty() || answer == "y" || answer == "yes" {
        println!("🌐 Opening sign-in page in your browser...");
        if open::that(&authorize_url).is_err() {
            println!("⚠️  Could not open browser automatically.");
        }
    }

    println!("Please complete sign-in in your browser:");
    println!("\n{}\n", authorize_url);
    println!("After signing in you are redirected to {}.", redirect_to);
    println!("Copy the full URL from the address bar and paste it below.\n");

    let pasted = prompt("Paste the callback URL here: ")?;

    match client.detect_session_in_url(&pasted).await? {
        Some(session) => {
            let who = session.user_email.as_deref().unwrap_or("your account");
            println!("\n✅ Successfully signed in as {}!", who);
            Ok(())
        }
        None => anyhow::bail!("No authorization code found in the pasted URL"),
    }
}
