use anyhow::Result;
use vibex_backend::ClientHandle;

pub async fn run_logout(client: &ClientHandle) -> Result<()> {
    if client.current_session().is_none() {
        println!("You are not logged in.");
        return Ok(());
    }

    client.sign_out()?;
    println!("✅ Successfully logged out.");

    Ok(())
}
