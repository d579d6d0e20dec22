//! Example: Make the speaker talk, then play a stream
//!
//! Run with: cargo run -p pmoais --example say_it -- 192.168.1.20 "Hello world"

use pmoais::AisClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "ais-dom.local".to_string());
    let text = args.next().unwrap_or_else(|| "Hello world".to_string());

    let client = AisClient::new(host)?;
    println!("Speaker: {}\n", client.base_url());

    match client.fetch_gate_info().await {
        Some(gate) => println!("Gate id: {}", gate.gate_id.as_deref().unwrap_or("-")),
        None => println!("Gate info unavailable, continuing without session headers"),
    }

    let answer = client.try_speak(&text).await?;
    println!("TTS answer: {}", answer);

    let answer = client
        .send_command("playAudio", "http://stream.open.fm/1")
        .await;
    println!("Command answer: {}", answer);

    if let Some(status) = client.fetch_audio_status().await {
        println!("\n=== Audio status ===");
        for (key, value) in status.0.iter() {
            println!("  {}: {}", key, value);
        }
    }

    Ok(())
}
