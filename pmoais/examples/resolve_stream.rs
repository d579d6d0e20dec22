//! Example: Resolve a media content identifier into a playable URL
//!
//! Run with:
//! cargo run -p pmoais --example resolve_stream -- "ais_tunein/2/Jazz/http://opml.radiotime.com/Tune.ashx?id=s1"

use pmoais::{AisClient, AisConfig, StreamResolution};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let ids: Vec<String> = std::env::args().skip(1).collect();
    if ids.is_empty() {
        eprintln!("usage: resolve_stream <media_content_id>...");
        return Ok(());
    }

    let config = AisConfig::load(None)?;
    let client = AisClient::builder().config(&config).build()?;

    for id in &ids {
        println!("{}", id);
        match client.resolve_stream(id).await {
            Ok(StreamResolution::Resolved(url)) => println!("  resolved:    {}", url),
            Ok(StreamResolution::Passthrough(url)) => println!("  passthrough: {}", url),
            Ok(StreamResolution::Partial {
                reference,
                step,
                error,
            }) => println!("  partial:     {} ({} failed: {})", reference, step, error),
            Err(e) => println!("  failed:      {}", e),
        }
    }

    Ok(())
}
