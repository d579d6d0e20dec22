//! AIS speaker client library for PMOMusic
//!
//! This crate talks to an AIS gate (the speaker, HTTP on port 8122) and to
//! the AIS provider backend, and resolves media identifiers into URLs the
//! speaker can play.
//!
//! # Features
//!
//! - **Gate**: Fetch the gate info and derive the session headers
//! - **Speaker control**: Text-to-speech, JSON commands, audio status
//! - **Browsing**: Audio type and audio name listings for radio, podcasts,
//!   audiobooks and tune-in
//! - **Stream resolution**: Unwind tune-in playlists (`.pls`, `mms:`) and
//!   spotify identifiers
//! - **Metadata sharing**: Push the title and artwork of what is playing to
//!   the other AIS clients
//!
//! Every network operation comes in two forms: `try_*` returns a typed
//! [`Result`], the plain form logs the failure and degrades to an empty or
//! last-known value.
//!
//! # Example
//!
//! ```no_run
//! use pmoais::AisClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AisClient::new("192.168.1.20")?;
//!
//!     // Session headers come from the gate info
//!     if let Some(gate) = client.fetch_gate_info().await {
//!         println!("Gate: {:?}", gate.gate_id);
//!     }
//!
//!     client.speak("Hello world").await;
//!
//!     let url = client
//!         .resolve_stream_url("ais_tunein/2/Jazz/http://opml.radiotime.com/Tune.ashx?id=s1")
//!         .await;
//!     client.send_command("playAudio", url).await;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! [`AisConfig`] reads an optional YAML file over embedded defaults, then
//! `PMOAIS_CONFIG__*` environment variables:
//!
//! ```no_run
//! use pmoais::{AisClient, AisConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = AisConfig::load(None)?;
//! let client = AisClient::builder().config(&config).build()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod content_id;
pub mod error;
pub mod models;
pub mod playlist;
pub mod resolver;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-exports
pub use client::{AisClient, ClientBuilder};
pub use config::{AisConfig, Endpoints, Timeouts};
pub use content_id::{AudioCategory, MediaContentId};
pub use error::{Error, Result};
pub use models::{AudioStatus, BrowseMedia, GateInfo, ProviderListing, ResolvedMedia};
pub use resolver::{ResolveStep, StreamResolution};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
