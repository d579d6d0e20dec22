//! Stream URL resolution
//!
//! Turns a media content identifier into something the speaker can play:
//!
//! - `ais_tunein/a/b/<url>`: `<url>` is fetched and its first line taken as
//!   the stream reference. A `.pls` reference is fetched and replaced by its
//!   `File1=` entry; an `mms:` reference is rewritten to `http:`, fetched and
//!   replaced by its `Ref1=` entry.
//! - `ais_spotify/<id>`: `<id>`, no network call.
//! - anything else: returned unchanged.
//!
//! When the cached browse tree holds a node for the identifier (root or
//! direct child), its display metadata is shared with the other AIS clients
//! once the stream is resolved. That share never changes the result.
//!
//! # Example
//!
//! ```no_run
//! use pmoais::{AisClient, StreamResolution};
//!
//! # async fn example() -> pmoais::Result<()> {
//! let client = AisClient::new("ais-dom.local")?;
//! match client
//!     .resolve_stream("ais_tunein/2/Jazz/http://opml.radiotime.com/Tune.ashx?id=s1")
//!     .await?
//! {
//!     StreamResolution::Partial { reference, step, error } => {
//!         println!("stopped at {} on {}: {}", reference, step, error)
//!     }
//!     resolved => println!("play {}", resolved.url()),
//! }
//! # Ok(())
//! # }
//! ```

use crate::client::AisClient;
use crate::content_id::MediaContentId;
use crate::error::{Error, Result};
use crate::models::ResolvedMedia;
use crate::playlist;
use std::fmt;
use tracing::{debug, error, warn};

/// Follow-up step of the tune-in chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStep {
    /// Fetching a `.pls` playlist
    Playlist,
    /// Fetching the `http:` form of an `mms:` reference
    MmsRedirect,
}

impl fmt::Display for ResolveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playlist => f.write_str("pls playlist"),
            Self::MmsRedirect => f.write_str("mms redirect"),
        }
    }
}

/// Outcome of a stream resolution
#[derive(Debug)]
pub enum StreamResolution {
    /// Fully unwound (tune-in chain or spotify id)
    Resolved(String),
    /// Identifier returned as is
    Passthrough(String),
    /// A follow-up fetch failed; `reference` is the last extracted value
    Partial {
        reference: String,
        step: ResolveStep,
        error: Error,
    },
}

impl StreamResolution {
    /// Best URL available: resolved, passthrough or last partial reference
    pub fn url(&self) -> &str {
        match self {
            Self::Resolved(url) | Self::Passthrough(url) => url,
            Self::Partial { reference, .. } => reference,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            Self::Resolved(url) | Self::Passthrough(url) => url,
            Self::Partial { reference, .. } => reference,
        }
    }

    /// Whether the chain ran to its end
    pub fn is_complete(&self) -> bool {
        !matches!(self, Self::Partial { .. })
    }
}

impl AisClient {
    /// Resolve `media_content_id` into a playable URL
    ///
    /// Errors only when nothing could be extracted: a tune-in identifier
    /// without an embedded URL, or a failed first fetch. Failures further
    /// down the chain give [`StreamResolution::Partial`].
    pub async fn resolve_stream(&self, media_content_id: &str) -> Result<StreamResolution> {
        // taken before any I/O so a concurrent cache update cannot split it
        let node = self
            .browse_media()
            .await
            .and_then(|tree| tree.find(media_content_id).cloned());

        let resolution = match MediaContentId::parse(media_content_id) {
            MediaContentId::TuneIn(Some(url)) => self.unwind_tunein(&url).await?,
            MediaContentId::TuneIn(None) => {
                return Err(Error::MalformedContentId(media_content_id.to_string()))
            }
            MediaContentId::Spotify(id) => StreamResolution::Resolved(id),
            _ => StreamResolution::Passthrough(media_content_id.to_string()),
        };

        if let Some(node) = node {
            if resolution.is_complete() {
                let media = ResolvedMedia::from_node(&node, resolution.url());
                self.share_media_info(&media).await;
            }
        }

        Ok(resolution)
    }

    /// Resolve `media_content_id`, degrading instead of failing
    ///
    /// Returns the resolved URL, the last partial reference, or the
    /// identifier itself when nothing could be fetched.
    ///
    /// ```
    /// use pmoais::AisClient;
    ///
    /// # tokio_test::block_on(async {
    /// let client = AisClient::new("ais-dom.local").unwrap();
    /// assert_eq!(client.resolve_stream_url("ais_spotify/track123").await, "track123");
    /// assert_eq!(client.resolve_stream_url("http://x/a.mp3").await, "http://x/a.mp3");
    /// # });
    /// ```
    pub async fn resolve_stream_url(&self, media_content_id: &str) -> String {
        match self.resolve_stream(media_content_id).await {
            Ok(StreamResolution::Partial {
                reference,
                step,
                error,
            }) => {
                warn!(media_content_id, %step, "Partial stream resolution: {}", error);
                reference
            }
            Ok(resolution) => resolution.into_url(),
            Err(e) => {
                error!(media_content_id, "Error resolving stream: {}", e);
                media_content_id.to_string()
            }
        }
    }

    async fn unwind_tunein(&self, url: &str) -> Result<StreamResolution> {
        let body = self.fetch_stream_text(url).await?;
        let mut reference = playlist::first_line(&body);
        if reference.is_empty() {
            return Err(Error::parse(format!("empty tune-in answer from {}", url)));
        }
        debug!(reference = %reference, "Tune-in reference");

        if playlist::is_pls(&reference) {
            let entry = match self.fetch_stream_text(&reference).await {
                Ok(body) => playlist::pls_entry(&body),
                Err(e) => Err(e),
            };
            match entry {
                Ok(entry) => reference = entry,
                Err(error) => {
                    return Ok(StreamResolution::Partial {
                        reference,
                        step: ResolveStep::Playlist,
                        error,
                    })
                }
            }
        }

        if playlist::is_mms(&reference) {
            let entry = match self.fetch_stream_text(&playlist::mms_to_http(&reference)).await {
                Ok(body) => playlist::mms_entry(&body),
                Err(e) => Err(e),
            };
            match entry {
                Ok(entry) => reference = entry,
                Err(error) => {
                    return Ok(StreamResolution::Partial {
                        reference,
                        step: ResolveStep::MmsRedirect,
                        error,
                    })
                }
            }
        }

        Ok(StreamResolution::Resolved(reference))
    }

    /// Stream chain fetches carry no session headers
    async fn fetch_stream_text(&self, url: &str) -> Result<String> {
        self.get_text(url, self.timeouts().stream(), Vec::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AUDIO_INFO_URL, STREAM_TIMEOUT_MS};
    use crate::models::BrowseMedia;
    use crate::testing::ScriptedTransport;
    use std::sync::Arc;
    use std::time::Duration;

    const TUNE: &str = "http://opml.radiotime.com/Tune.ashx?id=s1";

    fn tunein_id(url: &str) -> String {
        format!("ais_tunein/2/Jazz/{}", url)
    }

    fn client_with(transport: Arc<ScriptedTransport>) -> AisClient {
        AisClient::builder()
            .host("ais-dom.local")
            .transport(transport)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_spotify_without_network() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with(transport.clone());

        assert_eq!(client.resolve_stream_url("ais_spotify/track123").await, "track123");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_identity_fallback() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with(transport.clone());

        for id in ["http://already/resolved.mp3", "ais_radio/Muzyka", "ais_spotify"] {
            let resolution = client.resolve_stream(id).await.unwrap();
            assert!(matches!(resolution, StreamResolution::Passthrough(_)));
            assert_eq!(resolution.url(), id);
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_tunein_direct_stream() {
        let transport = Arc::new(
            ScriptedTransport::new().respond(TUNE, 200, "http://y/live.mp3\nhttp://y/backup.mp3"),
        );
        let client = client_with(transport.clone());

        let resolution = client.resolve_stream(&tunein_id(TUNE)).await.unwrap();
        assert!(matches!(&resolution, StreamResolution::Resolved(url) if url == "http://y/live.mp3"));

        let sent = transport.requests_to(TUNE);
        assert_eq!(sent[0].timeout, Duration::from_millis(STREAM_TIMEOUT_MS));
        assert!(sent[0].headers.is_empty());
    }

    #[tokio::test]
    async fn test_tunein_pls_chain() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(TUNE, 200, "http://y/stream.pls")
                .respond("http://y/stream.pls", 200, "[playlist]\nFile1=http://z/audio.mp3"),
        );
        let client = client_with(transport);

        assert_eq!(
            client.resolve_stream_url(&tunein_id(TUNE)).await,
            "http://z/audio.mp3"
        );
    }

    #[tokio::test]
    async fn test_tunein_mms_chain() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(TUNE, 200, "mms://host/stream")
                .respond("http://host/stream", 200, "[Reference]\nRef1=http://host/stream.wma"),
        );
        let client = client_with(transport);

        assert_eq!(
            client.resolve_stream_url(&tunein_id(TUNE)).await,
            "http://host/stream.wma"
        );
    }

    #[tokio::test]
    async fn test_tunein_pls_then_mms() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(TUNE, 200, "http://y/stream.pls")
                .respond("http://y/stream.pls", 200, "[playlist]\nFile1=mms://host/live")
                .respond("http://host/live", 200, "[Reference]\nRef1=http://host/live.asf"),
        );
        let client = client_with(transport);

        let resolution = client.resolve_stream(&tunein_id(TUNE)).await.unwrap();
        assert!(resolution.is_complete());
        assert_eq!(resolution.url(), "http://host/live.asf");
    }

    #[tokio::test]
    async fn test_tunein_pls_failure_is_partial() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(TUNE, 200, "http://y/stream.pls")
                .respond("http://y/stream.pls", 404, ""),
        );
        let client = client_with(transport);

        let resolution = client.resolve_stream(&tunein_id(TUNE)).await.unwrap();
        match resolution {
            StreamResolution::Partial {
                reference,
                step,
                error,
            } => {
                assert_eq!(reference, "http://y/stream.pls");
                assert_eq!(step, ResolveStep::Playlist);
                assert!(error.is_http());
            }
            other => panic!("expected partial resolution, got {:?}", other),
        }

        assert_eq!(
            client.resolve_stream_url(&tunein_id(TUNE)).await,
            "http://y/stream.pls"
        );
    }

    #[tokio::test]
    async fn test_tunein_mms_failure_is_partial() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(TUNE, 200, "mms://host/stream")
                .respond("http://host/stream", 200, "single line"),
        );
        let client = client_with(transport);

        let resolution = client.resolve_stream(&tunein_id(TUNE)).await.unwrap();
        assert!(matches!(
            &resolution,
            StreamResolution::Partial { step: ResolveStep::MmsRedirect, error, .. } if error.is_parse()
        ));
        assert_eq!(resolution.url(), "mms://host/stream");
    }

    #[tokio::test]
    async fn test_tunein_first_fetch_failure() {
        let transport = Arc::new(ScriptedTransport::new().unreachable(TUNE));
        let client = client_with(transport);
        let id = tunein_id(TUNE);

        assert!(client.resolve_stream(&id).await.unwrap_err().is_network());
        assert_eq!(client.resolve_stream_url(&id).await, id);
    }

    #[tokio::test]
    async fn test_tunein_without_url() {
        let client = client_with(Arc::new(ScriptedTransport::new()));
        let err = client.resolve_stream("ais_tunein/2").await.unwrap_err();
        assert!(matches!(err, Error::MalformedContentId(_)));
    }

    #[tokio::test]
    async fn test_enrichment_shares_child_metadata() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(TUNE, 200, "http://y/live.mp3")
                .respond(AUDIO_INFO_URL, 200, "{}"),
        );
        let client = client_with(transport.clone());
        let id = tunein_id(TUNE);

        client
            .cache_browse_media(BrowseMedia::new("ais_tunein", "TuneIn").with_children(vec![
                BrowseMedia::new(id.clone(), "Jazz24")
                    .with_thumbnail("http://img/jazz24.png")
                    .with_media_class("music"),
            ]))
            .await;

        assert_eq!(client.resolve_stream_url(&id).await, "http://y/live.mp3");

        let shared = transport.requests_to(AUDIO_INFO_URL);
        assert_eq!(shared.len(), 1);
        let body = shared[0].json.clone().unwrap();
        assert_eq!(body["media_title"], "Jazz24");
        assert_eq!(body["media_source"], "Jazz24");
        assert_eq!(body["media_stream_image"], "http://img/jazz24.png");
        assert_eq!(body["media_album_name"], "music");
        assert_eq!(body["media_content_id"], "http://y/live.mp3");
    }

    #[tokio::test]
    async fn test_enrichment_failure_does_not_change_result() {
        let transport = Arc::new(ScriptedTransport::new().respond(AUDIO_INFO_URL, 500, ""));
        let client = client_with(transport.clone());

        client
            .cache_browse_media(BrowseMedia::new("ais_spotify/track123", "Song"))
            .await;

        assert_eq!(client.resolve_stream_url("ais_spotify/track123").await, "track123");
        assert_eq!(transport.requests_to(AUDIO_INFO_URL).len(), 1);
    }

    #[tokio::test]
    async fn test_no_enrichment_without_match_or_on_partial() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(TUNE, 200, "http://y/stream.pls")
                .respond(AUDIO_INFO_URL, 200, "{}"),
        );
        let client = client_with(transport.clone());
        let id = tunein_id(TUNE);

        client.cache_browse_media(BrowseMedia::new(id.clone(), "Jazz")).await;
        client.resolve_stream_url(&id).await;

        client.cache_browse_media(BrowseMedia::new("other", "Other")).await;
        client.resolve_stream_url("ais_spotify/abc").await;

        assert!(transport.requests_to(AUDIO_INFO_URL).is_empty());
    }
}
