//! HTTP client for the AIS speaker API
//!
//! [`AisClient`] is the session object: it owns the normalized speaker URL,
//! the headers installed by the gate info fetch, the last gate info and audio
//! status, and the browse-media tree used to enrich resolved streams.
//!
//! Every network operation exists in two forms:
//! - `try_*` returns a typed [`Result`] and never logs-and-swallows
//! - the plain form logs the failure and degrades to a fallback value
//!   (empty string, `None`, or the last known value)
//!
//! # Example
//!
//! ```no_run
//! use pmoais::AisClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AisClient::new("ais-dom.local")?;
//!
//!     if let Some(gate) = client.fetch_gate_info().await {
//!         println!("Gate: {:?}", gate.gate_id);
//!     }
//!
//!     let answer = client.speak("Hello world").await;
//!     println!("Speaker answered: {}", answer);
//!
//!     Ok(())
//! }
//! ```

use crate::config::{AisConfig, Endpoints, Timeouts};
use crate::constants::*;
use crate::content_id::{embedded_url, AudioCategory, MediaContentId};
use crate::error::{Error, Result};
use crate::models::{AudioStatus, BrowseMedia, GateInfo, ProviderListing, ResolvedMedia};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use url::Url;

/// Mutable session state
///
/// Each field is replaced wholesale, never merged: concurrent writers race
/// and the last one wins. A resolution snapshots the browse tree once, so a
/// concurrent `cache_browse_media` affects either all or none of it.
#[derive(Debug, Default)]
struct SessionState {
    gate_info: RwLock<Option<GateInfo>>,
    headers: RwLock<Vec<(String, String)>>,
    audio_status: RwLock<Option<AudioStatus>>,
    browse_media: RwLock<Option<BrowseMedia>>,
}

/// AIS speaker client
///
/// Cheap to clone; clones share the same session state.
#[derive(Clone)]
pub struct AisClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    user_agent: String,
    endpoints: Endpoints,
    timeouts: Timeouts,
    state: Arc<SessionState>,
}

impl fmt::Debug for AisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AisClient")
            .field("base_url", &self.base_url)
            .field("endpoints", &self.endpoints)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl AisClient {
    /// Create a client for `host` with default settings
    pub fn new(host: impl Into<String>) -> Result<Self> {
        Self::builder().host(host).build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Normalize a raw host into the speaker base URL
    ///
    /// Prepends `http://` when no scheme is present and appends `:8122` when
    /// it is not already the suffix. Idempotent.
    ///
    /// ```
    /// use pmoais::AisClient;
    ///
    /// assert_eq!(AisClient::normalize_base_url("ais-dom.local"), "http://ais-dom.local:8122");
    /// assert_eq!(AisClient::normalize_base_url("https://host:8122"), "https://host:8122");
    /// ```
    pub fn normalize_base_url(raw_host: &str) -> String {
        let mut url = raw_host.trim().trim_end_matches('/').to_string();

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            url = format!("{}{}", DEFAULT_SCHEME, url);
        }

        if !url.ends_with(DEVICE_PORT_SUFFIX) {
            url.push_str(DEVICE_PORT_SUFFIX);
        }

        url
    }

    /// Get the normalized base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the provider endpoints in use
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Get the per-call timeouts in use
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    // ========================================================================
    // Session state
    // ========================================================================

    /// Last successfully fetched gate info
    pub async fn gate_info(&self) -> Option<GateInfo> {
        self.state.gate_info.read().await.clone()
    }

    /// Headers sent to the speaker and providers; empty until the gate info
    /// has been fetched once
    pub async fn headers(&self) -> Vec<(String, String)> {
        self.state.headers.read().await.clone()
    }

    /// Last successfully fetched audio status, without any I/O
    pub async fn audio_status(&self) -> Option<AudioStatus> {
        self.state.audio_status.read().await.clone()
    }

    /// Currently cached browse-media tree
    pub async fn browse_media(&self) -> Option<BrowseMedia> {
        self.state.browse_media.read().await.clone()
    }

    /// Replace the cached browse-media tree
    pub async fn cache_browse_media(&self, tree: BrowseMedia) {
        debug!(media_content_id = %tree.media_content_id, "Caching browse media");
        *self.state.browse_media.write().await = Some(tree);
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    /// Execute a request, bounded by its own timeout
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let limit = request.timeout;
        match tokio::time::timeout(limit, self.transport.execute(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        }
    }

    /// GET returning the body text of a 200 answer
    pub(crate) async fn get_text(
        &self,
        url: &str,
        timeout: Duration,
        headers: Vec<(String, String)>,
    ) -> Result<String> {
        let request = HttpRequest::get(url, timeout).with_headers(headers);
        Ok(self.send(request).await?.ensure_success(url)?.text())
    }

    async fn get_listing(&self, url: &str, timeout: Duration, text: bool) -> Result<ProviderListing> {
        let request = HttpRequest::get(url, timeout).with_headers(self.headers().await);
        let response = self.send(request).await?.ensure_success(url)?;

        if text {
            Ok(ProviderListing::Text(response.text()))
        } else {
            Ok(ProviderListing::Json(response.json()?))
        }
    }

    async fn post_json(&self, url: &str, body: Value, timeout: Duration) -> Result<HttpResponse> {
        let request = HttpRequest::post_json(url, body, timeout).with_headers(self.headers().await);
        self.send(request).await?.ensure_success(url)
    }

    // ========================================================================
    // Gate
    // ========================================================================

    /// Fetch the gate info and install the session headers
    ///
    /// On failure the previously cached gate info and headers are untouched.
    pub async fn try_fetch_gate_info(&self) -> Result<GateInfo> {
        let request = HttpRequest::get(&self.base_url, self.timeouts.gate());
        let response = self.send(request).await?.ensure_success(&self.base_url)?;
        let raw: Value = response.json()?;

        let info = GateInfo::from_response(raw, &self.base_url)?;

        // No Authorization header: the audiobook and tune-in endpoints refuse it
        *self.state.headers.write().await =
            vec![("User-Agent".to_string(), self.user_agent.clone())];
        *self.state.gate_info.write().await = Some(info.clone());

        info!(gate_id = ?info.gate_id, url = %self.base_url, "Gate info fetched");
        Ok(info)
    }

    /// Fetch the gate info, `None` on failure
    pub async fn fetch_gate_info(&self) -> Option<GateInfo> {
        match self.try_fetch_gate_info().await {
            Ok(info) => Some(info),
            Err(e) => {
                error!(url = %self.base_url, "Error fetching gate info from AIS: {}", e);
                None
            }
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Ask the speaker to read `text` aloud
    pub async fn try_speak(&self, text: &str) -> Result<String> {
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, TTS_PATH), &[("text", text)])?;
        self.get_text(url.as_str(), self.timeouts.command(), self.headers().await)
            .await
    }

    /// Ask the speaker to read `text` aloud, empty string on failure
    pub async fn speak(&self, text: &str) -> String {
        self.try_speak(text).await.unwrap_or_else(|e| {
            error!("Error sending text to AIS: {}", e);
            String::new()
        })
    }

    /// POST `{command: value}` to the command endpoint
    pub async fn try_send_command(&self, command: &str, value: impl Into<Value>) -> Result<String> {
        let url = format!("{}{}", self.base_url, COMMAND_PATH);
        let mut body = Map::new();
        body.insert(command.to_string(), value.into());

        debug!(command, "Sending command");
        let response = self
            .post_json(&url, Value::Object(body), self.timeouts.command())
            .await?;
        Ok(response.text())
    }

    /// POST `{command: value}`, empty string on failure
    pub async fn send_command(&self, command: &str, value: impl Into<Value>) -> String {
        self.try_send_command(command, value)
            .await
            .unwrap_or_else(|e| {
                error!(command, "Error sending command to AIS: {}", e);
                String::new()
            })
    }

    // ========================================================================
    // Audio status
    // ========================================================================

    /// Fetch the audio status and replace the cached one
    pub async fn try_fetch_audio_status(&self) -> Result<AudioStatus> {
        let url = format!("{}{}", self.base_url, AUDIO_STATUS_PATH);
        let response = self
            .send(HttpRequest::get(&url, self.timeouts.status()))
            .await?
            .ensure_success(&url)?;
        let status: AudioStatus = response.json()?;

        *self.state.audio_status.write().await = Some(status.clone());
        Ok(status)
    }

    /// Fetch the audio status; on failure return the last known one
    pub async fn fetch_audio_status(&self) -> Option<AudioStatus> {
        match self.try_fetch_audio_status().await {
            Ok(status) => Some(status),
            Err(e) => {
                error!("Error fetching audio status from AIS: {}", e);
                self.audio_status().await
            }
        }
    }

    // ========================================================================
    // Provider listings
    // ========================================================================

    /// Top-level listing for one of the four sentinels
    /// (`ais_radio`, `ais_podcast`, `ais_audio_books`, `ais_tunein`)
    ///
    /// Anything else is [`Error::UnknownProvider`], without network I/O.
    pub async fn try_audio_type(&self, media_content_id: &str) -> Result<ProviderListing> {
        let category: AudioCategory = media_content_id.parse()?;

        let url = match category {
            AudioCategory::Radio => self.endpoints.audio_type_url(NATURE_RADIO),
            AudioCategory::Podcast => self.endpoints.audio_type_url(NATURE_PODCAST),
            AudioCategory::AudioBooks => self.endpoints.audiobooks.clone(),
            AudioCategory::TuneIn => self.endpoints.tunein.clone(),
        };

        debug!(%category, url = %url, "Fetching audio type listing");
        self.get_listing(&url, self.timeouts.listing(), category.is_text())
            .await
    }

    /// Top-level listing, `None` on failure
    pub async fn audio_type(&self, media_content_id: &str) -> Option<ProviderListing> {
        self.try_audio_type(media_content_id)
            .await
            .map_err(|e| error!(media_content_id, "Error fetching audio type: {}", e))
            .ok()
    }

    /// Provider URL of a name lookup
    pub fn audio_name_url(&self, media_content_id: &str) -> Result<String> {
        let malformed = || Error::MalformedContentId(media_content_id.to_string());

        match MediaContentId::parse(media_content_id) {
            MediaContentId::Radio(audio_type) => {
                let audio_type = audio_type.ok_or_else(malformed)?;
                Ok(self.endpoints.audio_name_url(NATURE_RADIO, &audio_type))
            }
            MediaContentId::Podcast(audio_type) => {
                let audio_type = audio_type.ok_or_else(malformed)?;
                Ok(self.endpoints.audio_name_url(NATURE_PODCAST, &audio_type))
            }
            MediaContentId::AudioBook(url) => {
                let url = url.ok_or_else(malformed)?;
                Ok(format!("{}{}", url, AUDIOBOOK_FORMAT_QUERY))
            }
            MediaContentId::TuneIn(url) => url.ok_or_else(malformed),
            MediaContentId::Spotify(_) | MediaContentId::Other(_) => {
                Err(Error::UnknownProvider(media_content_id.to_string()))
            }
        }
    }

    /// Second-level listing for a radio/podcast sub-type, an audiobook or a
    /// tune-in directory entry
    pub async fn try_audio_name(&self, media_content_id: &str) -> Result<ProviderListing> {
        let url = self.audio_name_url(media_content_id)?;
        let text = MediaContentId::parse(media_content_id).category() == Some(AudioCategory::TuneIn);

        debug!(media_content_id, url = %url, "Fetching audio name listing");
        self.get_listing(&url, self.timeouts.name(), text).await
    }

    /// Second-level listing, `None` on failure
    pub async fn audio_name(&self, media_content_id: &str) -> Option<ProviderListing> {
        self.try_audio_name(media_content_id)
            .await
            .map_err(|e| error!(media_content_id, "Error fetching audio name: {}", e))
            .ok()
    }

    /// Raw podcast feed behind the URL embedded in `media_content_id`
    pub async fn try_podcast_tracks(&self, media_content_id: &str) -> Result<String> {
        let url = embedded_url(media_content_id)
            .ok_or_else(|| Error::MalformedContentId(media_content_id.to_string()))?;
        self.get_text(&url, self.timeouts.name(), Vec::new()).await
    }

    /// Raw podcast feed, `None` on failure
    pub async fn podcast_tracks(&self, media_content_id: &str) -> Option<String> {
        self.try_podcast_tracks(media_content_id)
            .await
            .map_err(|e| error!(media_content_id, "Error fetching podcast tracks: {}", e))
            .ok()
    }

    // ========================================================================
    // Sharing
    // ========================================================================

    /// Share display metadata with the other AIS clients
    pub async fn try_share_media_info(&self, media: &ResolvedMedia) -> Result<Value> {
        let body = serde_json::to_value(media)?;
        let response = self
            .post_json(&self.endpoints.audio_info, body, self.timeouts.share())
            .await?;
        response.json()
    }

    /// Best-effort metadata share; failures are logged at debug level only
    pub async fn share_media_info(&self, media: &ResolvedMedia) -> Option<Value> {
        self.try_share_media_info(media)
            .await
            .map_err(|e| debug!("Error sharing media info with AIS: {}", e))
            .ok()
    }

    /// Ask another speaker to show a camera stream
    ///
    /// `speaker_url` is used as given, without normalization.
    pub async fn try_redirect_camera_stream(
        &self,
        speaker_url: &str,
        stream_source: &str,
        camera_id: &str,
    ) -> Result<Value> {
        let url = format!("{}{}", speaker_url, COMMAND_PATH);
        let body = json!({
            "showCamera": {
                "streamUrl": stream_source,
                "haCamId": camera_id,
            }
        });
        let response = self.post_json(&url, body, self.timeouts.share()).await?;
        response.json()
    }

    /// Best-effort camera redirect; failures are logged at debug level only
    pub async fn redirect_camera_stream(
        &self,
        speaker_url: &str,
        stream_source: &str,
        camera_id: &str,
    ) -> Option<Value> {
        self.try_redirect_camera_stream(speaker_url, stream_source, camera_id)
            .await
            .map_err(|e| debug!(speaker_url, "Error redirecting camera stream: {}", e))
            .ok()
    }
}

/// Builder for configuring an AisClient
pub struct ClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    client: Option<reqwest::Client>,
    host: String,
    user_agent: String,
    endpoints: Endpoints,
    timeouts: Timeouts,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("host", &self.host)
            .field("user_agent", &self.user_agent)
            .field("endpoints", &self.endpoints)
            .field("timeouts", &self.timeouts)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            transport: None,
            client: None,
            host: DEFAULT_HOST.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoints: Endpoints::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every setting from a loaded configuration
    pub fn config(mut self, config: &AisConfig) -> Self {
        self.host = config.host.clone();
        self.user_agent = config.user_agent.clone();
        self.endpoints = config.endpoints.clone();
        self.timeouts = config.timeouts;
        self
    }

    /// Set the speaker host (normalized at build time)
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the provider endpoints
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the per-call timeouts
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Use a custom reqwest client
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Use a custom transport; takes precedence over [`ClientBuilder::client`]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<AisClient> {
        let transport: Arc<dyn Transport> = match (self.transport, self.client) {
            (Some(transport), _) => transport,
            (None, Some(client)) => Arc::new(ReqwestTransport::with_client(client)),
            (None, None) => Arc::new(ReqwestTransport::new()?),
        };

        Ok(AisClient {
            transport,
            base_url: AisClient::normalize_base_url(&self.host),
            user_agent: self.user_agent,
            endpoints: self.endpoints,
            timeouts: self.timeouts,
            state: Arc::new(SessionState::default()),
        })
    }
}
