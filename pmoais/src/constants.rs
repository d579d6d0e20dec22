//! Constants for the AIS client.
//!
//! Endpoint templates, device port and per-call timeouts. The provider
//! endpoints below are only defaults; `AisConfig` can replace any of them.

// ============================================================================
// Device
// ============================================================================

/// Port the speaker's HTTP API listens on, as a URL suffix
pub const DEVICE_PORT_SUFFIX: &str = ":8122";

/// Scheme prepended to bare host names
pub const DEFAULT_SCHEME: &str = "http://";

/// User-Agent installed once the gate info is known
///
/// No Authorization header is sent alongside it: the audiobook library and
/// the tune-in directory reject requests carrying the gate key.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_4) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/75.0.3770.100 Safari/537.36";

/// Default speaker host
pub const DEFAULT_HOST: &str = "ais-dom.local";

// ============================================================================
// Speaker endpoints (relative to the normalized base URL)
// ============================================================================

/// Text-to-speech path
pub const TTS_PATH: &str = "/text_to_speech";

/// Command path
pub const COMMAND_PATH: &str = "/command";

/// Audio status path
pub const AUDIO_STATUS_PATH: &str = "/audio_status";

// ============================================================================
// Provider endpoints
// ============================================================================

/// Audio type listing, parameterized by `{audio_nature}`
pub const AUDIO_TYPE_URL: &str = "https://powiedz.co/ords/dom/dom/audio_type?nature={audio_nature}";

/// Audio name lookup, parameterized by `{audio_nature}` and `{audio_type}`
pub const AUDIO_NAME_URL: &str =
    "https://powiedz.co/ords/dom/dom/audio_name?nature={audio_nature}&type={audio_type}";

/// Audiobook library catalogue
pub const AUDIOBOOKS_URL: &str = "https://wolnelektury.pl/api/audiobooks/?format=json";

/// Tune-in directory root
pub const TUNE_IN_URL: &str = "http://opml.radiotime.com/";

/// Metadata sharing endpoint
pub const AUDIO_INFO_URL: &str = "https://powiedz.co/ords/dom/dom/get_audio_full_info";

/// Query appended to audiobook lookups
pub const AUDIOBOOK_FORMAT_QUERY: &str = "?format=json";

/// Nature token for radio listings
pub const NATURE_RADIO: &str = "Radio";

/// Nature token for podcast listings
pub const NATURE_PODCAST: &str = "Podcast";

// ============================================================================
// Playlist unwinding
// ============================================================================

/// Prefix of the first entry in a `.pls` playlist
pub const PLS_ENTRY_PREFIX: &str = "File1=";

/// Prefix of the first entry in an `mms:` redirect document
pub const MMS_REF_PREFIX: &str = "Ref1=";

// ============================================================================
// Timeouts (milliseconds)
// ============================================================================

/// Gate info fetch
pub const GATE_TIMEOUT_MS: u64 = 8_000;

/// Speak and command calls
pub const COMMAND_TIMEOUT_MS: u64 = 8_000;

/// Audio status fetch
pub const STATUS_TIMEOUT_MS: u64 = 8_000;

/// Provider type listings
pub const LISTING_TIMEOUT_MS: u64 = 10_000;

/// Provider name lookups and podcast tracks
pub const NAME_TIMEOUT_MS: u64 = 8_000;

/// Each step of the stream resolution chain
pub const STREAM_TIMEOUT_MS: u64 = 7_000;

/// Metadata share and camera redirect
pub const SHARE_TIMEOUT_MS: u64 = 8_000;

