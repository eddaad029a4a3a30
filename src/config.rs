//! Compiled-in settings
//!
//! Nothing here is read from disk or the environment. Tests build their own
//! `Config` to point the search client at a mock server or the download
//! driver at a fake executable.

use std::time::Duration;

pub const SEARCH_ENDPOINT: &str = "https://music.youtube.com/youtubei/v1/search?prettyPrint=false";
pub const CLIENT_NAME: &str = "WEB_REMIX";
pub const CLIENT_VERSION: &str = "1.20231220.01.00";
/// Request parameter token selecting the "albums and EPs" result category.
pub const ALBUM_SEARCH_PARAMS: &str = "EgWKAQIYAWoQEAkQAxAEEAoQBRAQEBUQEQ==";
pub const USER_AGENT: &str = "Mozilla/5.0";
pub const PLAYLIST_URL_PREFIX: &str = "https://music.youtube.com/playlist?list=";

pub const DOWNLOADER_PROGRAM: &str = "yt-dlp";
pub const TRANSCODER_PROGRAM: &str = "ffmpeg";
pub const AUDIO_FORMAT: &str = "bestaudio";
pub const REMUX_FORMAT: &str = "opus";
pub const OUTPUT_TEMPLATE: &str = "%(artists.0)s - %(title)s.%(ext)s";

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub endpoint: String,
    pub client_name: String,
    pub client_version: String,
    pub params: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: SEARCH_ENDPOINT.to_string(),
            client_name: CLIENT_NAME.to_string(),
            client_version: CLIENT_VERSION.to_string(),
            params: ALBUM_SEARCH_PARAMS.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DownloadConfig {
    pub program: String,
    /// Passed ahead of the generated arguments
    pub extra_args: Vec<String>,
    pub transcoder: String,
    pub format: String,
    pub remux: String,
    pub output_template: String,
    pub progress_interval: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            program: DOWNLOADER_PROGRAM.to_string(),
            extra_args: Vec::new(),
            transcoder: TRANSCODER_PROGRAM.to_string(),
            format: AUDIO_FORMAT.to_string(),
            remux: REMUX_FORMAT.to_string(),
            output_template: OUTPUT_TEMPLATE.to_string(),
            progress_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub search: SearchConfig,
    pub download: DownloadConfig,
    pub playlist_url_prefix: String,
    pub tick_interval: Duration,
    /// Height of the inline live area at the bottom of the terminal.
    pub viewport_height: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            download: DownloadConfig::default(),
            playlist_url_prefix: PLAYLIST_URL_PREFIX.to_string(),
            tick_interval: Duration::from_millis(100),
            viewport_height: 4,
        }
    }
}
