//! Where feeds come from and how their bytes are read.
//!
//! [`FeedReader`] exposes a synchronous API. HTTP requests run on an owned
//! current-thread Tokio runtime, or on the caller's runtime through
//! [`tokio::task::block_in_place`] when invoked from a multi-threaded one.

use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use log::debug;
use reqwest::Client;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use crate::{FeedError, LinesDocument, Network, StopsDocument};

/// Default user agent for feed requests.
pub const DEFAULT_USER_AGENT: &str = "transit-engine/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A feed's address: an `http(s)` URL or a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    /// Fetched with an HTTP GET.
    Url(Url),
    /// Read from disk.
    File(Utf8PathBuf),
}

impl FromStr for FeedLocation {
    type Err = FeedError;

    fn from_str(location: &str) -> Result<Self, Self::Err> {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(location).map_err(|source| FeedError::InvalidUrl {
                location: location.to_owned(),
                source,
            })?;
            return Ok(Self::Url(url));
        }
        Ok(Self::File(Utf8PathBuf::from(location)))
    }
}

impl From<Url> for FeedLocation {
    fn from(url: Url) -> Self {
        Self::Url(url)
    }
}

impl From<&Utf8Path> for FeedLocation {
    fn from(path: &Utf8Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl fmt::Display for FeedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{path}"),
        }
    }
}

/// HTTP settings for [`FeedReader`].
#[derive(Debug, Clone)]
pub struct FeedReaderConfig {
    /// Applied to both connecting and the whole request.
    pub timeout: Duration,
    /// Sent with every request.
    pub user_agent: String,
}

impl Default for FeedReaderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl FeedReaderConfig {
    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Reads and decodes transit feeds from URLs or files.
///
/// # Examples
/// ```no_run
/// use transit_data::{FeedLocation, FeedReader};
///
/// # fn main() -> Result<(), transit_data::FeedError> {
/// let reader = FeedReader::new()?;
/// let stops: FeedLocation = "https://example.com/stops.json".parse()?;
/// let lines: FeedLocation = "feeds/lines.json".parse()?;
/// let network = reader.load_network(&stops, &lines)?;
/// println!("{} stops", network.stops.len());
/// # Ok(())
/// # }
/// ```
pub struct FeedReader {
    client: Client,
    runtime: Runtime,
}

impl fmt::Debug for FeedReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedReader")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl FeedReader {
    /// Build a reader with the default timeout and user agent.
    pub fn new() -> Result<Self, FeedError> {
        Self::with_config(&FeedReaderConfig::default())
    }

    /// Build a reader with explicit HTTP settings.
    pub fn with_config(config: &FeedReaderConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|source| FeedError::BuildClient { source })?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| FeedError::Runtime { source })?;
        Ok(Self { client, runtime })
    }

    /// Read the raw bytes behind `location`.
    pub fn read(&self, location: &FeedLocation) -> Result<Vec<u8>, FeedError> {
        debug!("reading feed from {location}");
        match location {
            FeedLocation::Url(url) => self.fetch(url),
            FeedLocation::File(path) => read_file(path),
        }
    }

    /// Read and decode a stops document.
    pub fn read_stops(&self, location: &FeedLocation) -> Result<StopsDocument, FeedError> {
        let bytes = self.read(location)?;
        StopsDocument::from_slice(&bytes, &location.to_string())
    }

    /// Read and decode a lines document.
    pub fn read_lines(&self, location: &FeedLocation) -> Result<LinesDocument, FeedError> {
        let bytes = self.read(location)?;
        LinesDocument::from_slice(&bytes, &location.to_string())
    }

    /// Read both documents and assemble them into a [`Network`].
    pub fn load_network(
        &self,
        stops: &FeedLocation,
        lines: &FeedLocation,
    ) -> Result<Network, FeedError> {
        let stops = self.read_stops(stops)?;
        let lines = self.read_lines(lines)?;
        Ok(Network::assemble(stops, lines))
    }

    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FeedError> {
        let future = self.fetch_async(url);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    async fn fetch_async(&self, url: &Url) -> Result<Vec<u8>, FeedError> {
        let fetch_error = |source| FeedError::Fetch {
            location: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                location: url.to_string(),
                status,
            });
        }
        let body = response.bytes().await.map_err(fetch_error)?;
        Ok(body.to_vec())
    }
}

fn read_file(path: &Utf8Path) -> Result<Vec<u8>, FeedError> {
    let read_error = |source| FeedError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(read_error)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_error)?;
    Ok(bytes)
}
