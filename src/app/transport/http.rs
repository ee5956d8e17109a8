//! HTTP(S) mirror transport
//!
//! WorldPop also serves the FTP tree over HTTPS; this transport maps remote
//! paths onto that mirror with a blocking reqwest client.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use reqwest::blocking::{Client, Response};
use tracing::{debug, info};
use url::Url;

use super::{local_file_name, transfer_bar, PartialFile, Transport, TransportConfig};
use crate::app::fingerprint::{Fingerprint, StreamingFingerprint};
use crate::constants::remote;
use crate::errors::{TransportError, TransportResult};

/// Blocking HTTP client for one mirror root
pub struct HttpTransport {
    base: Url,
    client: Client,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    pub fn new(base: Url, config: &TransportConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .user_agent(remote::USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()
            .map_err(|source| TransportError::Http {
                url: base.to_string(),
                source,
            })?;

        // Anonymous is an FTP convention; only send real credentials
        let credentials = (!config.password.is_empty())
            .then(|| (config.username.clone(), config.password.clone()));

        Ok(Self {
            base,
            client,
            credentials,
        })
    }

    fn file_url(&self, remote_path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            remote_path.trim_start_matches('/')
        )
    }

    fn get(&self, url: &str) -> TransportResult<Response> {
        debug!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().map_err(|source| TransportError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::ServerStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn describe(&self) -> String {
        self.base.as_str().trim_end_matches('/').to_string()
    }

    fn probe_fingerprint(&mut self, remote_path: &str) -> TransportResult<Fingerprint> {
        let url = self.file_url(remote_path);
        let response = self.get(&url)?;

        let mut hasher = StreamingFingerprint::new();
        hasher
            .consume_reader(response)
            .map_err(|source| TransportError::Io {
                path: PathBuf::from(&url),
                source,
            })?;
        Ok(hasher.finish())
    }

    fn download_to(
        &mut self,
        remote_path: &str,
        local_dir: &Path,
        show_progress: bool,
    ) -> TransportResult<PathBuf> {
        let url = self.file_url(remote_path);
        let file_name = local_file_name(remote_path).to_string();
        let response = self.get(&url)?;

        let (partial, mut file) = PartialFile::create(local_dir, &file_name)?;
        let bar = transfer_bar(&file_name, response.content_length(), show_progress);

        let mut reader = bar.wrap_read(response);
        let copied = io::copy(&mut reader, &mut file);
        bar.finish_and_clear();

        let bytes = copied
            .and_then(|bytes| file.flush().map(|_| bytes))
            .and_then(|bytes| file.sync_all().map(|_| bytes))
            .map_err(|source| TransportError::Io {
                path: partial.temp_path().to_path_buf(),
                source,
            })?;
        drop(file);

        let final_path = partial.commit()?;
        info!("Downloaded {} ({} bytes)", final_path.display(), bytes);
        Ok(final_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_joins_with_single_slash() {
        let base = Url::parse("https://data.worldpop.org/").unwrap();
        let http = HttpTransport::new(base, &TransportConfig::default()).unwrap();
        assert_eq!(
            http.file_url("/assets/wpgpDatasets.csv"),
            "https://data.worldpop.org/assets/wpgpDatasets.csv"
        );
        assert_eq!(http.describe(), "https://data.worldpop.org");
    }

    #[test]
    fn test_anonymous_login_sends_no_credentials() {
        let base = Url::parse("https://data.worldpop.org/mirror").unwrap();
        let http = HttpTransport::new(base, &TransportConfig::default()).unwrap();
        assert!(http.credentials.is_none());
        assert_eq!(
            http.file_url("GIS/a.tif"),
            "https://data.worldpop.org/mirror/GIS/a.tif"
        );
    }
}
