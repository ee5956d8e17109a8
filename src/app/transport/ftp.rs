//! Anonymous FTP transport
//!
//! The control connection is opened on first use and kept for the rest of
//! the session. Any failed command drops it, and the next call reconnects.

use std::io::{self, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};
use tracing::{debug, info, warn};
use url::Url;

use super::{join_remote, local_file_name, transfer_bar, PartialFile, Transport, TransportConfig};
use crate::app::fingerprint::{Fingerprint, StreamingFingerprint};
use crate::constants::remote;
use crate::errors::{TransportError, TransportResult};

/// Blocking FTP client for one remote root
pub struct FtpTransport {
    host: String,
    port: u16,
    root: String,
    username: String,
    password: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    stream: Option<FtpStream>,
}

impl FtpTransport {
    /// Prepare a transport for `url`; no connection is made yet
    ///
    /// Credentials embedded in the URL take precedence over the configured ones.
    pub fn new(url: &Url, config: &TransportConfig) -> TransportResult<Self> {
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| TransportError::InvalidUrl {
                url: url.to_string(),
                reason: "missing host".to_string(),
            })?
            .to_string();

        let username = if url.username().is_empty() {
            config.username.clone()
        } else {
            url.username().to_string()
        };
        let password = url
            .password()
            .map(str::to_string)
            .unwrap_or_else(|| config.password.clone());

        Ok(Self {
            host,
            port: url.port().unwrap_or(remote::FTP_PORT),
            root: url.path().to_string(),
            username,
            password,
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            stream: None,
        })
    }

    fn remote_path(&self, remote_path: &str) -> String {
        join_remote(&self.root, remote_path)
    }

    fn resolve_addr(&self) -> TransportResult<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| self.connect_error(e.to_string()))?
            .next()
            .ok_or_else(|| self.connect_error("host did not resolve to any address".to_string()))
    }

    fn connect_error(&self, reason: String) -> TransportError {
        TransportError::Connect {
            host: format!("{}:{}", self.host, self.port),
            reason,
        }
    }

    fn open(&self) -> TransportResult<FtpStream> {
        let addr = self.resolve_addr()?;
        debug!("Connecting to ftp://{}:{} ({})", self.host, self.port, addr);

        let mut stream = FtpStream::connect_timeout(addr, self.connect_timeout)
            .map_err(|e| self.connect_error(e.to_string()))?;
        stream
            .get_ref()
            .set_read_timeout(Some(self.read_timeout))
            .map_err(|e| self.connect_error(e.to_string()))?;
        stream
            .login(&self.username, &self.password)
            .map_err(|e| self.connect_error(format!("login failed: {}", e)))?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| self.connect_error(e.to_string()))?;

        info!("Connected to ftp://{}", self.host);
        Ok(stream)
    }

    fn session(&mut self) -> TransportResult<&mut FtpStream> {
        if let Some(stream) = self.stream.take() {
            return Ok(self.stream.insert(stream));
        }
        let stream = self.open()?;
        Ok(self.stream.insert(stream))
    }

    /// Run one command, dropping the connection if it fails
    fn with_session<T>(
        &mut self,
        path: &str,
        command: impl FnOnce(&mut FtpStream) -> Result<T, FtpError>,
    ) -> TransportResult<T> {
        let result = command(self.session()?);
        result.map_err(|source| {
            warn!("FTP command on {} failed, dropping connection", path);
            self.stream = None;
            TransportError::Ftp {
                path: path.to_string(),
                source,
            }
        })
    }
}

impl Transport for FtpTransport {
    fn describe(&self) -> String {
        format!("ftp://{}{}", self.host, self.root.trim_end_matches('/'))
    }

    fn probe_fingerprint(&mut self, remote_path: &str) -> TransportResult<Fingerprint> {
        let path = self.remote_path(remote_path);
        debug!("Fingerprinting ftp://{}/{}", self.host, path);

        let retr_path = path.clone();
        let fingerprint = self.with_session(&path, move |stream| {
            stream.retr(&retr_path, |reader| {
                let mut hasher = StreamingFingerprint::new();
                hasher
                    .consume_reader(reader)
                    .map_err(FtpError::ConnectionError)?;
                Ok(hasher.finish())
            })
        })?;

        debug!("Remote fingerprint of {}: {}", path, fingerprint);
        Ok(fingerprint)
    }

    fn download_to(
        &mut self,
        remote_path: &str,
        local_dir: &Path,
        show_progress: bool,
    ) -> TransportResult<PathBuf> {
        let path = self.remote_path(remote_path);
        let file_name = local_file_name(remote_path).to_string();

        // SIZE is optional on some servers; a missing size only downgrades the bar
        let total = self
            .session()?
            .size(&path)
            .ok()
            .map(|size| size as u64);

        let (partial, mut file) = PartialFile::create(local_dir, &file_name)?;
        let bar = transfer_bar(&file_name, total, show_progress);

        let retr_path = path.clone();
        let bytes = self.with_session(&path, |stream| {
            stream.retr(&retr_path, |reader| {
                let mut reader = bar.wrap_read(reader);
                io::copy(&mut reader, &mut file).map_err(FtpError::ConnectionError)
            })
        });
        bar.finish_and_clear();
        let bytes = bytes?;

        file.flush()
            .and_then(|_| file.sync_all())
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

impl Drop for FtpTransport {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.quit();
        }
    }
}
