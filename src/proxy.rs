//! Proxy connection strings.
//!
//! A proxy is given on the command line as a single connection string
//! (`scheme://[user[:pass]@]host:port`). It is parsed once during option
//! resolution so that malformed input is rejected before any request.

use std::fmt;
use std::str::FromStr;

use reqwest::Proxy as ReqwestProxy;
use url::Url;

use crate::error::ConfigError;
use crate::{Result, SearchError};

/// Proxy protocol type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProxyProtocol {
    /// HTTP proxy
    #[default]
    Http,
    /// HTTPS proxy
    Https,
    /// SOCKS5 proxy
    Socks5,
}

impl ProxyProtocol {
    fn scheme(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Socks5 => "socks5",
        }
    }

    fn default_port(self) -> u16 {
        match self {
            Self::Http | Self::Https => 8080,
            Self::Socks5 => 1080,
        }
    }
}

/// A parsed proxy connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyDescriptor {
    /// Proxy host (IP or domain)
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Proxy protocol
    pub protocol: ProxyProtocol,
    /// Optional username for authentication
    pub username: Option<String>,
    /// Optional password for authentication
    pub password: Option<String>,
}

impl ProxyDescriptor {
    /// Creates a new HTTP proxy descriptor.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            protocol: ProxyProtocol::Http,
            username: None,
            password: None,
        }
    }

    /// Sets the proxy protocol.
    pub fn with_protocol(mut self, protocol: ProxyProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Sets authentication credentials.
    pub fn with_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    /// Parses a `scheme://[user[:pass]@]host[:port]` connection string.
    ///
    /// The port defaults to 8080 for HTTP(S) and 1080 for SOCKS5.
    pub fn parse(input: &str) -> std::result::Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidProxy {
            proxy: input.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(input.trim()).map_err(|e| invalid(&e.to_string()))?;

        let protocol = match url.scheme() {
            "http" => ProxyProtocol::Http,
            "https" => ProxyProtocol::Https,
            "socks5" | "socks5h" => ProxyProtocol::Socks5,
            scheme => return Err(invalid(&format!("unsupported protocol '{}'", scheme))),
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?;

        if url.path() != "/" && !url.path().is_empty() {
            return Err(invalid("unexpected path after host"));
        }

        // `Url` drops a port equal to the scheme default, so look at the raw input too.
        let port = match url.port() {
            Some(port) => port,
            None if has_explicit_port(input) => url
                .port_or_known_default()
                .unwrap_or(protocol.default_port()),
            None => protocol.default_port(),
        };
        let mut proxy = Self::new(host, port).with_protocol(protocol);

        if !url.username().is_empty() {
            let username = urlencoding::decode(url.username())
                .map_err(|_| invalid("username is not valid UTF-8"))?
                .into_owned();
            let password = match url.password() {
                Some(p) => Some(
                    urlencoding::decode(p)
                        .map_err(|_| invalid("password is not valid UTF-8"))?
                        .into_owned(),
                ),
                None => None,
            };
            proxy = proxy.with_auth(username, password);
        }

        Ok(proxy)
    }

    /// Returns the proxy URL string, credentials included.
    pub fn url(&self) -> String {
        let scheme = self.protocol.scheme();
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!(
                "{}://{}:{}@{}:{}",
                scheme,
                urlencoding::encode(user),
                urlencoding::encode(pass),
                self.host,
                self.port
            ),
            (Some(user), None) => format!(
                "{}://{}@{}:{}",
                scheme,
                urlencoding::encode(user),
                self.host,
                self.port
            ),
            _ => format!("{}://{}:{}", scheme, self.host, self.port),
        }
    }

    /// Returns the proxy address without credentials, suitable for
    /// browser `--proxy-server` flags and logs.
    pub fn server(&self) -> String {
        format!("{}://{}:{}", self.protocol.scheme(), self.host, self.port)
    }

    /// Builds the reqwest proxy layer for this descriptor.
    pub fn to_reqwest(&self) -> Result<ReqwestProxy> {
        ReqwestProxy::all(self.url())
            .map_err(|e| SearchError::Transport(format!("Failed to create proxy: {}", e)))
    }
}

fn has_explicit_port(input: &str) -> bool {
    let authority = input
        .split_once("://")
        .map_or(input, |(_, rest)| rest)
        .split('/')
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    match host_port.rsplit_once(':') {
        Some((host, port)) => {
            !host.ends_with('[') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

impl FromStr for ProxyDescriptor {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.server())
    }
}
