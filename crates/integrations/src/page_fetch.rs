//! Fetches a page for the on-page analyzer.
//!
//! Redirects are followed by hand so that every hop passes the same
//! destination check as the first request: only `http`/`https`, and unless
//! private fetching is allowed, only hosts that resolve to public addresses.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use reqwest::{redirect, Url};

use crate::error::{ensure_success, IntegrationError};

/// Per-request timeout for page fetches.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest HTML body the analyzer will accept (5 MiB).
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

const USER_AGENT: &str = "RankforgeBot/1.0 (+https://rankforge.app/bot)";

/// A fetched HTML document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    allow_private: bool,
}

impl PageFetcher {
    /// Build a fetcher with its own redirect-free client. `allow_private`
    /// disables the public-address check (local development and tests).
    pub fn new(allow_private: bool) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            allow_private,
        })
    }

    /// Reject `url` unless it is `http`/`https` and, when private fetching is
    /// off, every address its host resolves to is public.
    pub async fn check_destination(&self, url: &str) -> Result<Url, IntegrationError> {
        let url = Url::parse(url)
            .map_err(|e| IntegrationError::Destination(format!("invalid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(IntegrationError::Destination(format!(
                "scheme '{}' is not allowed",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| IntegrationError::Destination("URL has no host".into()))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        if self.allow_private {
            return Ok(url);
        }

        let port = url.port_or_known_default().unwrap_or(80);
        let addrs: Vec<IpAddr> = match host.parse::<IpAddr>() {
            Ok(ip) => vec![ip],
            Err(_) => tokio::net::lookup_host((host.as_str(), port))
                .await
                .map_err(|e| {
                    IntegrationError::Destination(format!("cannot resolve host '{host}': {e}"))
                })?
                .map(|addr| addr.ip())
                .collect(),
        };
        if addrs.is_empty() {
            return Err(IntegrationError::Destination(format!(
                "host '{host}' has no addresses"
            )));
        }
        if let Some(ip) = addrs.iter().find(|ip| !is_public_ip(**ip)) {
            tracing::warn!(host = %host, %ip, "Refused fetch of non-public address");
            return Err(IntegrationError::Destination(format!(
                "host '{host}' resolves to a non-public address"
            )));
        }
        Ok(url)
    }

    /// GET `url`, requiring a 2xx `text/html` response no larger than
    /// [`MAX_BODY_BYTES`].
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, IntegrationError> {
        let mut current = self.check_destination(url).await?;
        let mut hops = 0;
        let response = loop {
            let response = self
                .client
                .get(current.clone())
                .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
                .send()
                .await?;
            if !response.status().is_redirection() {
                break response;
            }
            let Some(location) = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
            else {
                break response;
            };
            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(IntegrationError::Destination(format!(
                    "more than {MAX_REDIRECTS} redirects"
                )));
            }
            let next = current
                .join(location)
                .map_err(|e| IntegrationError::Destination(format!("bad redirect: {e}")))?;
            tracing::debug!(from = %current, to = %next, "Following page redirect");
            current = self.check_destination(next.as_str()).await?;
        };
        let mut response = ensure_success("page", response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_html(&content_type) {
            return Err(IntegrationError::UnsupportedContent(content_type));
        }
        if response
            .content_length()
            .is_some_and(|len| len as usize > MAX_BODY_BYTES)
        {
            return Err(IntegrationError::TooLarge(MAX_BODY_BYTES));
        }

        let final_url = response.url().to_string();
        let status = response.status().as_u16();

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(IntegrationError::TooLarge(MAX_BODY_BYTES));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchedPage {
            final_url,
            status,
            html: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Whether `ip` is a globally routable unicast address.
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_public_v4(v4),
            None => is_public_v6(v6),
        },
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    let shared = a == 100 && (64..128).contains(&b);
    !(ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_multicast()
        || ip.is_documentation()
        || shared
        || a == 0)
}

fn is_public_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    let unique_local = first & 0xfe00 == 0xfc00;
    let link_local = first & 0xffc0 == 0xfe80;
    !(ip.is_loopback() || ip.is_unspecified() || ip.is_multicast() || unique_local || link_local)
}

/// Whether a `Content-Type` header value denotes HTML.
pub fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
