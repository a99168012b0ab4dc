use std::time::Duration;

use reqwest::{
    Client,
    header::{CONNECTION, HeaderMap, HeaderValue, USER_AGENT},
};

const GATEWAY_USER_AGENT: &str = concat!("dsp-ai-gateway/", env!("CARGO_PKG_VERSION"));

/// Client for upstream calls. The timeout covers the whole request, body included.
pub(super) fn upstream_client(timeout: Duration) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(USER_AGENT, HeaderValue::from_static(GATEWAY_USER_AGENT));

    Client::builder()
        .timeout(timeout)
        // Short idle timeout so upstream DNS changes are picked up.
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
        .build()
}
