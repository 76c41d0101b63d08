//! HTTP client for the Telegram bot API

use crate::config::OutgoingSettings;
use anyhow::Result;
use reqwest::Client;
use std::time::Duration;

/// Build the bot API client with the configured timeouts and proxies.
///
/// Starts from teloxide's defaults; the request timeout must stay above the
/// long-polling timeout and cover audio uploads.
pub fn build_client(settings: &OutgoingSettings) -> Result<Client> {
    let mut builder = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs_f64(settings.request_timeout))
        .connect_timeout(Duration::from_secs_f64(settings.connect_timeout));

    // Proxy settings
    if let Some(ref proxy_url) = settings.proxies.all {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    } else {
        if let Some(ref http) = settings.proxies.http {
            builder = builder.proxy(reqwest::Proxy::http(http)?);
        }
        if let Some(ref https) = settings.proxies.https {
            builder = builder.proxy(reqwest::Proxy::https(https)?);
        }
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = build_client(&OutgoingSettings::default());
        assert!(client.is_ok());
    }
}
