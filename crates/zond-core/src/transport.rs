use async_trait::async_trait;
use tracing::debug;

/// Fixed collection endpoint every hit is sent to.
pub const COLLECT_ENDPOINT: &str = "https://ssl.google-analytics.com/collect";

/// Delivery capability: takes the assembled URL and emits it.
///
/// Implementations must not surface failures. A dropped hit is the designed
/// outcome of a failed send; there is no retry and no response handling.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, url: String);
}

/// GET-based transport over reqwest. The response is ignored.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: String) {
        if let Err(err) = self.client.get(&url).send().await {
            debug!("collect hit dropped: {err}");
        }
    }
}
