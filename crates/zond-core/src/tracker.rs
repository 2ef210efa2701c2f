use std::mem;
use std::sync::{Arc, Mutex};

use rand::Rng;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client_id::get_or_create_client_id;
use crate::config::TrackerConfig;
use crate::environment::{Environment, HostEnvironment};
use crate::error::{Result, ZondError};
use crate::payload::Payload;
use crate::prefs::{FilePrefStore, PrefStore};
use crate::transport::{COLLECT_ENDPOINT, HttpTransport, Transport};

/// Protocol version marker sent as `v` on every hit.
const PROTOCOL_VERSION: &str = "1";

/// Universal Analytics measurement client.
///
/// Emission methods are synchronous: each assembles one payload and hands the
/// collect URL to the transport on a spawned task. Nothing flows back to the
/// caller; there is no response, no delivery confirmation, and no error.
pub struct Tracker {
    config: TrackerConfig,
    client_id: String,
    environment: Arc<dyn Environment>,
    transport: Arc<dyn Transport>,
    runtime: Handle,
    inflight: Mutex<Vec<JoinHandle<()>>>,
}

impl Tracker {
    /// Build a tracker with explicit capabilities.
    ///
    /// The client id is resolved exactly once here: the configured override
    /// when present, otherwise read from (or created in) `store`. The store
    /// is not consulted again for the lifetime of the tracker.
    pub fn new(
        config: TrackerConfig,
        store: &dyn PrefStore,
        environment: Arc<dyn Environment>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        if config.tracking_id.is_empty() {
            return Err(ZondError::EmptyTrackingId);
        }
        let runtime = Handle::try_current().map_err(|err| ZondError::RuntimeUnavailable {
            reason: err.to_string(),
        })?;
        let client_id = match &config.client_id {
            Some(cid) => cid.clone(),
            None => get_or_create_client_id(store),
        };
        Ok(Self {
            config,
            client_id,
            environment,
            transport,
            runtime,
            inflight: Mutex::new(Vec::new()),
        })
    }

    /// Build a tracker wired to the host-backed defaults: file preference
    /// store, host environment, HTTP transport.
    pub fn with_defaults(config: TrackerConfig) -> Result<Self> {
        let store = FilePrefStore::open()?;
        Self::new(
            config,
            &store,
            Arc::new(HostEnvironment::default()),
            Arc::new(HttpTransport::new()),
        )
    }

    /// The resolved client identifier hits are attributed to.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Emit an interaction event. Category and action are included when
    /// non-empty; the label when provided non-empty; the value when provided
    /// and non-zero.
    pub fn event(&self, category: &str, action: &str, label: Option<&str>, value: Option<i64>) {
        let mut hit = Payload::new();
        hit.push_raw("t", "event");
        hit.push_text("ec", category);
        hit.push_text("ea", action);
        hit.push_opt("el", label);
        if let Some(value) = value {
            if value != 0 {
                hit.push_raw("ev", value.to_string());
            }
        }
        self.submit(hit);
    }

    /// Emit a pageview with optional path and title.
    pub fn pageview(&self, path: Option<&str>, title: Option<&str>) {
        let mut hit = Payload::new();
        hit.push_raw("t", "pageview");
        hit.push_opt("dp", path);
        hit.push_opt("dt", title);
        self.submit(hit);
    }

    /// Emit an exception hit.
    pub fn exception(&self, description: Option<&str>, fatal: bool) {
        let mut hit = Payload::new();
        hit.push_raw("t", "exception");
        hit.push_opt("exd", description);
        if fatal {
            hit.push_raw("exf", "1");
        }
        self.submit(hit);
    }

    /// Emit a generic hit of the given type, optionally flagged
    /// non-interactive.
    pub fn hit(&self, hit_type: &str, non_interactive: bool) {
        let mut hit = Payload::new();
        hit.push("t", hit_type);
        if non_interactive {
            hit.push_raw("ni", "1");
        }
        self.submit(hit);
    }

    /// Emit a social interaction.
    pub fn social(&self, action: Option<&str>, network: Option<&str>, target: Option<&str>) {
        let mut hit = Payload::new();
        hit.push_raw("t", "social");
        hit.push_opt("sa", action);
        hit.push_opt("sn", network);
        hit.push_opt("st", target);
        self.submit(hit);
    }

    /// Wait until every previously emitted hit has reached the transport.
    ///
    /// Lets short-lived hosts drain spawned dispatches before exiting. This
    /// confirms nothing about delivery; a completed send may still have been
    /// dropped on the wire.
    pub async fn flush(&self) {
        let tasks = mem::take(&mut *self.inflight.lock().unwrap());
        for task in tasks {
            let _ = task.await;
        }
    }

    /// Assemble the full collect URL around the event-specific fields.
    fn collect_url(&self, hit: Payload) -> String {
        let mut payload = Payload::new();
        payload.push_raw("v", PROTOCOL_VERSION);
        payload.push_opt("dh", self.config.domain.as_deref());
        payload.push("tid", &self.config.tracking_id);
        payload.push("cid", &self.client_id);

        let (width, height) = self.environment.screen_size();
        payload.push_raw("sr", format!("{width}x{height}"));
        payload.push_raw("sd", format!("{}-bits", self.environment.color_depth()));
        payload.push("ul", &self.environment.locale());

        payload.push_opt("an", self.config.app_name.as_deref());
        payload.push_opt("av", self.config.app_version.as_deref());

        payload.extend(hit);
        payload.push_raw("z", cache_buster());

        format!("{COLLECT_ENDPOINT}?{}", payload.render())
    }

    fn submit(&self, hit: Payload) {
        let url = self.collect_url(hit);
        debug!("dispatching hit: {url}");
        let transport = Arc::clone(&self.transport);
        let task = self.runtime.spawn(async move {
            transport.send(url).await;
        });
        let mut inflight = self.inflight.lock().unwrap();
        inflight.retain(|task| !task.is_finished());
        inflight.push(task);
    }
}

/// Random cache-busting suffix sent as `z`.
fn cache_buster() -> String {
    rand::rng()
        .random_range(10_000_000_000u64..20_000_000_000)
        .to_string()
}
