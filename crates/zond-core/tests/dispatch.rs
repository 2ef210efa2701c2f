//! End-to-end dispatch coverage: every emission method, full wire payload,
//! escaping, client-id resolution, and flush semantics, exercised against
//! in-memory capability doubles.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use tokio::sync::mpsc;

use zond_core::{
    COLLECT_ENDPOINT, Environment, MemoryPrefStore, PrefStore, Tracker, TrackerConfig, Transport,
};

struct ChannelTransport {
    sent: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, url: String) {
        let _ = self.sent.send(url);
    }
}

struct FixedEnvironment;

impl Environment for FixedEnvironment {
    fn screen_size(&self) -> (u32, u32) {
        (1280, 800)
    }

    fn color_depth(&self) -> u32 {
        24
    }

    fn locale(&self) -> String {
        "en-US".to_string()
    }
}

fn build_tracker(config: TrackerConfig) -> (Tracker, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let store = MemoryPrefStore::new();
    let tracker = Tracker::new(
        config,
        &store,
        Arc::new(FixedEnvironment),
        Arc::new(ChannelTransport { sent: tx }),
    )
    .expect("tracker construction");
    (tracker, rx)
}

/// Decode `<endpoint>?k=v&...` into a key -> unescaped-value map.
fn params(url: &str) -> HashMap<String, String> {
    let (endpoint, query) = url.split_once('?').expect("collect URL has a query");
    assert_eq!(endpoint, COLLECT_ENDPOINT);
    query
        .split('&')
        .map(|pair| {
            let (key, value) = pair.split_once('=').expect("key=value pair");
            let decoded = percent_decode_str(value)
                .decode_utf8()
                .expect("utf-8 value")
                .to_string();
            (key.to_string(), decoded)
        })
        .collect()
}

#[tokio::test]
async fn event_carries_protocol_and_environment_fields() {
    let (tracker, mut rx) = build_tracker(TrackerConfig::new("UA-1234-5"));
    tracker.event("videos", "play", None, None);

    let url = rx.recv().await.expect("one dispatched hit");
    let fields = params(&url);
    assert_eq!(fields["v"], "1");
    assert_eq!(fields["tid"], "UA-1234-5");
    assert_eq!(fields["cid"], tracker.client_id());
    assert_eq!(fields["sr"], "1280x800");
    assert_eq!(fields["sd"], "24-bits");
    assert_eq!(fields["ul"], "en-US");
    assert_eq!(fields["t"], "event");
    assert_eq!(fields["ec"], "videos");
    assert_eq!(fields["ea"], "play");
    assert!(!fields.contains_key("el"));
    assert!(!fields.contains_key("ev"));
    assert!(fields["z"].parse::<u64>().is_ok());
}

#[tokio::test]
async fn event_label_and_value_are_optional() {
    let (tracker, mut rx) = build_tracker(TrackerConfig::new("UA-1234-5"));
    tracker.event("videos", "play", Some("intro"), Some(42));
    let fields = params(&rx.recv().await.unwrap());
    assert_eq!(fields["el"], "intro");
    assert_eq!(fields["ev"], "42");

    // A zero value is treated as absent.
    tracker.event("videos", "play", None, Some(0));
    let fields = params(&rx.recv().await.unwrap());
    assert!(!fields.contains_key("ev"));
}

#[tokio::test]
async fn pageview_escapes_path_and_title() {
    let (tracker, mut rx) = build_tracker(TrackerConfig::new("UA-1234-5"));
    tracker.pageview(Some("/home"), Some("Home"));

    let url = rx.recv().await.unwrap();
    assert!(url.contains("t=pageview&dp=%2Fhome&dt=Home"));
    let fields = params(&url);
    assert_eq!(fields["dp"], "/home");
    assert_eq!(fields["dt"], "Home");
}

#[tokio::test]
async fn exception_reports_description_and_fatal_flag() {
    let (tracker, mut rx) = build_tracker(TrackerConfig::new("UA-1234-5"));
    tracker.exception(Some("oom"), true);
    let fields = params(&rx.recv().await.unwrap());
    assert_eq!(fields["t"], "exception");
    assert_eq!(fields["exd"], "oom");
    assert_eq!(fields["exf"], "1");

    tracker.exception(None, false);
    let fields = params(&rx.recv().await.unwrap());
    assert!(!fields.contains_key("exd"));
    assert!(!fields.contains_key("exf"));
}

#[tokio::test]
async fn social_and_custom_hits() {
    let (tracker, mut rx) = build_tracker(TrackerConfig::new("UA-1234-5"));
    tracker.social(Some("like"), Some("fediverse"), Some("/post/1"));
    let fields = params(&rx.recv().await.unwrap());
    assert_eq!(fields["t"], "social");
    assert_eq!(fields["sa"], "like");
    assert_eq!(fields["sn"], "fediverse");
    assert_eq!(fields["st"], "/post/1");

    tracker.hit("timing", true);
    let fields = params(&rx.recv().await.unwrap());
    assert_eq!(fields["t"], "timing");
    assert_eq!(fields["ni"], "1");
}

#[tokio::test]
async fn reserved_characters_round_trip() {
    let (tracker, mut rx) = build_tracker(TrackerConfig::new("UA-1234-5"));
    tracker.event("a&b", "c=d e", Some("x?y#z"), None);
    let fields = params(&rx.recv().await.unwrap());
    assert_eq!(fields["ec"], "a&b");
    assert_eq!(fields["ea"], "c=d e");
    assert_eq!(fields["el"], "x?y#z");
}

#[tokio::test]
async fn domain_and_app_fields_follow_configuration() {
    let config = TrackerConfig::new("UA-1234-5")
        .with_domain("example.org")
        .with_app("zond", "0.1.0");
    let (tracker, mut rx) = build_tracker(config);
    tracker.pageview(None, None);
    let fields = params(&rx.recv().await.unwrap());
    assert_eq!(fields["dh"], "example.org");
    assert_eq!(fields["an"], "zond");
    assert_eq!(fields["av"], "0.1.0");

    let (bare, mut rx) = build_tracker(TrackerConfig::new("UA-1234-5"));
    bare.pageview(None, None);
    let fields = params(&rx.recv().await.unwrap());
    assert!(!fields.contains_key("dh"));
    assert!(!fields.contains_key("an"));
    assert!(!fields.contains_key("av"));
}

#[tokio::test]
async fn client_id_is_shared_across_trackers_on_one_store() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let store = MemoryPrefStore::new();
    let first = Tracker::new(
        TrackerConfig::new("UA-1234-5"),
        &store,
        Arc::new(FixedEnvironment),
        Arc::new(ChannelTransport { sent: tx.clone() }),
    )
    .unwrap();
    let second = Tracker::new(
        TrackerConfig::new("UA-1234-5"),
        &store,
        Arc::new(FixedEnvironment),
        Arc::new(ChannelTransport { sent: tx }),
    )
    .unwrap();
    assert_eq!(first.client_id(), second.client_id());
}

#[tokio::test]
async fn configured_client_id_bypasses_the_store() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let store = MemoryPrefStore::new();
    let tracker = Tracker::new(
        TrackerConfig::new("UA-1234-5").with_client_id("11111111-2222-3333-4444-555555555555"),
        &store,
        Arc::new(FixedEnvironment),
        Arc::new(ChannelTransport { sent: tx }),
    )
    .unwrap();
    assert_eq!(tracker.client_id(), "11111111-2222-3333-4444-555555555555");
    assert_eq!(store.get("gaCid"), None);

    tracker.pageview(None, None);
    let fields = params(&rx.recv().await.unwrap());
    assert_eq!(fields["cid"], "11111111-2222-3333-4444-555555555555");
}

#[tokio::test]
async fn empty_tracking_id_is_rejected() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let store = MemoryPrefStore::new();
    let result = Tracker::new(
        TrackerConfig::default(),
        &store,
        Arc::new(FixedEnvironment),
        Arc::new(ChannelTransport { sent: tx }),
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn flush_drains_pending_dispatches() {
    let (tracker, mut rx) = build_tracker(TrackerConfig::new("UA-1234-5"));
    tracker.event("videos", "play", None, None);
    tracker.pageview(Some("/home"), None);
    tracker.flush().await;

    // Both sends completed before flush returned.
    let first = rx.try_recv().expect("first hit dispatched");
    let second = rx.try_recv().expect("second hit dispatched");
    assert_eq!(params(&first)["t"], "event");
    assert_eq!(params(&second)["t"], "pageview");
    assert!(rx.try_recv().is_err());
}
