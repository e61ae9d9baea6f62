//! Realtime connection parameters and per-channel event rate ceiling.
//!
//! The websocket transport itself lives outside this crate. This module
//! provides the endpoint URL it connects to and the throttle it consults
//! before handling an incoming event.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;
use url::Url;

use crate::config::BackendConfig;
use crate::options::RealtimeOptions;

/// Phoenix channels protocol version
const PROTOCOL_VSN: &str = "1.0.0";

/// Length of a rate window
const WINDOW: Duration = Duration::from_secs(1);

/// Build `ws(s)://<host>/realtime/v1/websocket?apikey=..&eventsPerSecond=..&vsn=..`
pub fn realtime_endpoint(
    config: &BackendConfig,
    options: &RealtimeOptions,
) -> Result<Url, url::ParseError> {
    let base = config.url();
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}/", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}/", rest)
    } else {
        format!("{}/", base)
    };

    let mut url = Url::parse(&ws_base)?.join("realtime/v1/websocket")?;
    url.query_pairs_mut()
        .append_pair("apikey", config.anon_key())
        .append_pair("eventsPerSecond", &options.events_per_second().to_string())
        .append_pair("vsn", PROTOCOL_VSN);
    Ok(url)
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window limiter admitting a bounded number of events per channel per second
#[derive(Debug)]
pub struct EventThrottle {
    limit: u32,
    channels: Mutex<HashMap<String, Window>>,
}

impl EventThrottle {
    pub fn new(events_per_second: u32) -> Self {
        Self {
            limit: events_per_second,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Events admitted per channel per second
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Whether an event on `channel` may be processed now
    pub fn admit(&self, channel: &str) -> bool {
        self.admit_at(channel, Instant::now())
    }

    fn admit_at(&self, channel: &str, now: Instant) -> bool {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let window = channels.entry(channel.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.limit {
            window.count += 1;
            true
        } else {
            debug!("Dropping realtime event on {}: rate ceiling reached", channel);
            false
        }
    }

    /// Drop the state kept for a channel after unsubscribing
    pub fn forget(&self, channel: &str) {
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ClientOptions;

    fn config(url: &str) -> BackendConfig {
        BackendConfig::from_values(Some(url.to_string()), Some("anon-key".to_string())).unwrap()
    }

    #[test]
    fn test_realtime_endpoint() {
        let options = ClientOptions::fixed();
        let url = realtime_endpoint(&config("https://abc.supabase.co"), options.realtime()).unwrap();
        assert_eq!(
            url.as_str(),
            "wss://abc.supabase.co/realtime/v1/websocket?apikey=anon-key&eventsPerSecond=10&vsn=1.0.0"
        );

        let url = realtime_endpoint(&config("http://localhost:54321"), options.realtime()).unwrap();
        assert!(url.as_str().starts_with("ws://localhost:54321/realtime/v1/websocket?"));
    }

    #[test]
    fn test_throttle_ceiling_per_channel() {
        let throttle = EventThrottle::new(10);
        let start = Instant::now();

        for _ in 0..10 {
            assert!(throttle.admit_at("room:1", start));
        }
        assert!(!throttle.admit_at("room:1", start + Duration::from_millis(500)));

        // Other channels have their own budget
        assert!(throttle.admit_at("room:2", start));

        // Budget resets with the next window
        assert!(throttle.admit_at("room:1", start + Duration::from_secs(1)));
    }

    #[test]
    fn test_forget_resets_channel() {
        let throttle = EventThrottle::new(1);
        let start = Instant::now();

        assert!(throttle.admit_at("room:1", start));
        assert!(!throttle.admit_at("room:1", start));

        throttle.forget("room:1");
        assert!(throttle.admit_at("room:1", start));
    }
}
