//! Fixed client options.
//!
//! Every `ClientHandle` is built with exactly these values. There is no
//! builder and no setter; callers can only read them.

use serde::Serialize;

/// Client identity sent as `x-client-info` on every request
pub const CLIENT_INFO: &str = "vibex-app";

/// Header carrying the client identity
pub const CLIENT_INFO_HEADER: &str = "x-client-info";

/// Realtime events processed per second per channel
pub const REALTIME_EVENTS_PER_SECOND: u32 = 10;

/// Authentication handshake style. Only the PKCE flow is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    Pkce,
}

impl FlowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Pkce => "pkce",
        }
    }
}

/// Auth behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOptions {
    auto_refresh_token: bool,
    persist_session: bool,
    detect_session_in_url: bool,
    flow_type: FlowType,
}

impl AuthOptions {
    pub fn auto_refresh_token(&self) -> bool {
        self.auto_refresh_token
    }

    pub fn persist_session(&self) -> bool {
        self.persist_session
    }

    pub fn detect_session_in_url(&self) -> bool {
        self.detect_session_in_url
    }

    pub fn flow_type(&self) -> FlowType {
        self.flow_type
    }
}

/// Options applied to every outbound request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalOptions {
    headers: Vec<(&'static str, &'static str)>,
}

impl GlobalOptions {
    /// Static headers attached to every request
    pub fn headers(&self) -> &[(&'static str, &'static str)] {
        &self.headers
    }
}

/// Realtime behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeOptions {
    events_per_second: u32,
}

impl RealtimeOptions {
    pub fn events_per_second(&self) -> u32 {
        self.events_per_second
    }
}

/// The complete option set of a client handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientOptions {
    auth: AuthOptions,
    global: GlobalOptions,
    realtime: RealtimeOptions,
}

impl ClientOptions {
    /// The one option set every handle uses
    pub(crate) fn fixed() -> Self {
        Self {
            auth: AuthOptions {
                auto_refresh_token: true,
                persist_session: true,
                detect_session_in_url: true,
                flow_type: FlowType::Pkce,
            },
            global: GlobalOptions {
                headers: vec![(CLIENT_INFO_HEADER, CLIENT_INFO)],
            },
            realtime: RealtimeOptions {
                events_per_second: REALTIME_EVENTS_PER_SECOND,
            },
        }
    }

    pub fn auth(&self) -> &AuthOptions {
        &self.auth
    }

    pub fn global(&self) -> &GlobalOptions {
        &self.global
    }

    pub fn realtime(&self) -> &RealtimeOptions {
        &self.realtime
    }
}
