//! Telemetry uplink — drains the telemetry channel into the datastore.
//!
//! Runs in a dedicated thread: `futures_lite::future::block_on` parks on
//! `TELEMETRY_CHANNEL.receive()` and wakes as soon as the control loop
//! queues a frame.  Each frame gets exactly one delivery attempt; on
//! failure it is logged and discarded.
//!
//! The link is only maintained when a frame arrives: [`Uplink::deliver`]
//! polls the [`ConnectivityPort`] first.  After an outage nothing
//! reconnects while the controller sits idle, so the first frame that
//! follows pays for the (blocking) reconnect attempt once the backoff has
//! elapsed, and is dropped if that attempt fails.  The control loop is
//! never affected; it only ever `try_send`s.
//!
//! The datastore itself sits behind [`RemoteStore`]:
//!
//! - **`target_os = "espidf"`**: [`HttpStore`] — HTTPS `PATCH`/`POST`
//!   against a Firebase-style REST endpoint.
//! - **all targets**: [`LoggingStore`] — logs each frame (simulation).

use std::time::Instant;

use log::{info, warn};

use crate::error::TelemetryError;

use super::telemetry::{TelemetryChannel, TelemetryFrame};
use super::wifi::ConnectivityPort;

#[cfg(target_os = "espidf")]
use super::telemetry::WriteOp;

/// The remote datastore, as seen by the uplink thread.
pub trait RemoteStore {
    fn send(&mut self, frame: &TelemetryFrame) -> Result<(), TelemetryError>;
}

// ───────────────────────────────────────────────────────────────
// Uplink
// ───────────────────────────────────────────────────────────────

pub struct Uplink<S, L> {
    store: S,
    link: L,
    started: Instant,
    delivered: u32,
    dropped: u32,
}

impl<S: RemoteStore, L: ConnectivityPort> Uplink<S, L> {
    pub fn new(store: S, link: L) -> Self {
        Self {
            store,
            link,
            started: Instant::now(),
            delivered: 0,
            dropped: 0,
        }
    }

    /// One delivery attempt for `frame`.
    pub fn deliver(&mut self, frame: &TelemetryFrame) -> Result<(), TelemetryError> {
        self.link.poll(self.started.elapsed().as_millis() as u64);

        let result = if self.link.is_connected() {
            self.store.send(frame)
        } else {
            Err(TelemetryError::Offline)
        };

        match result {
            Ok(()) => self.delivered = self.delivered.saturating_add(1),
            Err(e) => {
                self.dropped = self.dropped.saturating_add(1);
                warn!("Uplink: {} frame dropped: {}", frame.node, e);
            }
        }
        result
    }

    /// Deliver everything currently queued without waiting.  Returns the
    /// number of frames taken off the channel.
    pub fn drain_pending(&mut self, channel: &TelemetryChannel) -> usize {
        let mut n = 0;
        while let Ok(frame) = channel.try_receive() {
            let _ = self.deliver(&frame);
            n += 1;
        }
        n
    }

    /// Deliver frames forever.
    pub async fn run(mut self, channel: &TelemetryChannel) {
        info!("Uplink: started");
        loop {
            let frame = channel.receive().await;
            let _ = self.deliver(&frame);
        }
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

/// Stack for the uplink thread; TLS handshakes need the headroom.
const UPLINK_STACK_SIZE: usize = 12 * 1024;

/// Start the uplink thread on `channel`.
pub fn spawn<S, L>(
    channel: &'static TelemetryChannel,
    uplink: Uplink<S, L>,
) -> std::io::Result<std::thread::JoinHandle<()>>
where
    S: RemoteStore + Send + 'static,
    L: ConnectivityPort + Send + 'static,
{
    std::thread::Builder::new()
        .name("uplink".into())
        .stack_size(UPLINK_STACK_SIZE)
        .spawn(move || futures_lite::future::block_on(uplink.run(channel)))
}

// ───────────────────────────────────────────────────────────────
// Stores
// ───────────────────────────────────────────────────────────────

/// Logs every frame instead of sending it.
#[derive(Debug, Default)]
pub struct LoggingStore {
    sent: u32,
}

impl LoggingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }
}

impl RemoteStore for LoggingStore {
    fn send(&mut self, frame: &TelemetryFrame) -> Result<(), TelemetryError> {
        let body = core::str::from_utf8(&frame.body).map_err(|_| TelemetryError::Encode)?;
        info!("Uplink(sim): {:?} /{} {}", frame.op, frame.node, body);
        self.sent = self.sent.saturating_add(1);
        Ok(())
    }
}

/// REST datastore over HTTPS (Firebase Realtime Database style:
/// `{base}/{node}.json?auth={secret}`).
#[cfg(target_os = "espidf")]
pub struct HttpStore {
    base_url: heapless::String<128>,
    auth: heapless::String<96>,
}

#[cfg(target_os = "espidf")]
impl HttpStore {
    /// `None` if either value does not fit.
    pub fn new(base_url: &str, auth: &str) -> Option<Self> {
        Some(Self {
            base_url: heapless::String::try_from(base_url.trim_end_matches('/')).ok()?,
            auth: heapless::String::try_from(auth).ok()?,
        })
    }
}

#[cfg(target_os = "espidf")]
impl RemoteStore for HttpStore {
    fn send(&mut self, frame: &TelemetryFrame) -> Result<(), TelemetryError> {
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let url = format!("{}/{}.json?auth={}", self.base_url, frame.node, self.auth);
        let method = match frame.op {
            WriteOp::Update => Method::Patch,
            WriteOp::Push => Method::Post,
        };
        let len = frame.body.len().to_string();
        let headers = [("content-type", "application/json"), ("content-length", len.as_str())];

        let mut conn = EspHttpConnection::new(&Configuration {
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|_| TelemetryError::Transport)?;

        conn.initiate_request(method, &url, &headers)
            .map_err(|_| TelemetryError::Transport)?;
        let mut rest: &[u8] = &frame.body;
        while !rest.is_empty() {
            let n = conn.write(rest).map_err(|_| TelemetryError::Transport)?;
            rest = &rest[n..];
        }
        conn.initiate_response().map_err(|_| TelemetryError::Transport)?;

        match conn.status() {
            200..=299 => Ok(()),
            status => Err(TelemetryError::Rejected(status)),
        }
    }
}
