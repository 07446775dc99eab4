//! Collection strategies and Prometheus text exposition rendering.
//!
//! Two mutually exclusive strategies sit behind [`Collector`]:
//!
//! - [`OnDemandCollector`] probes the videobridge synchronously on every
//!   scrape. A failed probe exposes only the `up` indicator for that cycle.
//! - [`CachedCollector`] serves the snapshot maintained by a background
//!   [`RefreshLoop`], so scrapes never block on network I/O. During an
//!   outage the last good snapshot keeps being served with `up` set to 0,
//!   trading freshness for availability.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::probe::Prober;
use crate::snapshot::MetricsSnapshot;

/// Name prefix for every exposed series.
pub const METRIC_PREFIX: &str = "jitsi_colibri";

/// Last-known collection state shared between the refresh loop and scrapes.
#[derive(Debug, Default)]
pub struct LiveState {
    /// Most recently assembled snapshot; zero-valued until the first
    /// successful probe.
    pub snapshot: MetricsSnapshot,
    /// Whether the most recent probe succeeded.
    pub up: bool,
    /// Whether any probe has ever succeeded; set once, never cleared.
    pub ever_up: bool,
}

/// Shared handle to [`LiveState`]. The refresh loop is the only writer;
/// scrape handlers take read views. Updates replace the whole snapshot, so
/// readers never observe a half-updated one.
pub type SharedState = Arc<RwLock<LiveState>>;

/// Scrape-time metrics source, one of the two collection strategies.
pub enum Collector {
    OnDemand(OnDemandCollector),
    Cached(CachedCollector),
}

impl Collector {
    /// Produce the exposition body for one scrape.
    pub async fn scrape(&self) -> String {
        match self {
            Collector::OnDemand(c) => c.scrape().await,
            Collector::Cached(c) => c.scrape(),
        }
    }

    /// Whether at least one probe has succeeded since startup.
    pub fn ready(&self) -> bool {
        match self {
            Collector::OnDemand(c) => c.ever_up.load(Ordering::Relaxed),
            Collector::Cached(c) => c.state.read().ever_up,
        }
    }
}

/// Probe-per-scrape collection.
///
/// Concurrent scrapes each trigger an independent probe; nothing coalesces
/// them, so a scrape storm hits the videobridge once per request.
pub struct OnDemandCollector {
    prober: Prober,
    ever_up: AtomicBool,
}

impl OnDemandCollector {
    pub fn new(prober: Prober) -> Self {
        Self {
            prober,
            ever_up: AtomicBool::new(false),
        }
    }

    /// Probe, assemble, and render. A failed probe yields only the `up`
    /// indicator, never stale data.
    pub async fn scrape(&self) -> String {
        match self.prober.probe().await {
            Ok(doc) => {
                self.ever_up.store(true, Ordering::Relaxed);
                let snapshot = MetricsSnapshot::assemble(&doc);
                render(&snapshot, true)
            }
            Err(e) => {
                error!("Probe failed: {}", e);
                render_up_only(false)
            }
        }
    }
}

/// Cached-snapshot collection; reads [`LiveState`] without network I/O.
pub struct CachedCollector {
    state: SharedState,
}

impl CachedCollector {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub fn scrape(&self) -> String {
        let state = self.state.read();
        render(&state.snapshot, state.up)
    }
}

/// Background loop that keeps [`LiveState`] fresh on a fixed interval.
pub struct RefreshLoop {
    prober: Prober,
    state: SharedState,
    interval: Duration,
}

impl RefreshLoop {
    pub fn new(prober: Prober, state: SharedState, interval: Duration) -> Self {
        Self {
            prober,
            state,
            interval,
        }
    }

    /// Probe on the configured interval until the shutdown signal fires.
    /// The first probe runs immediately.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting refresh loop"
        );

        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.refresh_once().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Refresh loop stopped");
    }

    /// One probe cycle: replace the snapshot wholesale on success; on
    /// failure keep the last good snapshot and drop the freshness flag.
    pub async fn refresh_once(&self) {
        match self.prober.probe().await {
            Ok(doc) => {
                let snapshot = MetricsSnapshot::assemble(&doc);
                let mut state = self.state.write();
                state.snapshot = snapshot;
                state.up = true;
                state.ever_up = true;
                drop(state);
                debug!("Snapshot refreshed");
            }
            Err(e) => {
                error!("Probe failed, keeping last snapshot: {}", e);
                self.state.write().up = false;
            }
        }
    }
}

/// Render a full snapshot in Prometheus text exposition format.
pub fn render(snapshot: &MetricsSnapshot, up: bool) -> String {
    let mut output = Vec::with_capacity(4096);

    write_up(&mut output, up);

    for (name, kind, value) in snapshot.scalars() {
        writeln!(output, "# TYPE {}_{} {}", METRIC_PREFIX, name, kind.as_str()).ok();
        writeln!(output, "{}_{} {}", METRIC_PREFIX, name, format_value(value)).ok();
    }

    let dist = &snapshot.conference_sizes;
    writeln!(output, "# TYPE {}_conference_sizes histogram", METRIC_PREFIX).ok();
    for (le, cumulative) in &dist.buckets {
        writeln!(
            output,
            "{}_conference_sizes_bucket{{le=\"{}\"}} {}",
            METRIC_PREFIX,
            format_value(*le),
            cumulative
        )
        .ok();
    }
    // The unbounded bucket always equals the observation count.
    writeln!(
        output,
        "{}_conference_sizes_bucket{{le=\"+Inf\"}} {}",
        METRIC_PREFIX, dist.sum
    )
    .ok();
    writeln!(output, "{}_conference_sizes_sum {}", METRIC_PREFIX, dist.sum).ok();
    writeln!(
        output,
        "{}_conference_sizes_count {}",
        METRIC_PREFIX, dist.sum
    )
    .ok();

    String::from_utf8(output).unwrap_or_default()
}

/// Render only the liveness indicator, used when an on-demand probe fails.
pub fn render_up_only(up: bool) -> String {
    let mut output = Vec::with_capacity(64);
    write_up(&mut output, up);
    String::from_utf8(output).unwrap_or_default()
}

fn write_up(output: &mut Vec<u8>, up: bool) {
    writeln!(output, "# TYPE {}_up gauge", METRIC_PREFIX).ok();
    writeln!(output, "{}_up {}", METRIC_PREFIX, if up { 1 } else { 0 }).ok();
}

/// Format a floating point value for Prometheus.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
