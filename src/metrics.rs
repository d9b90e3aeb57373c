//! Prometheus-compatible metrics endpoint
//!
//! Exposes simulation counters in Prometheus text format.
//! Default endpoint: http://localhost:<METRICS_PORT>/metrics

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::game::agent::AgentSnapshot;
use crate::game::manager::TickReport;
use crate::game::systems::fsm::BehaviorState;

/// Tick samples kept for percentile calculation
const TICK_HISTORY_LEN: usize = 1000;

/// Metrics registry for the enemy simulation
#[derive(Debug)]
pub struct SimMetrics {
    // Agent counts
    pub agents_total: AtomicU64,
    pub agents_alive: AtomicU64,
    pub agents_roaming: AtomicU64,
    pub agents_aware: AtomicU64,
    pub agents_combat: AtomicU64,

    // Event counters
    pub transitions_total: AtomicU64,
    pub shots_total: AtomicU64,
    pub misses_total: AtomicU64,
    pub help_calls_delivered_total: AtomicU64,
    pub hits_total: AtomicU64,
    pub deaths_total: AtomicU64,

    // Tick timing (microseconds)
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,
    pub tick_count: AtomicU64,

    /// Simulated seconds, stored as milliseconds
    pub sim_time_ms: AtomicU64,

    start_time: Instant,

    // Rolling tick times for percentile calculation (VecDeque for O(1) pop_front)
    tick_history: RwLock<VecDeque<u64>>,
}

impl SimMetrics {
    pub fn new() -> Self {
        Self {
            agents_total: AtomicU64::new(0),
            agents_alive: AtomicU64::new(0),
            agents_roaming: AtomicU64::new(0),
            agents_aware: AtomicU64::new(0),
            agents_combat: AtomicU64::new(0),
            transitions_total: AtomicU64::new(0),
            shots_total: AtomicU64::new(0),
            misses_total: AtomicU64::new(0),
            help_calls_delivered_total: AtomicU64::new(0),
            hits_total: AtomicU64::new(0),
            deaths_total: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            sim_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY_LEN)),
        }
    }

    /// Record a tick time and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY_LEN {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.tick_time_p95_us.store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_p99_us.store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us.store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Fold one manager tick into the counters
    pub fn record_report(&self, report: &TickReport) {
        self.transitions_total
            .fetch_add(report.transitions as u64, Ordering::Relaxed);
        self.shots_total.fetch_add(report.shots as u64, Ordering::Relaxed);
        self.misses_total.fetch_add(report.misses as u64, Ordering::Relaxed);
        self.help_calls_delivered_total
            .fetch_add(report.help_deliveries as u64, Ordering::Relaxed);
        self.sim_time_ms
            .store((report.now * 1000.0) as u64, Ordering::Relaxed);
    }

    /// Refresh the per-state agent gauges
    pub fn record_agents(&self, snapshots: &[AgentSnapshot]) {
        let count = |state: BehaviorState| {
            snapshots
                .iter()
                .filter(|s| s.alive && s.state == state)
                .count() as u64
        };

        self.agents_total
            .store(snapshots.len() as u64, Ordering::Relaxed);
        self.agents_alive.store(
            snapshots.iter().filter(|s| s.alive).count() as u64,
            Ordering::Relaxed,
        );
        self.agents_roaming
            .store(count(BehaviorState::Roaming), Ordering::Relaxed);
        self.agents_aware
            .store(count(BehaviorState::Aware), Ordering::Relaxed);
        self.agents_combat
            .store(count(BehaviorState::Combat), Ordering::Relaxed);
    }

    pub fn record_hit(&self, died: bool) {
        self.hits_total.fetch_add(1, Ordering::Relaxed);
        if died {
            self.deaths_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        // Agents
        metric!("stealth_ai_agents_total", "Number of spawned enemies", "gauge",
            self.agents_total.load(Ordering::Relaxed));
        metric!("stealth_ai_agents_alive", "Number of living enemies", "gauge",
            self.agents_alive.load(Ordering::Relaxed));

        output.push_str(
            "# HELP stealth_ai_agents_by_state Living enemies per behavior state\n# TYPE stealth_ai_agents_by_state gauge\n",
        );
        for (state, gauge) in [
            ("roaming", &self.agents_roaming),
            ("aware", &self.agents_aware),
            ("combat", &self.agents_combat),
        ] {
            output.push_str(&format!(
                "stealth_ai_agents_by_state{{state=\"{}\"}} {}\n",
                state,
                gauge.load(Ordering::Relaxed)
            ));
        }

        // Events
        metric!("stealth_ai_transitions_total", "State transitions", "counter",
            self.transitions_total.load(Ordering::Relaxed));
        metric!("stealth_ai_shots_total", "Projectiles spawned", "counter",
            self.shots_total.load(Ordering::Relaxed));
        metric!("stealth_ai_misses_total", "Fire attempts lost to the hit roll", "counter",
            self.misses_total.load(Ordering::Relaxed));
        metric!("stealth_ai_help_calls_delivered_total", "Allies alerted by a call for help", "counter",
            self.help_calls_delivered_total.load(Ordering::Relaxed));
        metric!("stealth_ai_hits_total", "Hits taken by enemies", "counter",
            self.hits_total.load(Ordering::Relaxed));
        metric!("stealth_ai_deaths_total", "Enemy deaths", "counter",
            self.deaths_total.load(Ordering::Relaxed));

        // Performance
        metric!("stealth_ai_tick_time_microseconds", "Current tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("stealth_ai_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("stealth_ai_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("stealth_ai_tick_time_max_microseconds", "Maximum tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("stealth_ai_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));

        metric!("stealth_ai_sim_time_seconds", "Simulated time", "gauge",
            self.sim_time_ms.load(Ordering::Relaxed) as f64 / 1000.0);
        metric!("stealth_ai_uptime_seconds", "Process uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// JSON view of the same counters
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "agents": {
                "total": self.agents_total.load(Ordering::Relaxed),
                "alive": self.agents_alive.load(Ordering::Relaxed),
                "roaming": self.agents_roaming.load(Ordering::Relaxed),
                "aware": self.agents_aware.load(Ordering::Relaxed),
                "combat": self.agents_combat.load(Ordering::Relaxed),
            },
            "events": {
                "transitions": self.transitions_total.load(Ordering::Relaxed),
                "shots": self.shots_total.load(Ordering::Relaxed),
                "misses": self.misses_total.load(Ordering::Relaxed),
                "help_calls_delivered": self.help_calls_delivered_total.load(Ordering::Relaxed),
                "hits": self.hits_total.load(Ordering::Relaxed),
                "deaths": self.deaths_total.load(Ordering::Relaxed),
            },
            "performance": {
                "tick_time_us": self.tick_time_us.load(Ordering::Relaxed),
                "tick_time_p95_us": self.tick_time_p95_us.load(Ordering::Relaxed),
                "tick_time_p99_us": self.tick_time_p99_us.load(Ordering::Relaxed),
                "tick_time_max_us": self.tick_time_max_us.load(Ordering::Relaxed),
                "tick_count": self.tick_count.load(Ordering::Relaxed),
            },
            "sim_time_seconds": self.sim_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            "uptime_seconds": self.uptime_seconds(),
        })
        .to_string()
    }
}

impl Default for SimMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn http_response(content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        content_type,
        body.len(),
        body
    )
}

/// Start the metrics HTTP server
pub async fn start_metrics_server(metrics: Arc<SimMetrics>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Metrics server listening on http://{}/metrics", addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];

            match socket.read(&mut buffer).await {
                Ok(n) if n > 0 => {
                    let request = String::from_utf8_lossy(&buffer[..n]);

                    // More specific paths first
                    let response = if request.starts_with("GET /metrics/json") {
                        http_response("application/json", &metrics.to_json())
                    } else if request.starts_with("GET /metrics") {
                        http_response("text/plain; version=0.0.4", &metrics.to_prometheus())
                    } else if request.starts_with("GET /health") {
                        http_response("text/plain", "OK")
                    } else {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
                    };

                    if let Err(e) = socket.write_all(response.as_bytes()).await {
                        debug!("Failed to write metrics response to {}: {}", peer, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Failed to read from metrics socket {}: {}", peer, e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::agent::AgentEvent;

    #[test]
    fn test_metrics_new() {
        let metrics = SimMetrics::new();
        assert_eq!(metrics.agents_total.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_tick_time() {
        let metrics = SimMetrics::new();
        for i in 0..100 {
            metrics.record_tick_time(Duration::from_micros(100 + i * 10));
        }

        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 100);
        assert!(metrics.tick_time_p95_us.load(Ordering::Relaxed) >= 1000);
        assert_eq!(metrics.tick_time_max_us.load(Ordering::Relaxed), 1090);
    }

    #[test]
    fn test_record_report_accumulates() {
        let metrics = SimMetrics::new();
        let report = TickReport {
            now: 2.5,
            shots: 2,
            misses: 1,
            transitions: 3,
            help_deliveries: 1,
            events: vec![(uuid::Uuid::nil(), AgentEvent::ShotMissed)],
        };
        metrics.record_report(&report);
        metrics.record_report(&report);

        assert_eq!(metrics.shots_total.load(Ordering::Relaxed), 4);
        assert_eq!(metrics.transitions_total.load(Ordering::Relaxed), 6);
        assert_eq!(metrics.sim_time_ms.load(Ordering::Relaxed), 2500);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = SimMetrics::new();
        metrics.agents_alive.store(4, Ordering::Relaxed);
        metrics.agents_combat.store(2, Ordering::Relaxed);
        metrics.record_hit(true);

        let output = metrics.to_prometheus();
        assert!(output.contains("stealth_ai_agents_alive 4"));
        assert!(output.contains("stealth_ai_agents_by_state{state=\"combat\"} 2"));
        assert!(output.contains("stealth_ai_deaths_total 1"));
        assert!(output.contains("# TYPE stealth_ai_tick_count counter"));
    }

    #[test]
    fn test_json_format() {
        let metrics = SimMetrics::new();
        metrics.shots_total.store(7, Ordering::Relaxed);
        let json: serde_json::Value = serde_json::from_str(&metrics.to_json()).unwrap();
        assert_eq!(json["events"]["shots"], 7);
    }
}
