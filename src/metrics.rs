use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Pre-register counters so they appear even before the first increment.
    counter!("trades_proposed").absolute(0);
    counter!("trades_executed").absolute(0);
    counter!("trades_reverted").absolute(0);
    counter!("trade_conflicts").absolute(0);
    counter!("responses_recorded").absolute(0);
    counter!("deadline_sweeps").absolute(0);

    gauge!("pending_trades").set(0.0);

    handle
}
