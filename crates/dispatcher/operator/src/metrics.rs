//! Counters for `spec.md` §6: incremented exactly-once per terminal
//! transition, as observed by the reconciliation driver (§4.D). The HTTP
//! ingress' own `job_requests_total` siblings are out of scope (§1) and
//! live outside this crate.

use std::sync::OnceLock;

use opentelemetry::metrics::Counter;

pub struct Metrics {
    pub executions_total: Counter<u64>,
    pub executions_success_total: Counter<u64>,
    pub executions_failures_total: Counter<u64>,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

fn metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let meter = ::opentelemetry::global::meter("dispatcher-operator");
        Metrics {
            executions_total: meter.u64_counter("job_executions_total").init(),
            executions_success_total: meter.u64_counter("job_executions_success_total").init(),
            executions_failures_total: meter.u64_counter("job_executions_failures_total").init(),
        }
    })
}

/// First observation of a Job created for a request (§4.D, `J absent? ... create`).
pub fn record_job_created() {
    metrics().executions_total.add(1, &[]);
}

/// First observation of `Succeeded=True`.
pub fn record_job_succeeded() {
    metrics().executions_success_total.add(1, &[]);
}

/// First observation of `Succeeded=False`.
pub fn record_job_failed() {
    metrics().executions_failures_total.add(1, &[]);
}
