use prometheus::{
    Counter, Encoder, GaugeVec, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub deliveries_in_queue: IntGauge,
    pub assignments_total: IntCounterVec,
    pub assignment_latency_seconds: HistogramVec,
    pub verification_attempts_total: IntCounterVec,
    pub delivery_transitions_total: IntCounterVec,
    pub commission_collected_total: Counter,
    pub rider_utilization: GaugeVec,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let deliveries_in_queue = IntGauge::new(
            "deliveries_in_queue",
            "Deliveries waiting for automatic assignment",
        )
        .expect("valid deliveries_in_queue metric");

        let assignments_total = IntCounterVec::new(
            Opts::new("assignments_total", "Rider assignments by outcome"),
            &["outcome"],
        )
        .expect("valid assignments_total metric");

        let assignment_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "assignment_latency_seconds",
                "Latency of automatic assignment in seconds",
            ),
            &["outcome"],
        )
        .expect("valid assignment_latency_seconds metric");

        let verification_attempts_total = IntCounterVec::new(
            Opts::new(
                "verification_attempts_total",
                "Pickup and delivery code submissions by outcome",
            ),
            &["stage", "outcome"],
        )
        .expect("valid verification_attempts_total metric");

        let delivery_transitions_total = IntCounterVec::new(
            Opts::new(
                "delivery_transitions_total",
                "Delivery state changes by resulting status",
            ),
            &["status"],
        )
        .expect("valid delivery_transitions_total metric");

        let commission_collected_total = Counter::new(
            "commission_collected_total",
            "Commission collected on delivered orders",
        )
        .expect("valid commission_collected_total metric");

        let rider_utilization = GaugeVec::new(
            Opts::new("rider_utilization", "Rider utilization ratio [0..1]"),
            &["rider_id"],
        )
        .expect("valid rider_utilization metric");

        registry
            .register(Box::new(deliveries_in_queue.clone()))
            .expect("register deliveries_in_queue");
        registry
            .register(Box::new(assignments_total.clone()))
            .expect("register assignments_total");
        registry
            .register(Box::new(assignment_latency_seconds.clone()))
            .expect("register assignment_latency_seconds");
        registry
            .register(Box::new(verification_attempts_total.clone()))
            .expect("register verification_attempts_total");
        registry
            .register(Box::new(delivery_transitions_total.clone()))
            .expect("register delivery_transitions_total");
        registry
            .register(Box::new(commission_collected_total.clone()))
            .expect("register commission_collected_total");
        registry
            .register(Box::new(rider_utilization.clone()))
            .expect("register rider_utilization");

        Self {
            registry,
            deliveries_in_queue,
            assignments_total,
            assignment_latency_seconds,
            verification_attempts_total,
            delivery_transitions_total,
            commission_collected_total,
            rider_utilization,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
