use growatt_rs::Channels;
use prometheus::{Encoder, IntGaugeVec, TextEncoder};
use rocket::http::Status;

lazy_static! {
    static ref ACTIVE_POWER_GAUGE: IntGaugeVec = register_int_gauge_vec!(
        opts!(
            "growatt_active_power",
            "active power production reported by the Growatt cloud (in W)",
        ),
        &["component"],
    )
    .unwrap();
    static ref API_FAILED_GAUGE: IntGaugeVec = register_int_gauge_vec!(
        opts!(
            "growatt_api_failed",
            "1 if the last poll of the Growatt cloud failed",
        ),
        &["component"],
    )
    .unwrap();
}

/// Channels of one component, exported as Prometheus gauges labelled with the component id.
pub struct PrometheusChannels {
    component: String,
}

impl PrometheusChannels {
    pub fn new(component: &str) -> Self {
        PrometheusChannels {
            component: component.to_owned(),
        }
    }
}

impl Channels for PrometheusChannels {
    fn set_active_power(&mut self, watts: i64) {
        ACTIVE_POWER_GAUGE
            .with_label_values(&[&self.component])
            .set(watts);
    }

    fn set_api_failed(&mut self, failed: bool) {
        API_FAILED_GAUGE
            .with_label_values(&[&self.component])
            .set(failed as i64);
    }
}

/// Read metrics from Prometheus exporter registry.
pub fn read() -> Result<String, Status> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder.encode(&metric_families, &mut buffer).map_err(|e| {
        log::error!("Cannot encode metrics: {}", e);
        Status::InternalServerError
    })?;
    String::from_utf8(buffer).or(Err(Status::InternalServerError))
}
