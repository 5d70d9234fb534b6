#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use config::Config;
use growatt_rs::api;
use growatt_rs::model::Credentials;
use growatt_rs::{Client, Poller};
use metrics::PrometheusChannels;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::{Build, Rocket, State};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

mod metrics;

const COMPONENT_ID: &str = "pvInverter0";
const INTERVAL: u64 = 30;

#[derive(Clone, serde::Deserialize)]
pub struct GrowattConfig {
    id: String,
    enabled: bool,
    api_url: String,
    user_agent: String,
    email: String,
    password: String,
    plant_index: usize,
    interval: u64,
}

type SharedPoller = Arc<Mutex<Poller<PrometheusChannels>>>;

/// Structure containing state for API handlers.
pub struct StateData {
    poller: SharedPoller,
}

pub fn read_settings(
    environment: config::Environment,
) -> Result<GrowattConfig, config::ConfigError> {
    let mut settings = Config::default();
    settings
        .set_default("id", COMPONENT_ID)?
        .set_default("enabled", true)?
        .set_default("api_url", api::API_URL)?
        .set_default("user_agent", api::USER_AGENT)?
        .set_default("plant_index", 0i64)?
        .set_default("interval", INTERVAL as i64)?;
    settings.merge(environment)?;

    settings.try_into()
}

/// Period of the poll loop, `None` when the component is disabled.
fn poll_period(settings: &GrowattConfig) -> Option<Duration> {
    if settings.enabled {
        Some(Duration::from_secs(settings.interval.max(1)))
    } else {
        None
    }
}

/// Poll the plant every `period`; cycles never overlap.
async fn poll_loop(poller: SharedPoller, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let mut poller = poller.lock().await;
        poller.poll().await;
        log::debug!("[{}] {}", poller.id(), &*poller);
    }
}

#[get("/metrics")]
async fn metrics_route() -> Result<String, Status> {
    metrics::read()
}

#[get("/power")]
async fn power_route(state: &State<StateData>) -> Result<String, Custom<String>> {
    let poller = state.poller.lock().await;

    match (poller.last_error(), poller.active_power()) {
        (None, Some(watts)) => Ok(watts.to_string()),
        (Some(e), _) => Err(Custom(Status::ServiceUnavailable, e.to_string())),
        (None, None) => Err(Custom(
            Status::ServiceUnavailable,
            "no reading yet".to_string(),
        )),
    }
}

#[launch]
async fn rocket() -> Rocket<Build> {
    env_logger::init();

    let settings =
        read_settings(config::Environment::with_prefix("GROWATT")).expect("Configuration error");
    let period = poll_period(&settings);
    let credentials = Credentials {
        email: settings.email,
        password: settings.password,
        plant_index: settings.plant_index,
    };
    let client = Client::with_base_url(
        credentials,
        Some(&settings.api_url),
        Some(&settings.user_agent),
    )
    .expect("Cannot create Growatt API client");

    let channels = PrometheusChannels::new(&settings.id);
    let poller = Arc::new(Mutex::new(Poller::new(settings.id.clone(), client, channels)));

    if let Some(period) = period {
        tokio::spawn(poll_loop(poller.clone(), period));
    } else {
        log::info!("[{}] disabled, not polling the Growatt API", settings.id);
    }

    rocket::build()
        .manage(StateData { poller })
        .mount("/", routes![metrics_route, power_route])
}
