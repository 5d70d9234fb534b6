use crate::api::{Client, Error};
use std::fmt;

/// Host-side channels fed by the poller once per cycle.
pub trait Channels {
    /// Active power in W, rounded to an integer.
    fn set_active_power(&mut self, watts: i64);

    /// Whether the last poll failed to read a value from the Growatt API.
    fn set_api_failed(&mut self, failed: bool);
}

/// Drives one `Client` once per cycle and maps its outcome onto `Channels`.
///
/// A failed poll never touches the active power, so the last good value stays visible next to
/// the raised fault flag.
pub struct Poller<C: Channels> {
    id: String,
    client: Client,
    channels: C,
    active_power: Option<i64>,
    last_error: Option<Error>,
}

impl<C: Channels> Poller<C> {
    pub fn new(id: impl Into<String>, client: Client, channels: C) -> Self {
        Poller {
            id: id.into(),
            client,
            channels,
            active_power: None,
            last_error: None,
        }
    }

    /// Run a single cycle.
    pub async fn poll(&mut self) {
        match self.client.power_of_plant().await {
            Ok(power) => {
                let watts = round_watts(power);
                self.channels.set_active_power(watts);
                self.channels.set_api_failed(false);
                self.active_power = Some(watts);
                self.last_error = None;
            }
            Err(e) => {
                if e.requires_reconfiguration() {
                    log::error!("[{}] {}", self.id, e);
                } else {
                    log::warn!("[{}] {}", self.id, e);
                }
                self.channels.set_api_failed(true);
                self.last_error = Some(e);
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last successfully read active power.
    pub fn active_power(&self) -> Option<i64> {
        self.active_power
    }

    /// Failure of the last cycle, `None` when it succeeded.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn api_failed(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn channels(&self) -> &C {
        &self.channels
    }
}

/// Nearest integer, halves rounded up (-2.5 becomes -2).
fn round_watts(power: f64) -> i64 {
    (power + 0.5).floor() as i64
}

impl<C: Channels> fmt::Display for Poller<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.active_power {
            Some(watts) => write!(f, "{} W", watts),
            None => write!(f, "-"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{round_watts, Channels, Poller};
    use crate::api::{Client, Error};
    use crate::model::Credentials;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[derive(Default)]
    struct Recorded {
        active_power: Vec<i64>,
        api_failed: Vec<bool>,
    }

    impl Channels for Recorded {
        fn set_active_power(&mut self, watts: i64) {
            self.active_power.push(watts);
        }

        fn set_api_failed(&mut self, failed: bool) {
            self.api_failed.push(failed);
        }
    }

    fn poller(url: &str) -> Poller<Recorded> {
        let credentials = Credentials {
            email: "user@example.com".to_string(),
            password: "password123".to_string(),
            plant_index: 0,
        };
        let client = Client::with_base_url(credentials, Some(url), None).unwrap();
        Poller::new("pvInverter0", client, Recorded::default())
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(1235, round_watts(1234.5));
        assert_eq!(1234, round_watts(1234.49));
        assert_eq!(-2, round_watts(-2.5));
        assert_eq!(-3, round_watts(-2.51));
        assert_eq!(0, round_watts(-0.4));
    }

    #[tokio::test]
    async fn success_rounds_and_clears_fault() {
        let mut server = Server::new_async().await;
        let _login = server
            .mock("POST", "/newTwoLoginAPI.do")
            .with_status(200)
            .with_body(json!({"back": {"success": true, "data": [{"plantId": "AB123"}]}}).to_string())
            .create_async()
            .await;
        let _plant = server
            .mock("GET", "/newTwoPlantAPI.do")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"invList": [{"power": 1234.5}]}).to_string())
            .create_async()
            .await;

        let mut poller = poller(&server.url());
        assert_eq!("-", poller.to_string());
        poller.poll().await;

        assert_eq!(vec![1235], poller.channels().active_power);
        assert_eq!(vec![false], poller.channels().api_failed);
        assert_eq!(Some(1235), poller.active_power());
        assert!(!poller.api_failed());
        assert_eq!("1235 W", poller.to_string());
    }

    #[tokio::test]
    async fn failure_keeps_previous_value() {
        let mut server = Server::new_async().await;
        let _login = server
            .mock("POST", "/newTwoLoginAPI.do")
            .with_status(200)
            .with_body(json!({"back": {"success": true, "data": [{"plantId": "AB123"}]}}).to_string())
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/newTwoPlantAPI.do")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"invList": [{"power": 99.4}]}).to_string())
            .create_async()
            .await;

        let mut poller = poller(&server.url());
        poller.poll().await;
        ok.remove_async().await;

        let _failing = server
            .mock("GET", "/newTwoPlantAPI.do")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"result": 0}).to_string())
            .create_async()
            .await;
        poller.poll().await;

        assert_eq!(vec![99], poller.channels().active_power);
        assert_eq!(vec![false, true], poller.channels().api_failed);
        assert_eq!(Some(99), poller.active_power());
        assert_eq!(
            Some(&Error::Protocol("missing device list".to_string())),
            poller.last_error()
        );
        assert_eq!("99 W", poller.to_string());
    }

    #[tokio::test]
    async fn rejected_login_sets_fault() {
        let mut server = Server::new_async().await;
        let _login = server
            .mock("POST", "/newTwoLoginAPI.do")
            .with_status(200)
            .with_body(json!({"back": {"success": false, "error": "bad credentials"}}).to_string())
            .create_async()
            .await;

        let mut poller = poller(&server.url());
        poller.poll().await;

        assert!(poller.channels().active_power.is_empty());
        assert_eq!(vec![true], poller.channels().api_failed);
        assert!(poller.api_failed());
        assert!(matches!(poller.last_error(), Some(Error::Authentication(_))));
        assert_eq!(None, poller.active_power());
    }
}
