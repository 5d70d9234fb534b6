pub mod endpoint;
pub mod error;
pub mod password;
pub mod response;

use crate::model;
pub use error::Error;
use http::header::CONTENT_TYPE;
use reqwest::Response;
use response::LoginResponse;
use serde_json::Value;

pub const API_URL: &str = "https://openapi.growatt.com";

/* The vendor rejects generic agent strings */
pub const USER_AGENT: &str =
    "Mozilla/5.0 (platform; rv:geckoversion) Gecko/geckotrail Firefox/firefoxversion";

/// Client for the Growatt cloud API of a single plant.
///
/// Owns a cookie-bearing HTTP session, so it must not be shared with other API clients. Calls
/// take `&mut self`; callers serialize access.
#[derive(Debug)]
pub struct Client {
    api_url: String,
    credentials: model::Credentials,
    session: model::Session,
    client: reqwest::Client,
}

impl Client {
    pub fn new(credentials: model::Credentials) -> Result<Self, Error> {
        Self::with_base_url(credentials, None, None)
    }

    /// Build a client against `api_url` with `user_agent`, falling back to the vendor defaults.
    pub fn with_base_url(
        credentials: model::Credentials,
        api_url: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .cookie_store(true)
            .user_agent(user_agent.unwrap_or(USER_AGENT))
            .build()
            .map_err(|e| Error::Configuration(format!("cannot build HTTP client: {}", e)))?;

        Ok(Client {
            api_url: api_url.unwrap_or(API_URL).trim_end_matches('/').to_owned(),
            credentials,
            session: model::Session::default(),
            client,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.session, model::Session::Authenticated { .. })
    }

    pub fn plant_id(&self) -> Option<&str> {
        self.session.plant_id()
    }

    /// Current AC power of the plant, logging in first when there is no session yet.
    pub async fn power_of_plant(&mut self) -> Result<f64, Error> {
        if !self.is_authenticated() {
            self.login().await?;
        }

        self.query_plant_power().await
    }

    /// Log in and resolve the plant id at the configured plant index.
    ///
    /// The session is replaced only once both succeeded. Any failure leaves it unauthenticated.
    async fn login(&mut self) -> Result<(), Error> {
        self.session = model::Session::Unauthenticated;

        let url = format!("{}{}", self.api_url, endpoint::LOGIN);
        let password = password::hash_password(&self.credentials.password);
        let request_body = [
            ("userName", self.credentials.email.as_str()),
            ("password", password.as_str()),
        ];

        let response = self.client.post(url).form(&request_body).send().await?;
        let value = read_json(endpoint::LOGIN, response).await?;

        let login = serde_json::from_value::<LoginResponse>(value)
            .map_err(|e| Error::Protocol(format!("invalid login response: {}", e)))?;

        if !login.back.success {
            return Err(Error::Authentication(login.back.error.unwrap_or_else(|| {
                "(no error message received)".to_string()
            })));
        }

        let plant_id = login.back.plant_id(self.credentials.plant_index)?;
        log::info!(
            "Logged in to Growatt API as {}, plant {} at index {}",
            self.credentials.email,
            plant_id,
            self.credentials.plant_index
        );
        self.session = model::Session::Authenticated { plant_id };

        Ok(())
    }

    /// Power of the first inverter of the session's plant, as reported by the vendor.
    async fn query_plant_power(&self) -> Result<f64, Error> {
        let plant_id = self
            .session
            .plant_id()
            .ok_or_else(|| Error::Authentication("not logged in".to_string()))?;
        let url = format!("{}{}", self.api_url, endpoint::PLANT);
        let page_num = endpoint::PAGE_NUM.to_string();
        let page_size = endpoint::PAGE_SIZE.to_string();
        let query = [
            ("op", endpoint::OP_DEVICE_LIST),
            ("plantId", plant_id),
            ("pageNum", page_num.as_str()),
            ("pageSize", page_size.as_str()),
        ];

        let response = self
            .client
            .get(url)
            .query(&query)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let value = read_json(endpoint::PLANT, response).await?;
        let power = response::first_inverter_power(&value)?;
        log::debug!("Plant {} reports {} W", plant_id, power);

        Ok(power)
    }
}

/// Read a 2xx response of `endpoint` as JSON. Non-2xx responses become transport errors carrying
/// status and body.
async fn read_json(endpoint: &endpoint::Endpoint, response: Response) -> Result<Value, Error> {
    let status = response.status();
    let text = response.text().await?;

    log::trace!(
        "endpoint: {}, status: {}, response_text: {}",
        endpoint,
        status,
        text
    );

    if !status.is_success() {
        return Err(Error::Transport {
            status: Some(status.as_u16()),
            message: text,
        });
    }

    serde_json::from_str::<Value>(&text)
        .map_err(|e| Error::Protocol(format!("{} returned invalid JSON ({}): {}", endpoint, e, text)))
}
