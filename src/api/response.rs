use crate::api::Error;
use serde::Deserialize;
use serde_json::Value;

/* Response of `newTwoLoginAPI.do` */
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub back: Back,
}

#[derive(Debug, Deserialize)]
pub struct Back {
    pub success: bool,
    pub error: Option<String>,
    /* Plants of the account, only present on success */
    #[serde(default)]
    pub data: Vec<Value>,
}

impl Back {
    /// Plant id of the plant at `index` within `data`.
    pub fn plant_id(&self, index: usize) -> Result<String, Error> {
        let plant = self.data.get(index).ok_or_else(|| {
            Error::Configuration(format!(
                "plant index not valid: {} (account has {} plant(s))",
                index,
                self.data.len()
            ))
        })?;

        /* Accept numeric ids too, the vendor is not consistent about it */
        match plant.get("plantId") {
            Some(Value::String(id)) if !id.is_empty() => Ok(id.to_owned()),
            Some(Value::Number(id)) if id.is_u64() => Ok(id.to_string()),
            _ => Err(Error::Configuration(format!(
                "plant at index {} has no valid plantId; if you have only one plant, use index 0",
                index
            ))),
        }
    }
}

/// Extract `power` of the first inverter in `invList` of a `newTwoPlantAPI.do` response.
pub fn first_inverter_power(value: &Value) -> Result<f64, Error> {
    let inverter = value
        .get("invList")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Protocol("missing device list".to_string()))?
        .first()
        .ok_or_else(|| Error::Protocol("empty device list".to_string()))?;

    /* `power` arrives either as a number or as a numeric string */
    match inverter.get("power") {
        Some(Value::Number(power)) => power.as_f64(),
        Some(Value::String(power)) => power.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|power| power.is_finite())
    .ok_or_else(|| Error::Protocol(format!("missing or non-numeric power in {}", inverter)))
}
