//! Runtime settings for the token and network the app pays on.

use alloy_primitives::{address, Address};
use serde::Deserialize;
use wasm_bindgen::JsValue;

/// Name of the optional global object the hosting page can define to override defaults.
pub const WINDOW_CONFIG_KEY: &str = "ARC_PAY_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub token_address: Address,
    pub token_decimals: u8,
    pub token_symbol: String,
    pub network_name: String,
    pub chain_id: u64,
    /// Reject connections whose wallet reports a different chain id.
    pub enforce_network: bool,
    pub poll_interval_ms: u32,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            token_address: address!("3600000000000000000000000000000000000000"),
            token_decimals: 6,
            token_symbol: "USDC".to_string(),
            network_name: "Arc".to_string(),
            chain_id: 5042002,
            enforce_network: false,
            poll_interval_ms: 2000,
        }
    }
}

impl Config {
    pub fn from_window() -> Config {
        let overrides = web_sys::window()
            .and_then(|window| js_sys::Reflect::get(&window, &JsValue::from_str(WINDOW_CONFIG_KEY)).ok())
            .filter(|value| !value.is_undefined() && !value.is_null());

        match overrides {
            Some(value) => match serde_wasm_bindgen::from_value::<Config>(value) {
                Ok(config) => {
                    log::debug!("config: {:?}", config);
                    config
                }
                Err(err) => {
                    log::warn!("ignoring malformed {}: {}", WINDOW_CONFIG_KEY, err);
                    Config::default()
                }
            },
            None => Config::default(),
        }
    }
}
