use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use log::{info, warn};

use crate::bill::DEFAULT_SHOP_NAME;

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub catalog_path: PathBuf,
    pub shop_name: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            host: try_load("CART_HOST", "127.0.0.1".to_string()),
            port: try_load("CART_PORT", 3000),
            catalog_path: PathBuf::from(try_load(
                "CART_CATALOG_PATH",
                "database/products.json".to_string(),
            )),
            shop_name: try_load("CART_SHOP_NAME", DEFAULT_SHOP_NAME.to_string()),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            catalog_path: PathBuf::from("database/products.json"),
            shop_name: DEFAULT_SHOP_NAME.to_string(),
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(raw) = env::var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}
