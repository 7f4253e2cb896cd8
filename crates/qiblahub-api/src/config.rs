//! Server configuration read from the environment.

use qiblahub_compass::{GeoPoint, KAABA};

use crate::error::AppError;

/// Settings read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub database_max_connections: u32,
    /// Point the compass aims at.
    pub qibla_target: GeoPoint,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_owned())
            .parse::<u32>()
            .map_err(|e| {
                AppError::Config(format!("DATABASE_MAX_CONNECTIONS must be a valid u32: {e}"))
            })?;
        let qibla_target = match (
            lookup("QIBLA_TARGET_LATITUDE"),
            lookup("QIBLA_TARGET_LONGITUDE"),
        ) {
            (None, None) => KAABA,
            (Some(latitude), Some(longitude)) => parse_target(&latitude, &longitude)?,
            _ => {
                return Err(AppError::Config(
                    "QIBLA_TARGET_LATITUDE and QIBLA_TARGET_LONGITUDE must be set together"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            qibla_target,
        })
    }
}

fn parse_target(latitude: &str, longitude: &str) -> Result<GeoPoint, AppError> {
    let latitude = latitude
        .parse::<f64>()
        .map_err(|e| AppError::Config(format!("QIBLA_TARGET_LATITUDE must be a number: {e}")))?;
    let longitude = longitude
        .parse::<f64>()
        .map_err(|e| AppError::Config(format!("QIBLA_TARGET_LONGITUDE must be a number: {e}")))?;
    GeoPoint::new(latitude, longitude).map_err(|e| AppError::Config(e.to_string()))
}
