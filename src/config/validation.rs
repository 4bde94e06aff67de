//! Configuration validation.
//!
//! Serde handles syntax; this checks values. All problems are reported at once.

use std::fmt;

use crate::blockchain::codec::decode_hex;
use crate::config::schema::InscriberConfig;

/// A single semantic problem with a config value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &InscriberConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rpc.url.is_empty() {
        errors.push(ValidationError::new("rpc.url", "must not be empty"));
    } else if url::Url::parse(&config.rpc.url).is_err() {
        errors.push(ValidationError::new("rpc.url", "not a valid URL"));
    }

    let inscription = &config.inscription;

    if !is_decimal(&inscription.gas_price) {
        errors.push(ValidationError::new(
            "inscription.gas_price",
            "must be a non-empty decimal wei amount",
        ));
    }
    if !inscription.gas_limit.is_empty() && !is_decimal(&inscription.gas_limit) {
        errors.push(ValidationError::new("inscription.gas_limit", "must be decimal"));
    }
    if !inscription.max_priority_fee_per_gas.is_empty()
        && !is_decimal(&inscription.max_priority_fee_per_gas)
    {
        errors.push(ValidationError::new(
            "inscription.max_priority_fee_per_gas",
            "must be decimal",
        ));
    }
    if let Some(data) = &inscription.data {
        if decode_hex(data).is_err() {
            errors.push(ValidationError::new("inscription.data", "must be hex"));
        }
    }
    if inscription.times == 0 {
        errors.push(ValidationError::new("inscription.times", "must be at least 1"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&InscriberConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = InscriberConfig::default();
        config.rpc.url = String::new();
        config.inscription.gas_price = "30 gwei".to_string();
        config.inscription.data = Some("0xnothex".to_string());
        config.inscription.times = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "rpc.url",
                "inscription.gas_price",
                "inscription.data",
                "inscription.times"
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = InscriberConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
