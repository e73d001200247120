//! Processor configuration and flow tuning knobs.

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Base API version sent with every processor request.
pub const API_VERSION: &str = "2020-03-02";

const DEFAULT_PRESENTATION_DELAY_MS: u64 = 300;
const DEFAULT_EVENT_BUFFER: usize = 256;
const MIN_EVENT_BUFFER: usize = 16;

/// Opt-in processor API betas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiBeta {
    AlipayV1,
}

impl ApiBeta {
    pub fn code(&self) -> &'static str {
        match self {
            ApiBeta::AlipayV1 => "alipay_beta=v1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersion {
    code: String,
}

impl ApiVersion {
    pub fn get() -> Self {
        Self {
            code: API_VERSION.to_string(),
        }
    }

    /// Appends each beta as `;name=version`. An empty set leaves the code as is.
    pub fn with_betas(&self, betas: &BTreeSet<ApiBeta>) -> Self {
        let mut code = self.code.clone();
        for beta in betas {
            code.push(';');
            code.push_str(beta.code());
        }
        Self { code }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Credentials identifying the merchant to the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    pub publishable_key: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub betas: BTreeSet<ApiBeta>,
}

impl ProcessorConfig {
    pub fn new(publishable_key: impl Into<String>) -> Result<Self> {
        let config = Self {
            publishable_key: publishable_key.into(),
            account_id: None,
            betas: BTreeSet::new(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_betas(mut self, betas: BTreeSet<ApiBeta>) -> Self {
        self.betas = betas;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let key = self.publishable_key.trim();
        if key.is_empty() {
            return Err(FlowError::ValidationError(
                "Publishable key must not be blank".to_string(),
            ));
        }
        if key.starts_with("sk_") {
            return Err(FlowError::ValidationError(
                "Secret keys must not be used as a publishable key".to_string(),
            ));
        }
        Ok(())
    }

    pub fn api_version(&self) -> ApiVersion {
        ApiVersion::get().with_betas(&self.betas)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    /// Delay before the sheet is first shown.
    pub presentation_delay_ms: u64,
    /// Capacity of the event broadcast channels. An observer falling further
    /// behind than this sees `Lagged` and loses the oldest entries.
    pub event_buffer: usize,
}

impl FlowSettings {
    pub fn presentation_delay(&self) -> Duration {
        Duration::from_millis(self.presentation_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_buffer < MIN_EVENT_BUFFER {
            return Err(FlowError::ValidationError(format!(
                "event_buffer must be at least {}, got {}",
                MIN_EVENT_BUFFER, self.event_buffer
            )));
        }
        Ok(())
    }
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            presentation_delay_ms: DEFAULT_PRESENTATION_DELAY_MS,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

/// Contents of the JSON file passed with `--config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub settings: FlowSettings,
}

impl CheckoutConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.processor.validate()?;
        config.settings.validate()?;
        Ok(config)
    }
}
