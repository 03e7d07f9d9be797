//! Agent configuration with profile support.

use alloy::primitives::U256;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Profile name (for logging/identification)
    #[serde(default = "default_profile_name")]
    pub profile: String,

    #[serde(default)]
    pub sizing: SizingConfig,

    #[serde(default)]
    pub liquidation: LiquidationConfig,
}

fn default_profile_name() -> String {
    "default".to_string()
}

/// Price-matching sizing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Refine the closed-form estimate through the quote oracle
    #[serde(default = "default_precise")]
    pub precise: bool,

    /// Newton iteration budget (each iteration costs two quotes)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Step tolerance relative to the current size
    #[serde(default = "default_relative_tolerance")]
    pub relative_tolerance: f64,

    /// Step tolerance in token units
    #[serde(default = "default_absolute_tolerance")]
    pub absolute_tolerance: f64,
}

fn default_precise() -> bool {
    true
}
fn default_max_iterations() -> u32 {
    5
}
fn default_relative_tolerance() -> f64 {
    1e-9
}
fn default_absolute_tolerance() -> f64 {
    1.0
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            precise: default_precise(),
            max_iterations: default_max_iterations(),
            relative_tolerance: default_relative_tolerance(),
            absolute_tolerance: default_absolute_tolerance(),
        }
    }
}

/// Liquidation accounting parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationConfig {
    /// Fee tier of the pool used to cover debt (hundredths of a bip)
    #[serde(default = "default_uniswap_fee")]
    pub uniswap_fee: u32,

    /// `receiveAToken` flag passed to the preview
    #[serde(default = "default_receive_a_token")]
    pub receive_a_token_on_preview: bool,

    /// Debt amount proposed when liquidating "as much as possible"
    /// (decimal or 0x-hex string; the pool caps it at the close factor)
    #[serde(default = "default_max_debt_to_cover")]
    pub max_debt_to_cover: U256,
}

fn default_uniswap_fee() -> u32 {
    3000
}
fn default_receive_a_token() -> bool {
    true
}
fn default_max_debt_to_cover() -> U256 {
    U256::from(10u64).pow(U256::from(32u64))
}

impl Default for LiquidationConfig {
    fn default() -> Self {
        Self {
            uniswap_fee: default_uniswap_fee(),
            receive_a_token_on_preview: default_receive_a_token(),
            max_debt_to_cover: default_max_debt_to_cover(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            profile: default_profile_name(),
            sizing: SizingConfig::default(),
            liquidation: LiquidationConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Closed-form sizing only; no quote calls during sizing.
    pub fn fast() -> Self {
        Self {
            profile: "fast".to_string(),
            sizing: SizingConfig {
                precise: false,
                ..Default::default()
            },
            liquidation: LiquidationConfig::default(),
        }
    }

    /// Larger Newton budget and tighter tolerance.
    pub fn thorough() -> Self {
        Self {
            profile: "thorough".to_string(),
            sizing: SizingConfig {
                precise: true,
                max_iterations: 12,
                relative_tolerance: 1e-12,
                absolute_tolerance: 1.0,
            },
            liquidation: LiquidationConfig::default(),
        }
    }

    /// Get profile from environment variable AGENT_PROFILE, or default.
    /// Supported values: fast, thorough
    pub fn from_env() -> Self {
        let profile = std::env::var("AGENT_PROFILE").unwrap_or_else(|_| "default".to_string());
        Self::from_profile(&profile)
    }

    pub fn from_profile(profile: &str) -> Self {
        match profile.to_lowercase().as_str() {
            "fast" => Self::fast(),
            "thorough" | "precise" => Self::thorough(),
            _ => Self::default(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sizing.precise && self.sizing.max_iterations == 0 {
            anyhow::bail!("sizing.max_iterations must be positive when sizing.precise is set");
        }
        if self.sizing.relative_tolerance < 0.0 || self.sizing.absolute_tolerance < 0.0 {
            anyhow::bail!("sizing tolerances must be non-negative");
        }
        if self.liquidation.max_debt_to_cover.is_zero() {
            anyhow::bail!("max_debt_to_cover must be positive");
        }
        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        tracing::info!(profile = %self.profile, "Agent configuration loaded");
        tracing::info!(
            precise = self.sizing.precise,
            max_iterations = self.sizing.max_iterations,
            relative_tolerance = self.sizing.relative_tolerance,
            absolute_tolerance = self.sizing.absolute_tolerance,
            "Sizing parameters"
        );
        tracing::info!(
            uniswap_fee = self.liquidation.uniswap_fee,
            receive_a_token = self.liquidation.receive_a_token_on_preview,
            max_debt_to_cover = %self.liquidation.max_debt_to_cover,
            "Liquidation parameters"
        );
    }
}

static GLOBAL_CONFIG: OnceLock<AgentConfig> = OnceLock::new();

/// Initialize global configuration.
pub fn init_config(config: AgentConfig) {
    let _ = GLOBAL_CONFIG.set(config);
}

/// Get the global configuration, initializing from environment if needed.
pub fn config() -> &'static AgentConfig {
    GLOBAL_CONFIG.get_or_init(AgentConfig::from_env)
}
