//! Configuration for the decision engines.
//!
//! - Sizing refinement settings (precise mode, Newton budget, tolerances)
//! - Liquidation accounting parameters (fee tier, preview flags)
//! - Named profiles selectable through `AGENT_PROFILE`

mod agent;

pub use agent::{config, init_config, AgentConfig, LiquidationConfig, SizingConfig};
