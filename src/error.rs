//! Configuration errors
//!
//! Only building an engine can fail. Once configured, [`ingest`] never returns an
//! error: undefined angles are reported as `NaN` and outputs whose inputs are
//! missing are simply not emitted.
//!
//! [`ingest`]: crate::DerivationEngine::ingest

use thiserror::Error;

/// Invalid engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Nothing was subscribed
    #[error("subscription is empty")]
    EmptySubscription,
    /// A raw bitmask contained bits that name no derived quantity
    #[error("unknown subscription bits: {0:#x}")]
    UnknownSubscriptionBits(u32),
    /// Bearings or world vectors were requested without an averaging window
    #[error("history length must be at least 1 when averaged outputs are subscribed")]
    ZeroHistoryLength,
    /// Low-pass coefficient outside (0, 1]
    #[error("low-pass coefficient {0} is outside (0, 1]")]
    InvalidLowPassCoefficient(f32),
}
