//! Shared modem state handed to every receive and transmit call

use crate::access::ChannelAccess;
use crate::config::ModemConfig;
use crate::error::Il2pError;

/// Configuration plus the state the receive and transmit paths share
#[derive(Debug, Clone)]
pub struct Context {
    /// Read-only modem parameters
    pub config: ModemConfig,
    /// Carrier detect and slot arbitration
    pub channel: ChannelAccess,
    /// Transmitter keyed
    pub transmitting: bool,
}

impl Context {
    /// Validate `config` and build a fresh context
    pub fn new(config: ModemConfig) -> Result<Self, Il2pError> {
        config.validate()?;
        let channel = ChannelAccess::new(config.p_persist, config.slot_samples());
        Ok(Self {
            config,
            channel,
            transmitting: false,
        })
    }

    /// Whether a queued frame may start now
    pub fn can_transmit(&self) -> bool {
        self.config.duplex || self.channel.can_tx()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_config() {
        let config = ModemConfig {
            symbol_length: 0,
            ..ModemConfig::default()
        };
        assert!(Context::new(config).is_err());
    }

    #[test]
    fn test_duplex_always_transmits() {
        let mut ctx = Context::new(ModemConfig {
            duplex: true,
            ..ModemConfig::default()
        })
        .unwrap();
        ctx.channel.set_dcd(true);
        assert!(ctx.can_transmit());
    }

    #[test]
    fn test_half_duplex_waits_for_slot() {
        let ctx = Context::new(ModemConfig::default()).unwrap();
        assert!(!ctx.can_transmit());
    }
}
