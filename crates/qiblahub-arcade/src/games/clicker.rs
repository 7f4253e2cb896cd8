//! Incremental clicker.

use qiblahub_core::error::DomainError;
use serde::Serialize;

/// Price of one upgrade per unit of the current increment.
pub const UPGRADE_COST_FACTOR: u64 = 10;

/// Counter that grows by `increment` per click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clicker {
    count: u64,
    increment: u64,
}

impl Default for Clicker {
    fn default() -> Self {
        Self {
            count: 0,
            increment: 1,
        }
    }
}

impl Clicker {
    /// Zero count, increment 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn increment(&self) -> u64 {
        self.increment
    }

    /// Adds the increment and returns the new count.
    pub fn click(&mut self) -> u64 {
        self.count = self.count.saturating_add(self.increment);
        self.count
    }

    /// Cost of the next upgrade.
    #[must_use]
    pub fn upgrade_cost(&self) -> u64 {
        self.increment.saturating_mul(UPGRADE_COST_FACTOR)
    }

    /// Spends `upgrade_cost()` to raise the increment by one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the count cannot cover the cost.
    pub fn buy_upgrade(&mut self) -> Result<(), DomainError> {
        let cost = self.upgrade_cost();
        if self.count < cost {
            return Err(DomainError::Validation(format!(
                "upgrade costs {cost}, only {} available",
                self.count
            )));
        }
        self.count -= cost;
        self.increment += 1;
        Ok(())
    }
}
