//! Static device registry.
//!
//! Board bring-up registers each regulator under its node label; the
//! sequencer later resolves them by label. Resolving hands out ownership,
//! so a device can be resolved at most once.

use log::debug;

use crate::app::ports::{DeviceRegistry, Regulator};
use crate::config::{label, ConfigError, Label};

/// Fixed-capacity label → device table.
pub struct StaticRegistry<D, const N: usize> {
    entries: heapless::Vec<(Label, D), N>,
}

impl<D, const N: usize> Default for StaticRegistry<D, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, const N: usize> StaticRegistry<D, N> {
    pub const fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
        }
    }

    /// Register `device` under `name`.
    pub fn register(&mut self, name: &str, device: D) -> Result<(), RegistryError> {
        let name = label(name).map_err(RegistryError::Label)?;
        if self.contains(&name) {
            return Err(RegistryError::Duplicate);
        }
        self.entries
            .push((name, device))
            .map_err(|_| RegistryError::Full)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(l, _)| l == name)
    }
}

impl<D: Regulator, const N: usize> DeviceRegistry for StaticRegistry<D, N> {
    type Device = D;

    fn resolve(&mut self, name: &str) -> Option<D> {
        let idx = self.entries.iter().position(|(l, _)| l == name);
        let Some(idx) = idx else {
            debug!("registry: \"{}\" not populated", name);
            return None;
        };
        let (_, device) = self.entries.swap_remove(idx);
        Some(device)
    }
}

/// Why a device could not be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// All `N` slots are taken.
    Full,
    /// The label is already registered.
    Duplicate,
    /// The label does not fit.
    Label(ConfigError),
}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "registry full"),
            Self::Duplicate => write!(f, "label already registered"),
            Self::Label(e) => write!(f, "bad label: {}", e),
        }
    }
}

impl core::error::Error for RegistryError {}
