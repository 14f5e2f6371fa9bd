//! Pin-strapped converter driver.
//!
//! For boards that wire the converter's EN input and open-drain nFAULT
//! output straight to the MCU instead of exposing its register map.
//!
//! | Signal | Direction | Level            |
//! |--------|-----------|------------------|
//! | EN     | output    | HIGH = enabled   |
//! | nFAULT | input     | LOW  = fault     |
//!
//! The fault line carries one bit, so the board states what it means
//! (e.g. [`ErrorFlags::OVER_CURRENT`] when nFAULT is the OCP output).
//! Pin errors surface as [`ErrorCode::EIO`]; an asserted nFAULT after
//! enabling surfaces as the fault-class [`ErrorCode::EINVAL`].

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::Regulator;
use crate::error::{ErrorCode, ErrorFlags};

pub struct GpioRegulator<EN, FLT> {
    en: EN,
    nfault: FLT,
    fault_meaning: ErrorFlags,
    ready: bool,
}

impl<EN: OutputPin, FLT: InputPin> GpioRegulator<EN, FLT> {
    /// Take the pins, drive EN low, and sample nFAULT once.
    ///
    /// The device is ready only if both pin operations succeed and the
    /// converter is not already signalling a fault at boot.
    pub fn new(mut en: EN, mut nfault: FLT, fault_meaning: ErrorFlags) -> Self {
        let ready = match (en.set_low(), nfault.is_low()) {
            (Ok(()), Ok(false)) => true,
            (Ok(()), Ok(true)) => {
                warn!("gpio regulator: nFAULT asserted at boot");
                false
            }
            _ => {
                warn!("gpio regulator: pin access failed during init");
                false
            }
        };
        Self {
            en,
            nfault,
            fault_meaning,
            ready,
        }
    }

    fn fault_asserted(&mut self) -> Result<bool, ErrorCode> {
        self.nfault.is_low().map_err(|_| ErrorCode::EIO)
    }
}

impl<EN: OutputPin, FLT: InputPin> Regulator for GpioRegulator<EN, FLT> {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn enable(&mut self) -> Result<(), ErrorCode> {
        self.en.set_high().map_err(|_| ErrorCode::EIO)?;
        if self.fault_asserted()? {
            return Err(ErrorCode::EINVAL);
        }
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ErrorCode> {
        self.en.set_low().map_err(|_| ErrorCode::EIO)
    }

    fn read_error_flags(&mut self) -> Result<ErrorFlags, ErrorCode> {
        if self.fault_asserted()? {
            Ok(self.fault_meaning)
        } else {
            Ok(ErrorFlags::empty())
        }
    }
}
