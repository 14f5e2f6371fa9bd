//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter          | Implements      | Connects to                      |
//! |------------------|-----------------|----------------------------------|
//! | `gpio_regulator` | Regulator       | EN / nFAULT pins (embedded-hal)  |
//! | `sim_regulator`  | Regulator       | In-memory simulation             |
//! | `registry`       | DeviceRegistry  | Board wiring table               |
//! | `log_sink`       | EventSink       | Serial log output                |

pub mod gpio_regulator;
pub mod log_sink;
pub mod registry;
pub mod sim_regulator;
