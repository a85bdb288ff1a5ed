//! Hardware abstraction traits
//!
//! These traits define the interface between the runtime and the concrete
//! drivers. Implementations live in `pettrac-drivers` (register-level
//! peripherals) and `pettrac-hal-linux` (OS facilities).

pub mod clock;
pub mod input;
pub mod power;
pub mod stats;

pub use clock::{Clock, SystemClock};
pub use input::{EdgeListener, InputSampler};
pub use power::{BatterySensor, ShutdownError, ShutdownTrigger};
pub use stats::{SystemStats, SystemStatsSource};
