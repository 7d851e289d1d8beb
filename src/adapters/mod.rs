mod bus;
mod clock;
mod irq;

#[cfg(test)]
pub(crate) mod fakes;

pub use self::{
    bus::RegisterBus,
    clock::{FixedClock, SysClock},
    irq::{priority_field, IrqControl},
};
