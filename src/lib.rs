#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

mod adapters;
mod callback;
mod config;
pub mod drivers;
mod error;
pub mod regs;
pub mod resolver;
mod tmr_drv;

pub use self::{
    adapters::{priority_field, FixedClock, IrqControl, RegisterBus, SysClock},
    callback::{Callback, CallbackRegistry, Event},
    config::{config_get, Channel, ClockMode, ClockSource, CounterMode, Prescaler, TmrConfig},
    drivers::Mmio,
    error::Error,
    regs::{ChannelRegs, PeripheralMap, RegisterBlock, KL25Z},
    resolver::Resolution,
    tmr_drv::{InitFailure, InitReport, RunState, TmrDrv},
};

#[cfg(feature = "cortex-m")]
pub use self::drivers::NvicIrq;
