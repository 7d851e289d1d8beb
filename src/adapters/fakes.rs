use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Mutex,
    vec::Vec,
};

use crate::{IrqControl, RegisterBus};

#[derive(Default)]
struct FakeBusState {
    regs: BTreeMap<u32, u32>,
    w1c: BTreeMap<u32, u32>,
    writes: Vec<(u32, u32)>,
}

/// Register space backed by a map. Unwritten registers read as zero.
#[derive(Default)]
pub struct FakeBus(Mutex<FakeBusState>);

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat the bits in `mask` of the register at `address` as write-1-to-clear.
    pub fn with_w1c(self, address: u32, mask: u32) -> Self {
        self.0.lock().unwrap().w1c.insert(address, mask);
        self
    }

    /// Change a register as the hardware would, without recording a write.
    pub fn poke(&self, address: u32, value: u32) {
        self.0.lock().unwrap().regs.insert(address, value);
    }

    pub fn peek(&self, address: u32) -> u32 {
        self.0.lock().unwrap().regs.get(&address).copied().unwrap_or(0)
    }

    /// All writes in the order they were issued.
    pub fn writes(&self) -> Vec<(u32, u32)> {
        self.0.lock().unwrap().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.0.lock().unwrap().writes.clear();
    }

    pub fn snapshot(&self) -> BTreeMap<u32, u32> {
        self.0.lock().unwrap().regs.clone()
    }
}

impl RegisterBus for FakeBus {
    unsafe fn read(&self, address: u32) -> u32 {
        self.peek(address)
    }

    unsafe fn write(&self, address: u32, value: u32) {
        let mut state = self.0.lock().unwrap();
        let mask = state.w1c.get(&address).copied().unwrap_or(0);
        let old = state.regs.get(&address).copied().unwrap_or(0);
        let new = (value & !mask) | (old & mask & !value);
        state.regs.insert(address, new);
        state.writes.push((address, value));
    }
}

#[derive(Default)]
struct FakeIrqState {
    priorities: BTreeMap<u16, u8>,
    enabled: BTreeSet<u16>,
}

/// Interrupt controller recording priorities and masks.
#[derive(Default)]
pub struct FakeIrq(Mutex<FakeIrqState>);

impl FakeIrq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn priority(&self, irq: u16) -> Option<u8> {
        self.0.lock().unwrap().priorities.get(&irq).copied()
    }

    pub fn is_enabled(&self, irq: u16) -> bool {
        self.0.lock().unwrap().enabled.contains(&irq)
    }
}

impl IrqControl for FakeIrq {
    fn set_priority(&self, irq: u16, priority: u8) {
        self.0.lock().unwrap().priorities.insert(irq, priority);
    }

    fn enable(&self, irq: u16) {
        self.0.lock().unwrap().enabled.insert(irq);
    }

    fn disable(&self, irq: u16) {
        self.0.lock().unwrap().enabled.remove(&irq);
    }
}
