use cortex_m::{interrupt::InterruptNumber, peripheral::NVIC, Peripherals};

use crate::{priority_field, IrqControl};

#[derive(Debug, Clone, Copy)]
struct IrqNumber(u16);

// Safety: The numbers come from the peripheral map, which only names device interrupts.
unsafe impl InterruptNumber for IrqNumber {
    #[inline]
    fn number(self) -> u16 {
        self.0
    }
}

/// Cortex-M NVIC.
#[derive(Debug, Clone, Copy)]
pub struct NvicIrq {
    prio_bits: u8,
}

impl NvicIrq {
    /// Create an NVIC adapter for a core implementing `prio_bits` priority bits,
    /// e.g. 2 on a Cortex-M0+.
    ///
    /// # Panics
    ///
    /// If `prio_bits` is not within `1..=8`.
    pub const fn new(prio_bits: u8) -> Self {
        assert!(prio_bits > 0 && prio_bits <= 8);
        Self { prio_bits }
    }
}

impl IrqControl for NvicIrq {
    fn set_priority(&self, irq: u16, priority: u8) {
        let prio = priority_field(priority, self.prio_bits);
        critical_section::with(|_| unsafe {
            Peripherals::steal().NVIC.set_priority(IrqNumber(irq), prio);
        });
    }

    fn enable(&self, irq: u16) {
        unsafe { NVIC::unmask(IrqNumber(irq)) }
    }

    fn disable(&self, irq: u16) {
        NVIC::mask(IrqNumber(irq));
    }
}
