use crate::RegisterBus;

/// Memory mapped register access with volatile loads and stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mmio;

impl RegisterBus for Mmio {
    #[inline]
    unsafe fn read(&self, address: u32) -> u32 {
        core::ptr::read_volatile(address as usize as *const u32)
    }

    #[inline]
    unsafe fn write(&self, address: u32, value: u32) {
        core::ptr::write_volatile(address as usize as *mut u32, value)
    }
}
