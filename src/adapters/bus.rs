/// Access to the peripheral register space.
///
/// Addresses are absolute 32 bit bus addresses.
pub trait RegisterBus: Send + Sync {
    /// Read the register at `address`.
    ///
    /// # Safety
    ///
    /// `address` must be a readable, aligned register of the peripheral.
    unsafe fn read(&self, address: u32) -> u32;

    /// Write `value` to the register at `address`.
    ///
    /// # Safety
    ///
    /// `address` must be a writable, aligned register of the peripheral.
    unsafe fn write(&self, address: u32, value: u32);

    /// Read-modify-write the register at `address`.
    ///
    /// # Safety
    ///
    /// Same as [`RegisterBus::read`] and [`RegisterBus::write`]. The caller must
    /// make sure nothing else writes the register between the read and the write.
    #[inline]
    unsafe fn modify<F: FnOnce(u32) -> u32>(&self, address: u32, f: F) {
        let value = self.read(address);
        self.write(address, f(value));
    }
}
