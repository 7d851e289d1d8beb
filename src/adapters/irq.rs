/// The interrupt controller lines used by the timers.
pub trait IrqControl: Send + Sync {
    /// Set the priority of interrupt line `irq`.
    fn set_priority(&self, irq: u16, priority: u8);

    /// Unmask interrupt line `irq`.
    fn enable(&self, irq: u16);

    /// Mask interrupt line `irq`.
    fn disable(&self, irq: u16);
}

/// Encode `priority` for an interrupt controller that implements the
/// `prio_bits` most significant bits of an 8 bit priority field.
///
/// Lower values are more urgent. Levels beyond the implemented range
/// saturate at the least urgent level.
pub const fn priority_field(priority: u8, prio_bits: u8) -> u8 {
    if prio_bits == 0 {
        return 0;
    }
    let prio_bits = if prio_bits > 8 { 8 } else { prio_bits };
    let max = ((1u16 << prio_bits) - 1) as u8;
    let level = if priority > max { max } else { priority };
    ((level as u16) << (8 - prio_bits)) as u8
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn priority_field_uses_upper_bits() {
        assert_eq!(0x00, priority_field(0, 2));
        assert_eq!(0x40, priority_field(1, 2));
        assert_eq!(0xC0, priority_field(3, 2));
        assert_eq!(0x30, priority_field(3, 4));
        assert_eq!(200, priority_field(200, 8));
    }

    #[test]
    fn priority_field_saturates_at_least_urgent() {
        assert_eq!(0xC0, priority_field(4, 2));
        assert_eq!(0xC0, priority_field(255, 2));
        assert_eq!(0xF0, priority_field(16, 4));
    }
}
