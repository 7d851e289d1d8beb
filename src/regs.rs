//! Register layout of the timer/PWM module.
//!
//! A [`PeripheralMap`] maps each logical [`Channel`] to the register block of
//! its timer instance together with the shared clock-source and clock-gating
//! registers. The map is platform data; [`KL25Z`] describes the Kinetis L
//! parts the configuration schema was written for.

use crate::{Channel, Error};

/// Status and control register fields.
pub mod sc {
    /// Prescale factor selection.
    pub const PS_MASK: u32 = 0b111;
    pub const CMOD_SHIFT: u32 = 3;
    /// Clock mode selection.
    pub const CMOD_MASK: u32 = 0b11 << CMOD_SHIFT;
    /// Center-aligned (up-down) counting.
    pub const CPWMS: u32 = 1 << 5;
    /// Timer overflow interrupt enable.
    pub const TOIE: u32 = 1 << 6;
    /// Timer overflow flag, write 1 to clear.
    pub const TOF: u32 = 1 << 7;
}

/// Timer clock source select field of the shared clock-source register.
pub const CLKSRC_SHIFT: u32 = 24;
pub const CLKSRC_MASK: u32 = 0b11 << CLKSRC_SHIFT;

/// The registers of one timer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterBlock {
    pub base: u32,
}

impl RegisterBlock {
    pub const SC: u32 = 0x00;
    pub const CNT: u32 = 0x04;
    pub const MOD: u32 = 0x08;
    pub const STATUS: u32 = 0x50;
    pub const CONF: u32 = 0x84;
    /// The size of the block in bytes.
    pub const SPAN: u32 = 0x88;

    pub const fn new(base: u32) -> Self {
        Self { base }
    }

    #[inline]
    pub const fn sc(&self) -> u32 {
        self.base + Self::SC
    }

    #[inline]
    pub const fn cnt(&self) -> u32 {
        self.base + Self::CNT
    }

    #[inline]
    pub const fn modulo(&self) -> u32 {
        self.base + Self::MOD
    }

    #[inline]
    pub const fn status(&self) -> u32 {
        self.base + Self::STATUS
    }

    #[inline]
    pub const fn conf(&self) -> u32 {
        self.base + Self::CONF
    }

    const fn end(&self) -> u64 {
        self.base as u64 + Self::SPAN as u64
    }
}

/// Everything the driver needs to know about one channel's hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRegs {
    pub block: RegisterBlock,
    /// The bit in the clock-gating register enabling this instance.
    pub gate_bit: u8,
    /// The interrupt line of this instance.
    pub irq: u16,
}

/// The timer module's location in the memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralMap {
    pub channels: [ChannelRegs; Channel::COUNT],
    /// Shared clock-source select register.
    pub clock_source: u32,
    /// Shared clock-gating register.
    pub clock_gate: u32,
    /// First address of the peripheral address space.
    pub window_start: u32,
    /// One past the last address of the peripheral address space.
    pub window_end: u32,
}

/// Kinetis KL25Z: TPM0..2, SIM_SOPT2 and SIM_SCGC6.
pub const KL25Z: PeripheralMap = PeripheralMap {
    channels: [
        ChannelRegs {
            block: RegisterBlock::new(0x4003_8000),
            gate_bit: 24,
            irq: 17,
        },
        ChannelRegs {
            block: RegisterBlock::new(0x4003_9000),
            gate_bit: 25,
            irq: 18,
        },
        ChannelRegs {
            block: RegisterBlock::new(0x4003_A000),
            gate_bit: 26,
            irq: 19,
        },
    ],
    clock_source: 0x4004_8004,
    clock_gate: 0x4004_803C,
    window_start: 0x4000_0000,
    window_end: 0x4008_0000,
};

impl PeripheralMap {
    /// Get the registers of `channel`.
    #[inline]
    pub const fn channel(&self, channel: Channel) -> &ChannelRegs {
        &self.channels[channel.index()]
    }

    /// Check the map against the peripheral address space.
    ///
    /// Every register must be word aligned and inside the window, register
    /// blocks must not overlap each other or the shared registers, and gating
    /// bits and interrupt lines must be distinct.
    pub fn validate(&self) -> Result<(), Error> {
        let in_window = |start: u32, end: u64| {
            start >= self.window_start && end <= self.window_end as u64 && start % 4 == 0
        };

        if self.window_start >= self.window_end
            || !in_window(self.clock_source, self.clock_source as u64 + 4)
            || !in_window(self.clock_gate, self.clock_gate as u64 + 4)
            || self.clock_source == self.clock_gate
        {
            return Err(Error::InvalidRegisterMap);
        }

        for (i, ch) in self.channels.iter().enumerate() {
            let block = &ch.block;
            if !in_window(block.base, block.end()) || ch.gate_bit >= 32 {
                return Err(Error::InvalidRegisterMap);
            }

            for shared in [self.clock_source, self.clock_gate] {
                if shared >= block.base && (shared as u64) < block.end() {
                    return Err(Error::InvalidRegisterMap);
                }
            }

            for other in &self.channels[i + 1..] {
                let overlaps = (block.base as u64) < other.block.end()
                    && (other.block.base as u64) < block.end();
                if overlaps || ch.gate_bit == other.gate_bit || ch.irq == other.irq {
                    return Err(Error::InvalidRegisterMap);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn kl25z_is_valid() {
        assert_eq!(Ok(()), KL25Z.validate());
    }

    #[test]
    fn block_offsets() {
        let tpm1 = KL25Z.channel(Channel::Tmr1).block;

        assert_eq!(0x4003_9000, tpm1.sc());
        assert_eq!(0x4003_9004, tpm1.cnt());
        assert_eq!(0x4003_9008, tpm1.modulo());
        assert_eq!(0x4003_9050, tpm1.status());
        assert_eq!(0x4003_9084, tpm1.conf());
    }

    #[test]
    fn overlapping_blocks_are_rejected() {
        let mut map = KL25Z;
        map.channels[1].block = RegisterBlock::new(0x4003_8040);

        assert_eq!(Err(Error::InvalidRegisterMap), map.validate());
    }

    #[test]
    fn misaligned_block_is_rejected() {
        let mut map = KL25Z;
        map.channels[2].block = RegisterBlock::new(0x4003_A002);

        assert_eq!(Err(Error::InvalidRegisterMap), map.validate());
    }

    #[test]
    fn block_outside_window_is_rejected() {
        let mut map = KL25Z;
        map.channels[0].block = RegisterBlock::new(0x2000_0000);

        assert_eq!(Err(Error::InvalidRegisterMap), map.validate());
    }

    #[test]
    fn shared_gate_bit_is_rejected() {
        let mut map = KL25Z;
        map.channels[2].gate_bit = 24;

        assert_eq!(Err(Error::InvalidRegisterMap), map.validate());
    }

    #[test]
    fn shared_register_inside_block_is_rejected() {
        let mut map = KL25Z;
        map.clock_gate = 0x4003_9010;

        assert_eq!(Err(Error::InvalidRegisterMap), map.validate());
    }
}
