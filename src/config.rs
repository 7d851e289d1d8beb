//! The timer configuration table.
//!
//! Each [`TmrConfig`] row declares the intent for one channel: whether it is
//! armed at init, how it counts, which clock feeds it, the requested
//! prescaler, the interrupt policy and the period in microseconds.
//! The table is read once by [`TmrDrv::init`](crate::TmrDrv::init) and never
//! mutated.

use crate::Error;

/// The timer channels of the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Channel {
    Tmr0 = 0,
    Tmr1 = 1,
    Tmr2 = 2,
}

impl Channel {
    /// The number of timers on the microcontroller.
    pub const COUNT: usize = 3;

    /// All channels in index order.
    pub const ALL: [Channel; Self::COUNT] = [Channel::Tmr0, Channel::Tmr1, Channel::Tmr2];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Channel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Channel::ALL
            .get(value as usize)
            .copied()
            .ok_or(Error::InvalidChannel)
    }
}

/// Counter mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMode {
    /// The counter counts up to the modulo value and wraps to zero.
    UpCount,
    /// The counter counts up to the modulo value and back down to zero.
    UpDown,
}

/// The clock feeding the timer counters.
///
/// The selection is shared by all channels of the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// The channel does not declare a clock source and uses the shared one.
    NotApplicable,
    /// FLL or PLL clock.
    FllPll,
    /// Oscillator clock.
    OscErClk,
    /// Internal reference clock.
    IntClk,
}

impl ClockSource {
    /// The clock source select field value, `None` if nothing is declared.
    pub const fn select_bits(self) -> Option<u32> {
        match self {
            ClockSource::NotApplicable => None,
            ClockSource::FllPll => Some(1),
            ClockSource::OscErClk => Some(2),
            ClockSource::IntClk => Some(3),
        }
    }
}

/// Counter clock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// The counter is disabled.
    Stop,
    /// The counter increments on every counter clock.
    ModuleClk,
    /// The counter increments on the rising edge of the external clock input,
    /// synchronized to the counter clock.
    ExternalClk,
}

impl ClockMode {
    /// The CMOD field value.
    pub const fn cmod_bits(self) -> u32 {
        match self {
            ClockMode::Stop => 0b00,
            ClockMode::ModuleClk => 0b01,
            ClockMode::ExternalClk => 0b10,
        }
    }
}

/// Timer clock input divider.
///
/// Variants are declared in ascending order so that the derived ordering
/// matches the divider value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Prescaler {
    Div1,
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
    Div128,
}

impl Prescaler {
    /// The supported dividers, smallest first.
    pub const ALL: [Prescaler; 8] = [
        Prescaler::Div1,
        Prescaler::Div2,
        Prescaler::Div4,
        Prescaler::Div8,
        Prescaler::Div16,
        Prescaler::Div32,
        Prescaler::Div64,
        Prescaler::Div128,
    ];

    /// The PS field value, i.e. log2 of the divider.
    #[inline]
    pub const fn ps_bits(self) -> u32 {
        self as u32
    }

    /// The divider value.
    #[inline]
    pub const fn divisor(self) -> u32 {
        1 << self.ps_bits()
    }
}

impl TryFrom<u32> for Prescaler {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Prescaler::ALL
            .iter()
            .copied()
            .find(|p| p.divisor() == value)
            .ok_or(Error::InvalidPrescaler)
    }
}

/// Configuration of a single timer channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TmrConfig {
    /// The timer this row configures. Must be unique within the table.
    pub channel: Channel,
    /// Whether the channel is running after init.
    pub enabled: bool,
    pub mode: CounterMode,
    /// All channels must use the same clock source. Channels that do not
    /// own the clock use [`ClockSource::NotApplicable`].
    pub clock_source: ClockSource,
    /// The clock mode used when the channel is started by init.
    pub clock_mode: ClockMode,
    /// Requested divider. Init may pick a larger one to fit the interval.
    pub prescaler: Prescaler,
    pub int_enabled: bool,
    pub int_priority: u8,
    /// Timer period in microseconds. Zero is only allowed on a disabled
    /// channel.
    ///
    /// This is the up-count period of MOD + 1 prescaled ticks. In
    /// [`CounterMode::UpDown`] the counter turns around at MOD and counts back
    /// to zero, so the overflow period is twice the interval.
    pub interval_us: u32,
}

// Timer  Timer     Timer     Clock           Clock Mode  Clock      Interrupt  Interrupt  Timer
// Name   Enable    Mode      Source          Selection   Prescaler  Enable     Priority   Interval (us)
static TMR_CONFIG: [TmrConfig; 3] = [
    TmrConfig {
        channel: Channel::Tmr0,
        enabled: true,
        mode: CounterMode::UpCount,
        clock_source: ClockSource::FllPll,
        clock_mode: ClockMode::ModuleClk,
        prescaler: Prescaler::Div1,
        int_enabled: false,
        int_priority: 3,
        interval_us: 100,
    },
    TmrConfig {
        channel: Channel::Tmr1,
        enabled: false,
        mode: CounterMode::UpCount,
        clock_source: ClockSource::NotApplicable,
        clock_mode: ClockMode::Stop,
        prescaler: Prescaler::Div1,
        int_enabled: false,
        int_priority: 0,
        interval_us: 0,
    },
    TmrConfig {
        channel: Channel::Tmr2,
        enabled: true,
        mode: CounterMode::UpCount,
        clock_source: ClockSource::FllPll,
        clock_mode: ClockMode::ModuleClk,
        prescaler: Prescaler::Div1,
        int_enabled: false,
        int_priority: 3,
        interval_us: 100,
    },
];

/// Get the timer configuration table.
///
/// ```
/// let config = tmr_drv::config_get();
/// assert_eq!(3, config.len());
/// ```
pub fn config_get() -> &'static [TmrConfig] {
    &TMR_CONFIG
}
