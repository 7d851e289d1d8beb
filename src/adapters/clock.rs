/// The system clock feeding the timer module.
pub trait SysClock {
    /// The clock frequency in Hz.
    fn freq(&self) -> u32;
}

/// A clock with a frequency known up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u32);

impl SysClock for FixedClock {
    #[inline]
    fn freq(&self) -> u32 {
        self.0
    }
}
