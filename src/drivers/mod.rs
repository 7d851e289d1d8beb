mod mmio;

#[cfg(feature = "cortex-m")]
mod cortexm;

pub use self::mmio::Mmio;

#[cfg(feature = "cortex-m")]
pub use self::cortexm::NvicIrq;
