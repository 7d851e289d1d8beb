use thiserror::Error;

/// Errors reported by the timer driver.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The raw channel id does not name a known timer.
    #[error("unknown timer channel")]
    InvalidChannel,
    /// The raw divider is not one of the supported prescalers.
    #[error("unsupported prescaler")]
    InvalidPrescaler,
    /// The channel appears more than once in the configuration table.
    #[error("channel configured more than once")]
    DuplicateChannel,
    /// The channel declares a clock source different from the shared one.
    #[error("clock source disagrees with the shared clock source")]
    ClockSourceMismatch,
    /// An enabled channel would be started with its counter stopped.
    #[error("enabled channel with stopped clock mode")]
    InvalidClockMode,
    /// No entry selects the shared counter clock, so no counter can run.
    #[error("no channel selects a clock source")]
    NoClockSource,
    /// No prescaler yields a modulo count within the counter range.
    #[error("interval cannot be represented by any prescaler")]
    UnrepresentableInterval,
    /// Zero interval on an enabled channel.
    #[error("zero interval on an enabled channel")]
    InvalidInterval,
    /// The channel has not been (successfully) initialized.
    #[error("channel is not initialized")]
    NotInitialized,
    /// The peripheral map does not describe a sane register layout.
    #[error("invalid peripheral register map")]
    InvalidRegisterMap,
}
