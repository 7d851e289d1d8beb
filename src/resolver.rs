//! Conversion of a requested period into prescaler and modulo register values.

use crate::{Error, Prescaler, TmrConfig};

/// The maximum value of the 16 bit counter.
pub const COUNTER_MAX: u32 = 0xFFFF;

const US_PER_SECOND: u64 = 1_000_000;
const NS_PER_SECOND: u64 = 1_000_000_000;

/// The register values that realize a requested interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The value for the modulo register.
    pub mod_count: u32,
    /// The prescaler actually programmed.
    pub prescaler: Prescaler,
}

impl Resolution {
    /// The counter period in input clock cycles.
    pub const fn cycles(&self) -> u64 {
        (self.mod_count as u64 + 1) * self.prescaler.divisor() as u64
    }

    /// The period realized by these register values when clocked by `fsys` Hz,
    /// rounded to the nearest nanosecond. `None` for a stopped clock.
    pub fn realized_interval_ns(&self, fsys: u32) -> Option<u64> {
        if fsys == 0 {
            return None;
        }
        let fsys = fsys as u64;
        Some((self.cycles() * NS_PER_SECOND + fsys / 2) / fsys)
    }
}

/// Resolve `interval_us` for a 16 bit counter clocked by `fsys` Hz.
///
/// The requested prescaler is used if the resulting modulo count fits the
/// counter, otherwise the next larger dividers are tried in order.
pub fn resolve(fsys: u32, interval_us: u32, prescaler: Prescaler) -> Result<Resolution, Error> {
    resolve_with_max(fsys, interval_us, prescaler, COUNTER_MAX)
}

/// Resolve `interval_us` for a counter whose largest value is `counter_max`.
pub fn resolve_with_max(
    fsys: u32,
    interval_us: u32,
    prescaler: Prescaler,
    counter_max: u32,
) -> Result<Resolution, Error> {
    if interval_us == 0 {
        return Err(Error::InvalidInterval);
    }

    // fsys * interval_us fits in u64 for all u32 inputs.
    let cycles = fsys as u64 * interval_us as u64;

    for candidate in Prescaler::ALL.iter().copied().filter(|p| *p >= prescaler) {
        let divisor = candidate.divisor() as u64 * US_PER_SECOND;
        // Round half up.
        let ticks = (cycles + divisor / 2) / divisor;
        if ticks == 0 {
            // Shorter than one prescaled tick; larger dividers only make it worse.
            break;
        }

        let mod_count = ticks - 1;
        if mod_count <= counter_max as u64 {
            return Ok(Resolution {
                mod_count: mod_count as u32,
                prescaler: candidate,
            });
        }
    }

    Err(Error::UnrepresentableInterval)
}

/// Resolve the register values for a configuration row.
///
/// A disabled channel without an interval gets a free running full period at
/// the requested prescaler.
pub fn resolve_config(config: &TmrConfig, fsys: u32) -> Result<Resolution, Error> {
    if config.interval_us == 0 && !config.enabled {
        return Ok(Resolution {
            mod_count: COUNTER_MAX,
            prescaler: config.prescaler,
        });
    }

    resolve(fsys, config.interval_us, config.prescaler)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::config_get;

    const FSYS: u32 = 48_000_000;

    #[test]
    fn resolve_100us_at_48mhz() {
        let res = resolve(FSYS, 100, Prescaler::Div1).unwrap();

        assert_eq!(4799, res.mod_count);
        assert_eq!(Prescaler::Div1, res.prescaler);
    }

    #[test]
    fn resolve_is_deterministic() {
        let first = resolve(FSYS, 12_345, Prescaler::Div4);
        let second = resolve(FSYS, 12_345, Prescaler::Div4);

        assert_eq!(first, second);
    }

    #[test]
    fn resolve_keeps_requested_prescaler_when_it_fits() {
        let res = resolve(FSYS, 100, Prescaler::Div8).unwrap();

        assert_eq!(599, res.mod_count);
        assert_eq!(Prescaler::Div8, res.prescaler);
    }

    #[test]
    fn resolve_escalates_prescaler() {
        // 10ms at 48MHz is 480000 cycles, which needs a divider of 8.
        let res = resolve(FSYS, 10_000, Prescaler::Div1).unwrap();

        assert_eq!(Prescaler::Div8, res.prescaler);
        assert_eq!(59_999, res.mod_count);
    }

    #[test]
    fn resolve_counter_max_boundary() {
        // At 1MHz a 1:1 tick is exactly one microsecond.
        let res = resolve(1_000_000, 65_536, Prescaler::Div1).unwrap();
        assert_eq!(COUNTER_MAX, res.mod_count);
        assert_eq!(Prescaler::Div1, res.prescaler);

        let res = resolve(1_000_000, 65_537, Prescaler::Div1).unwrap();
        assert_eq!(Prescaler::Div2, res.prescaler);
        assert_eq!(32_768, res.mod_count);
    }

    #[test]
    fn resolve_largest_prescaler_boundary() {
        let res = resolve(1_000_000, 65_536 * 128, Prescaler::Div1).unwrap();
        assert_eq!(COUNTER_MAX, res.mod_count);
        assert_eq!(Prescaler::Div128, res.prescaler);

        assert_eq!(
            Err(Error::UnrepresentableInterval),
            resolve(1_000_000, 65_536 * 128 + 64, Prescaler::Div1)
        );
    }

    #[test]
    fn resolve_never_lowers_the_prescaler() {
        let res = resolve(1_000_000, 10, Prescaler::Div2).unwrap();

        assert_eq!(Prescaler::Div2, res.prescaler);
        assert_eq!(4, res.mod_count);
    }

    #[test]
    fn resolve_zero_interval() {
        assert_eq!(Err(Error::InvalidInterval), resolve(FSYS, 0, Prescaler::Div1));
    }

    #[test]
    fn resolve_interval_shorter_than_a_tick() {
        // One microsecond is a third of a 32768Hz clock cycle.
        assert_eq!(
            Err(Error::UnrepresentableInterval),
            resolve(32_768, 1, Prescaler::Div1)
        );
    }

    #[test]
    fn resolve_with_narrow_counter() {
        // An 8 bit counter needs a divider of 32 for 100us at 48MHz.
        let res = resolve_with_max(FSYS, 100, Prescaler::Div1, 0xFF).unwrap();

        assert_eq!(Prescaler::Div32, res.prescaler);
        assert_eq!(149, res.mod_count);
    }

    #[test]
    fn realized_interval_is_within_half_a_tick() {
        for &(fsys, interval_us, prescaler) in &[
            (48_000_000, 100, Prescaler::Div1),
            (48_000_000, 33_333, Prescaler::Div1),
            (32_768, 1_000_000, Prescaler::Div1),
            (20_971_520, 7, Prescaler::Div16),
            (8_000_000, 250_000, Prescaler::Div4),
        ] {
            let res = resolve(fsys, interval_us, prescaler).unwrap();
            let realized = res.realized_interval_ns(fsys).unwrap() as i64;
            let requested = interval_us as i64 * 1000;
            let tick_ns = res.prescaler.divisor() as i64 * NS_PER_SECOND as i64 / fsys as i64;

            assert!(
                (realized - requested).abs() <= tick_ns / 2 + 1,
                "{} Hz, {} us: realized {} ns",
                fsys,
                interval_us,
                realized
            );
        }
    }

    #[test]
    fn realized_interval_needs_a_running_clock() {
        let res = resolve(FSYS, 100, Prescaler::Div1).unwrap();

        assert_eq!(Some(100_000), res.realized_interval_ns(FSYS));
        assert_eq!(None, res.realized_interval_ns(0));
    }

    #[test]
    fn resolve_config_disabled_without_interval() {
        let tmr1 = config_get()[1];
        let res = resolve_config(&tmr1, FSYS).unwrap();

        assert_eq!(COUNTER_MAX, res.mod_count);
        assert_eq!(tmr1.prescaler, res.prescaler);
    }

    #[test]
    fn resolve_config_enabled_without_interval() {
        let config = TmrConfig {
            interval_us: 0,
            ..config_get()[0]
        };

        assert_eq!(Err(Error::InvalidInterval), resolve_config(&config, FSYS));
    }
}
