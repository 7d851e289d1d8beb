use alloc::vec::Vec;
use core::sync::atomic::{AtomicU8, Ordering};

use log::{debug, warn};

use crate::{
    regs::{sc, CLKSRC_MASK, CLKSRC_SHIFT},
    resolver::{resolve_config, Resolution},
    Callback, CallbackRegistry, Channel, ClockMode, ClockSource, CounterMode, Error, Event,
    IrqControl, PeripheralMap, RegisterBus, SysClock, TmrConfig,
};

/// The lifecycle state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    /// Not configured, or its configuration was rejected.
    Uninitialized = 0,
    /// Configured with the counter stopped.
    Stopped = 1,
    /// The counter is running.
    Running = 2,
}

impl RunState {
    #[inline]
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => RunState::Stopped,
            2 => RunState::Running,
            _ => RunState::Uninitialized,
        }
    }
}

struct ChannelSlot {
    state: AtomicU8,
    /// Written by init only.
    resolution: Option<Resolution>,
}

impl ChannelSlot {
    const fn new() -> Self {
        Self {
            state: AtomicU8::new(RunState::Uninitialized as u8),
            resolution: None,
        }
    }
}

/// A configuration entry rejected by [`TmrDrv::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitFailure {
    /// The position of the entry in the configuration table.
    pub index: usize,
    pub channel: Channel,
    pub error: Error,
}

/// The outcome of [`TmrDrv::init`].
///
/// A rejected entry leaves its channel uninitialized but does not prevent the
/// remaining entries from being applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InitReport {
    failures: Vec<InitFailure>,
}

impl InitReport {
    /// Whether every entry was applied.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// The rejected entries in table order.
    pub fn failures(&self) -> &[InitFailure] {
        &self.failures
    }

    fn reject(&mut self, index: usize, channel: Channel, error: Error) {
        warn!("{:?}: config entry {} rejected: {}", channel, index, error);
        self.failures.push(InitFailure {
            index,
            channel,
            error,
        });
    }

    /// The first error reported for `channel`.
    pub fn error(&self, channel: Channel) -> Option<Error> {
        self.failures
            .iter()
            .find(|f| f.channel == channel)
            .map(|f| f.error)
    }
}

/// The timer driver.
///
/// Owns the register access, the resolved state of every channel and the
/// interrupt callbacks. [`TmrDrv::init`] requires exclusive access, so a
/// driver shared with interrupt handlers can only be reconfigured once those
/// handlers have released it.
pub struct TmrDrv<Bus: RegisterBus, Irq: IrqControl> {
    bus: Bus,
    irq: Irq,
    map: PeripheralMap,
    /// The clock source written by the first entry declaring one.
    clock_source: Option<ClockSource>,
    channels: [ChannelSlot; Channel::COUNT],
    callbacks: CallbackRegistry,
}

impl<Bus: RegisterBus, Irq: IrqControl> TmrDrv<Bus, Irq> {
    /// Create a new driver with all channels uninitialized.
    ///
    /// The peripheral map is validated once here; every later register access
    /// made by the driver relies on it.
    pub fn new(bus: Bus, irq: Irq, map: PeripheralMap) -> Result<Self, Error> {
        map.validate()?;

        Ok(Self {
            bus,
            irq,
            map,
            clock_source: None,
            channels: [const { ChannelSlot::new() }; Channel::COUNT],
            callbacks: CallbackRegistry::new(),
        })
    }

    /// Initialize the timers from a configuration table.
    ///
    /// Channels initialized by an earlier call are stopped and reset first.
    /// Every entry is then applied in order: the clock gate of the instance is
    /// opened, the shared clock source is checked (or set by the first entry
    /// declaring one), the interval is resolved and the registers are
    /// programmed. Enabled entries are started with their clock mode.
    ///
    /// When no entry selects a clock source the counters cannot run, so every
    /// channel that was programmed is rejected with [`Error::NoClockSource`].
    ///
    /// ```no_run
    /// use tmr_drv::{config_get, FixedClock, Mmio, TmrDrv, KL25Z};
    /// # use tmr_drv::IrqControl;
    /// # struct NoIrq;
    /// # impl IrqControl for NoIrq {
    /// #     fn set_priority(&self, _: u16, _: u8) {}
    /// #     fn enable(&self, _: u16) {}
    /// #     fn disable(&self, _: u16) {}
    /// # }
    /// # fn run() -> Result<(), tmr_drv::Error> {
    /// let mut tmr = TmrDrv::new(Mmio, NoIrq, KL25Z)?;
    /// let report = tmr.init(config_get(), &FixedClock(48_000_000));
    /// assert!(report.is_ok());
    /// # Ok(())
    /// # }
    /// ```
    pub fn init<C: SysClock>(&mut self, config: &[TmrConfig], clock: &C) -> InitReport {
        self.reset();

        let fsys = clock.freq();
        let mut seen: [Option<usize>; Channel::COUNT] = [None; Channel::COUNT];
        let mut report = InitReport::default();

        for (index, entry) in config.iter().enumerate() {
            let channel = entry.channel;
            let result = match seen[channel.index()] {
                Some(_) => Err(Error::DuplicateChannel),
                None => {
                    seen[channel.index()] = Some(index);
                    self.init_channel(entry, fsys)
                }
            };

            if let Err(error) = result {
                report.reject(index, channel, error);
            }
        }

        // The counters have no clock until some entry selects one.
        if self.clock_source.is_none() {
            for channel in Channel::ALL {
                if self.state(channel) != RunState::Uninitialized {
                    self.release(channel);
                    if let Some(index) = seen[channel.index()] {
                        report.reject(index, channel, Error::NoClockSource);
                    }
                }
            }
        }

        report
    }

    fn reset(&mut self) {
        for channel in Channel::ALL {
            if self.state(channel) != RunState::Uninitialized {
                self.release(channel);
            }
        }

        self.clock_source = None;
    }

    /// Stop an initialized channel and return it to `Uninitialized`.
    fn release(&mut self, channel: Channel) {
        let regs = *self.map.channel(channel);
        // Safety: The instance is gated on as it was initialized.
        unsafe {
            self.bus.modify(regs.block.sc(), |v| {
                v & !(sc::CMOD_MASK | sc::TOIE | sc::TOF)
            });
        }
        self.irq.disable(regs.irq);

        let slot = &mut self.channels[channel.index()];
        *slot.state.get_mut() = RunState::Uninitialized as u8;
        slot.resolution = None;
    }

    fn init_channel(&mut self, entry: &TmrConfig, fsys: u32) -> Result<(), Error> {
        if entry.enabled && entry.clock_mode == ClockMode::Stop {
            return Err(Error::InvalidClockMode);
        }

        let regs = *self.map.channel(entry.channel);
        let block = regs.block;

        // Safety: The map is validated, and the instance registers are only
        // touched after the gate is opened.
        unsafe {
            self.bus
                .modify(self.map.clock_gate, |v| v | 1 << regs.gate_bit);
        }

        if let Some(bits) = entry.clock_source.select_bits() {
            match self.clock_source {
                None => {
                    unsafe {
                        self.bus.modify(self.map.clock_source, |v| {
                            (v & !CLKSRC_MASK) | bits << CLKSRC_SHIFT
                        });
                    }
                    self.clock_source = Some(entry.clock_source);
                }
                Some(source) if source == entry.clock_source => {}
                Some(_) => return Err(Error::ClockSourceMismatch),
            }
        }

        let resolution = resolve_config(entry, fsys)?;

        // Writing TOF as 1 clears a flag left over from earlier use.
        let mut status = resolution.prescaler.ps_bits() | sc::TOF;
        if entry.mode == CounterMode::UpDown {
            status |= sc::CPWMS;
        }
        if entry.int_enabled {
            status |= sc::TOIE;
        }

        unsafe {
            // PS and CPWMS are only writable while the counter is disabled.
            self.bus.write(block.sc(), 0);
            // Any write resets the counter.
            self.bus.write(block.cnt(), 0);
            self.bus.write(block.modulo(), resolution.mod_count);
            self.bus.write(block.sc(), status);
        }

        if entry.int_enabled {
            self.irq.set_priority(regs.irq, entry.int_priority);
            self.irq.enable(regs.irq);
        } else {
            self.irq.disable(regs.irq);
        }

        let slot = &mut self.channels[entry.channel.index()];
        slot.resolution = Some(resolution);
        *slot.state.get_mut() = RunState::Stopped as u8;

        debug!(
            "{:?}: mod {} prescaler {:?} ({} us requested)",
            entry.channel, resolution.mod_count, resolution.prescaler, entry.interval_us
        );

        if entry.enabled {
            self.enable(entry.channel, entry.clock_mode)?;
        }

        Ok(())
    }

    /// Start the counter of `channel` in `mode`.
    ///
    /// Enabling a running channel does nothing, also when `mode` differs from
    /// the running mode. [`ClockMode::Stop`] is the same as [`TmrDrv::disable`].
    pub fn enable(&self, channel: Channel, mode: ClockMode) -> Result<(), Error> {
        if mode == ClockMode::Stop {
            return self.disable(channel);
        }

        let slot = &self.channels[channel.index()];
        let sc_addr = self.map.channel(channel).block.sc();

        critical_section::with(|_| match self.state(channel) {
            RunState::Uninitialized => Err(Error::NotInitialized),
            RunState::Running => Ok(()),
            RunState::Stopped => {
                // Safety: The channel is initialized, so its gate is open.
                unsafe {
                    self.bus.modify(sc_addr, |v| {
                        (v & !(sc::CMOD_MASK | sc::TOF)) | mode.cmod_bits() << sc::CMOD_SHIFT
                    });
                }
                slot.state.store(RunState::Running as u8, Ordering::Release);
                Ok(())
            }
        })
    }

    /// Stop the counter of `channel`.
    pub fn disable(&self, channel: Channel) -> Result<(), Error> {
        let slot = &self.channels[channel.index()];
        let sc_addr = self.map.channel(channel).block.sc();

        critical_section::with(|_| match self.state(channel) {
            RunState::Uninitialized => Err(Error::NotInitialized),
            RunState::Stopped | RunState::Running => {
                // Safety: The channel is initialized, so its gate is open.
                unsafe {
                    self.bus
                        .modify(sc_addr, |v| v & !(sc::CMOD_MASK | sc::TOF));
                }
                slot.state.store(RunState::Stopped as u8, Ordering::Release);
                Ok(())
            }
        })
    }

    /// Get the state of `channel`.
    pub fn state(&self, channel: Channel) -> RunState {
        RunState::from_bits(self.channels[channel.index()].state.load(Ordering::Acquire))
    }

    /// Get the register values resolved for `channel` by the last init.
    pub fn resolution(&self, channel: Channel) -> Option<Resolution> {
        self.channels[channel.index()].resolution
    }

    /// Get the shared clock source selected by the last init.
    pub fn clock_source(&self) -> Option<ClockSource> {
        self.clock_source
    }

    /// Get the current counter value of `channel`.
    pub fn counter(&self, channel: Channel) -> Result<u16, Error> {
        if self.state(channel) == RunState::Uninitialized {
            return Err(Error::NotInitialized);
        }

        let cnt = self.map.channel(channel).block.cnt();
        // Safety: The channel is initialized, so its gate is open.
        Ok(unsafe { self.bus.read(cnt) } as u16)
    }

    /// The peripheral map the driver was created with.
    pub fn map(&self) -> &PeripheralMap {
        &self.map
    }

    /// Write `value` directly to the register at `address`.
    ///
    /// This reaches functionality of the timer module that the driver does not
    /// expose. None of the driver's invariants are checked or maintained.
    ///
    /// # Safety
    ///
    /// `address` must be a writable register within the timer module's address
    /// space, and the instance it belongs to must be clock gated on.
    pub unsafe fn register_write(&self, address: u32, value: u32) {
        self.bus.write(address, value);
    }

    /// Read the register at `address` directly.
    ///
    /// # Safety
    ///
    /// `address` must be a readable register within the timer module's address
    /// space, and the instance it belongs to must be clock gated on.
    pub unsafe fn register_read(&self, address: u32) -> u32 {
        self.bus.read(address)
    }

    /// Set the handler for `event`, returning the handler it replaces.
    ///
    /// Use [`Callback::Noop`] to remove a handler.
    pub fn register_callback(&self, event: Event, callback: Callback) -> Callback {
        self.callbacks.register(event, callback)
    }

    /// The callback registry used by [`TmrDrv::on_interrupt`].
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// The interrupt entry point for `channel`.
    ///
    /// Must be called from the interrupt vector of the channel's timer
    /// instance. A pending overflow is acknowledged before the registered
    /// handler is invoked, whether or not there is one.
    pub fn on_interrupt(&self, channel: Channel) {
        if self.state(channel) == RunState::Uninitialized {
            // The instance may not even be clock gated.
            warn!("{:?}: interrupt on uninitialized channel", channel);
            return;
        }

        let sc_addr = self.map.channel(channel).block.sc();
        let overflowed = critical_section::with(|_| unsafe {
            let status = self.bus.read(sc_addr);
            if status & sc::TOF != 0 {
                // TOF is write-1-to-clear, the other fields are written back unchanged.
                self.bus.write(sc_addr, status);
                true
            } else {
                false
            }
        });

        if overflowed {
            self.callbacks.dispatch(Event::Overflow(channel));
        } else {
            warn!("{:?}: spurious interrupt", channel);
        }
    }
}
