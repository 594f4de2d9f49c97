//! Chip-variant interface.
//!
//! The bring-up sequence and the synchronization protocol are shared across
//! chip families; what differs is the register layout and the clock plumbing.
//! [`RtcDevice`] captures exactly that difference. Implementations provide
//! raw register primitives; [`Rtc`](crate::Rtc) owns the ordering and the
//! sync-busy waits.

use crate::{alarm::AlarmMatch, datetime::DateTime};

/// Cause of the most recent system reset.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCause {
    /// Initial power-on.
    PowerOn,
    /// Brown-out detector, either supply domain.
    Brownout,
    /// External reset pin.
    External,
    /// Watchdog timeout.
    Watchdog,
    /// Software-requested system reset.
    System,
    /// Wakeup from backup mode (SAMD5x only).
    Backup,
}

impl ResetCause {
    /// Returns `true` for resets that leave the low-frequency oscillator
    /// and the peripheral's registers powered: watchdog, external pin, and
    /// system reset.
    ///
    /// Calendar time is preserved across a hot reset and lost otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use samd_rtc::ResetCause;
    ///
    /// assert!(ResetCause::Watchdog.is_hot());
    /// assert!(ResetCause::External.is_hot());
    /// assert!(ResetCause::System.is_hot());
    /// assert!(!ResetCause::PowerOn.is_hot());
    /// assert!(!ResetCause::Brownout.is_hot());
    /// ```
    #[must_use]
    pub const fn is_hot(self) -> bool {
        matches!(
            self,
            ResetCause::External | ResetCause::Watchdog | ResetCause::System
        )
    }
}

/// Register-level access to one chip family's RTC.
///
/// Methods are raw primitives: none of them waits for write
/// synchronization. After any synchronized register write the caller must
/// poll [`is_syncing`](Self::is_syncing) until it reports `false` before
/// touching the peripheral again; [`Rtc`](crate::Rtc) is the only intended
/// caller and does exactly that.
pub trait RtcDevice {
    /// Enable the peripheral's bus interface clock.
    fn enable_bus_clock(&mut self);

    /// Configure and enable the low-frequency oscillator.
    ///
    /// The source (crystal or internal ultra-low-power oscillator) is a
    /// build-time choice via the `crystalless` feature.
    fn configure_oscillator(&mut self);

    /// Route the oscillator into the peripheral's clock input.
    ///
    /// SAMD21 goes through a generic clock generator; SAMD5x selects the
    /// source directly. Must run after
    /// [`configure_oscillator`](Self::configure_oscillator).
    fn route_clock(&mut self);

    /// Cause of the most recent system reset.
    fn reset_cause(&mut self) -> ResetCause;

    /// Returns `true` if the mode field currently reads as clock/calendar
    /// mode, i.e. a previous boot configured the peripheral.
    fn in_calendar_mode(&mut self) -> bool;

    /// Set or clear the peripheral enable bit. Synchronized.
    fn set_enable(&mut self, enable: bool);

    /// Set or clear the software-reset bit. Synchronized.
    ///
    /// Setting it is only legal while the peripheral is disabled and clears
    /// all peripheral configuration to power-on defaults.
    fn set_software_reset(&mut self, reset: bool);

    /// Program calendar mode, the divide-by-1024 prescaler (1 Hz tick),
    /// match-clear off, and 24-hour representation. Synchronized.
    ///
    /// Only legal while the software-reset bit is held.
    fn apply_calendar_config(&mut self);

    /// Enable the alarm-compare interrupt at the peripheral level.
    /// Takes effect immediately, no synchronization.
    fn enable_alarm_interrupt(&mut self);

    /// Write the alarm match selector. Synchronized.
    fn write_match_mask(&mut self, policy: AlarmMatch);

    /// Request synchronization of the clock register for reading.
    ///
    /// SAMD21 writes an explicit read request; SAMD5x keeps the register
    /// continuously synchronized and this is a no-op. Synchronized either
    /// way: follow with a sync wait before [`read_clock`](Self::read_clock).
    fn request_clock_read(&mut self);

    /// Read the clock register image.
    fn read_clock(&mut self) -> DateTime;

    /// Write the clock register image. Synchronized.
    fn write_clock(&mut self, value: DateTime);

    /// Read the alarm register image. Plain read, no handshake; the alarm
    /// fields are host-programmed, not live-ticking.
    fn read_alarm(&mut self) -> DateTime;

    /// Write the alarm register image. Synchronized.
    fn write_alarm(&mut self, value: DateTime);

    /// Returns `true` while a register write or read request has not yet
    /// propagated into the peripheral's clock domain.
    fn is_syncing(&mut self) -> bool;

    /// Enable the peripheral's interrupt vector in the interrupt
    /// controller at the highest priority.
    fn enable_interrupt_vector(&mut self);

    /// Enter deep sleep until any enabled interrupt wakes the core.
    fn standby(&mut self);
}
