//! Simulated device for host testing.
//!
//! [`SimRtc`] models the pieces of the hardware the driver's protocol
//! depends on: the write-synchronization contract (every synchronized write
//! raises sync-busy for a couple of polls), the reset/reconfigure ordering
//! constraints, reset-cause reporting, and the 1 Hz calendar tick with
//! alarm-match evaluation. Ordering violations trip debug assertions so
//! protocol regressions fail loudly in tests.

use crate::{
    alarm::AlarmMatch,
    datetime::DateTime,
    device::{ResetCause, RtcDevice},
};

/// Number of [`is_syncing`](RtcDevice::is_syncing) polls a synchronized
/// write stays busy for.
const SYNC_POLLS: u8 = 2;

/// Simulated RTC peripheral.
///
/// Register state persists for the lifetime of the value, which mirrors the
/// hardware: the real peripheral keeps its registers through watchdog,
/// external, and system resets. Simulate a reboot by taking the device back
/// out of the driver, injecting a reset cause, and running `begin` again;
/// simulate a power cycle by constructing a fresh `SimRtc`.
///
/// # Example
///
/// ```
/// use samd_rtc::{sim::SimRtc, Rtc};
///
/// let mut rtc: Rtc<SimRtc> = Rtc::new(SimRtc::new());
/// rtc.begin(false);
/// assert_eq!(rtc.epoch(), samd_rtc::Y2K_EPOCH_OFFSET);
/// ```
pub struct SimRtc {
    bus_clock: bool,
    osc_on: bool,
    routed: bool,
    enabled: bool,
    in_reset: bool,
    calendar_mode: bool,
    clock: DateTime,
    alarm: DateTime,
    match_policy: AlarmMatch,
    alarm_irq_en: bool,
    alarm_pending: bool,
    vector_enabled: bool,
    sync: u8,
    reset_cause: ResetCause,
    standby_entries: u32,
}

impl SimRtc {
    /// Create a device in its power-on state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bus_clock: false,
            osc_on: false,
            routed: false,
            enabled: false,
            in_reset: false,
            calendar_mode: false,
            clock: DateTime::from_bits(0),
            alarm: DateTime::from_bits(0),
            match_policy: AlarmMatch::Off,
            alarm_irq_en: false,
            alarm_pending: false,
            vector_enabled: false,
            sync: 0,
            reset_cause: ResetCause::PowerOn,
            standby_entries: 0,
        }
    }

    /// Set the reset cause the next [`reset_cause`](RtcDevice::reset_cause)
    /// read reports, simulating the way the current boot ended up running.
    pub fn set_reset_cause(&mut self, cause: ResetCause) {
        self.reset_cause = cause;
    }

    /// Advance the calendar by one second and evaluate the alarm
    /// comparator, dispatching the interrupt if it matches.
    ///
    /// Does nothing while the peripheral is disabled or held in reset.
    pub fn tick(&mut self) {
        if !self.enabled || self.in_reset {
            return;
        }

        let next: u32 = self.clock.to_unix_epoch().wrapping_add(1);
        self.clock = DateTime::from_unix_epoch(next);

        let mask: u32 = self.match_policy.compare_mask();
        if self.alarm_irq_en
            && self.match_policy != AlarmMatch::Off
            && self.clock.bits() & mask == self.alarm.bits() & mask
        {
            self.alarm_pending = true;
            if self.vector_enabled {
                crate::rtc::run_alarm_callback();
                // the handler clears the pending flag as its last action
                self.alarm_pending = false;
            }
        }
    }

    /// [`tick`](Self::tick) repeatedly.
    pub fn advance(&mut self, seconds: u32) {
        for _ in 0..seconds {
            self.tick();
        }
    }

    /// Returns `true` while an alarm match is pending and unserviced.
    #[must_use]
    pub fn alarm_pending(&self) -> bool {
        self.alarm_pending
    }

    /// Number of times the core entered deep sleep.
    #[must_use]
    pub fn standby_entries(&self) -> u32 {
        self.standby_entries
    }

    fn start_sync(&mut self) {
        debug_assert_eq!(
            self.sync, 0,
            "register write while a previous write is synchronizing"
        );
        self.sync = SYNC_POLLS;
    }
}

impl Default for SimRtc {
    fn default() -> Self {
        Self::new()
    }
}

impl RtcDevice for SimRtc {
    fn enable_bus_clock(&mut self) {
        self.bus_clock = true;
    }

    fn configure_oscillator(&mut self) {
        debug_assert!(self.bus_clock, "bus clock gate is off");
        self.osc_on = true;
    }

    fn route_clock(&mut self) {
        debug_assert!(self.osc_on, "clock routed before the oscillator runs");
        self.routed = true;
    }

    fn reset_cause(&mut self) -> ResetCause {
        self.reset_cause
    }

    fn in_calendar_mode(&mut self) -> bool {
        self.calendar_mode
    }

    fn set_enable(&mut self, enable: bool) {
        self.start_sync();
        self.enabled = enable;
    }

    fn set_software_reset(&mut self, reset: bool) {
        self.start_sync();
        if reset {
            debug_assert!(!self.enabled, "software reset requires the peripheral disabled");
            self.in_reset = true;
            // reset clears all peripheral configuration
            self.calendar_mode = false;
            self.clock = DateTime::from_bits(0);
            self.alarm = DateTime::from_bits(0);
            self.match_policy = AlarmMatch::Off;
            self.alarm_irq_en = false;
            self.alarm_pending = false;
        } else {
            self.in_reset = false;
        }
    }

    fn apply_calendar_config(&mut self) {
        self.start_sync();
        debug_assert!(
            self.in_reset,
            "mode and prescaler are only writable during software reset"
        );
        self.calendar_mode = true;
    }

    fn enable_alarm_interrupt(&mut self) {
        self.alarm_irq_en = true;
    }

    fn write_match_mask(&mut self, policy: AlarmMatch) {
        self.start_sync();
        self.match_policy = policy;
    }

    fn request_clock_read(&mut self) {
        self.start_sync();
    }

    fn read_clock(&mut self) -> DateTime {
        self.clock
    }

    fn write_clock(&mut self, value: DateTime) {
        self.start_sync();
        debug_assert!(
            self.enabled && !self.in_reset,
            "clock register write races the reset sequence"
        );
        self.clock = value;
    }

    fn read_alarm(&mut self) -> DateTime {
        self.alarm
    }

    fn write_alarm(&mut self, value: DateTime) {
        self.start_sync();
        self.alarm = value;
    }

    fn is_syncing(&mut self) -> bool {
        if self.sync > 0 {
            self.sync -= 1;
            true
        } else {
            false
        }
    }

    fn enable_interrupt_vector(&mut self) {
        self.vector_enabled = true;
    }

    fn standby(&mut self) {
        self.standby_entries += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{SimRtc, SYNC_POLLS};
    use crate::datetime::DateTime;
    use crate::device::RtcDevice;

    fn drain(sim: &mut SimRtc) {
        while sim.is_syncing() {}
    }

    #[test]
    fn sync_busy_counts_down() {
        let mut sim = SimRtc::new();
        sim.set_enable(false);
        for _ in 0..SYNC_POLLS {
            assert!(sim.is_syncing());
        }
        assert!(!sim.is_syncing());
    }

    #[test]
    #[should_panic = "synchronizing"]
    fn back_to_back_writes_require_a_sync_wait() {
        let mut sim = SimRtc::new();
        sim.set_enable(false);
        sim.set_enable(false);
    }

    #[test]
    #[should_panic = "disabled"]
    fn software_reset_requires_disabled_peripheral() {
        let mut sim = SimRtc::new();
        sim.set_enable(true);
        drain(&mut sim);
        sim.set_software_reset(true);
    }

    #[test]
    #[should_panic = "software reset"]
    fn calendar_config_requires_reset_held() {
        let mut sim = SimRtc::new();
        sim.set_enable(false);
        drain(&mut sim);
        sim.apply_calendar_config();
    }

    #[test]
    fn tick_rolls_over_midnight() {
        let mut sim = SimRtc::new();
        sim.enabled = true;
        sim.clock = DateTime::DEFAULT
            .set_hours(23)
            .set_minutes(59)
            .set_seconds(59);
        sim.tick();
        assert_eq!(sim.clock.day(), 2);
        assert_eq!(sim.clock.hours(), 0);
        assert_eq!(sim.clock.minutes(), 0);
        assert_eq!(sim.clock.seconds(), 0);
    }

    #[test]
    fn tick_is_inert_while_disabled() {
        let mut sim = SimRtc::new();
        sim.clock = DateTime::DEFAULT;
        sim.tick();
        assert_eq!(sim.clock, DateTime::DEFAULT);
    }
}
