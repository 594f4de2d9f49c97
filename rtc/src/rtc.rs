//! Real-time clock driver.

use crate::{
    alarm::AlarmMatch,
    datetime::{DateTime, Y2K_EPOCH_OFFSET},
    device::RtcDevice,
};
use core::cell::Cell;
use critical_section::Mutex;

/// Alarm callback, invoked from the interrupt handler.
///
/// A single process-wide slot: the hardware has exactly one RTC unit, and
/// the interrupt handler is a free function that cannot reach a driver
/// instance.
static ALARM_CALLBACK: Mutex<Cell<Option<fn()>>> = Mutex::new(Cell::new(None));

/// Invoke the attached alarm callback, if any.
///
/// Called from the interrupt dispatch path; the caller is responsible for
/// clearing the alarm-pending flag afterwards.
pub(crate) fn run_alarm_callback() {
    let callback: Option<fn()> = critical_section::with(|cs| ALARM_CALLBACK.borrow(cs).get());
    if let Some(callback) = callback {
        callback();
    }
}

/// Real-time clock driver in clock/calendar mode.
///
/// Generic over the chip family through [`RtcDevice`]; the bring-up
/// sequence, the sync-busy waits, and the accessor surface are shared.
///
/// Every mutating operation is a silent no-op until [`begin`](Self::begin)
/// has completed. Field reads are not gated and return whatever the
/// hardware registers hold.
///
/// # Example
///
/// ```
/// use samd_rtc::{sim::SimRtc, Rtc};
///
/// let mut rtc: Rtc<SimRtc> = Rtc::new(SimRtc::new());
/// rtc.begin(false);
/// rtc.set_date(15, 6, 23);
/// rtc.set_time(10, 30, 0);
/// assert_eq!(rtc.epoch(), 1_686_825_000); // 2023-06-15T10:30:00Z
/// ```
pub struct Rtc<D: RtcDevice> {
    dev: D,
    configured: bool,
}

impl<D: RtcDevice> Rtc<D> {
    /// Create a driver for a device.
    ///
    /// The peripheral is untouched until [`begin`](Self::begin) is called.
    #[must_use]
    pub const fn new(device: D) -> Self {
        Self {
            dev: device,
            configured: false,
        }
    }

    /// Bring up the peripheral.
    ///
    /// Configures the low-frequency oscillator, routes it into the
    /// peripheral, runs the software reset sequence, programs calendar
    /// mode with a 1 Hz tick, enables the alarm interrupt path with the
    /// match selector off, and initializes the calendar.
    ///
    /// Calendar time is preserved across watchdog, external, and system
    /// resets when the peripheral was already running in calendar mode;
    /// power-on and brown-out resets reinitialize the calendar to
    /// 2000-01-01 00:00:00, as does `reset_time = true`.
    ///
    /// Idempotent across reboots, not across concurrent calls; bring-up is
    /// single-threaded.
    pub fn begin(&mut self, reset_time: bool) {
        self.dev.enable_bus_clock();
        self.dev.configure_oscillator();

        // capture the running calendar before the reset sequence wipes it
        let mut saved: Option<DateTime> = None;
        if !reset_time && self.dev.reset_cause().is_hot() && self.dev.in_calendar_mode() {
            saved = Some(self.dev.read_clock());
        }

        self.dev.route_clock();

        self.dev.set_enable(false);
        self.wait_sync();

        // the software reset requires the peripheral disabled and clears
        // all configuration to power-on defaults
        self.dev.set_software_reset(true);
        self.wait_sync();

        // mode and prescaler are only writable while the reset is held
        self.dev.apply_calendar_config();
        self.wait_sync();

        self.dev.enable_alarm_interrupt();
        self.dev.write_match_mask(AlarmMatch::Off);
        self.wait_sync();

        self.dev.enable_interrupt_vector();

        self.dev.set_enable(true);
        self.wait_sync();
        self.dev.set_software_reset(false);
        self.wait_sync();

        // restore only after the peripheral is reconfigured and enabled,
        // otherwise the write races the reset
        match saved {
            Some(old) if old.bits() != 0 => self.dev.write_clock(old),
            _ => self.dev.write_clock(DateTime::DEFAULT),
        }
        self.wait_sync();

        self.configured = true;
    }

    /// Returns `true` once [`begin`](Self::begin) has completed.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.configured
    }

    /// Block until the last register write or read request has propagated
    /// into the peripheral's clock domain.
    ///
    /// A stuck peripheral (misconfigured clock source) hangs here
    /// indefinitely; that is a fatal condition requiring hardware-level
    /// recovery, not something the driver recovers from.
    fn wait_sync(&mut self) {
        while self.dev.is_syncing() {}
    }

    /// Synchronized snapshot of the clock register.
    fn clock_read(&mut self) -> DateTime {
        if self.configured {
            self.dev.request_clock_read();
            self.wait_sync();
        }
        self.dev.read_clock()
    }

    /// Synchronized single-field update of the clock register.
    fn clock_update(&mut self, f: impl FnOnce(DateTime) -> DateTime) {
        let value: DateTime = f(self.clock_read());
        self.dev.write_clock(value);
        self.wait_sync();
    }

    /// Synchronized single-field update of the alarm register.
    fn alarm_update(&mut self, f: impl FnOnce(DateTime) -> DateTime) {
        let value: DateTime = f(self.dev.read_alarm());
        self.dev.write_alarm(value);
        self.wait_sync();
    }

    /// Clock seconds, 0-59.
    pub fn seconds(&mut self) -> u8 {
        self.clock_read().seconds()
    }

    /// Clock minutes, 0-59.
    pub fn minutes(&mut self) -> u8 {
        self.clock_read().minutes()
    }

    /// Clock hours, 0-23.
    pub fn hours(&mut self) -> u8 {
        self.clock_read().hours()
    }

    /// Clock day-of-month, 1-31.
    pub fn day(&mut self) -> u8 {
        self.clock_read().day()
    }

    /// Clock month, 1-12.
    pub fn month(&mut self) -> u8 {
        self.clock_read().month()
    }

    /// Clock year as an offset from 2000, 0-63.
    pub fn year(&mut self) -> u8 {
        self.clock_read().year()
    }

    /// Set the clock seconds field.
    pub fn set_seconds(&mut self, seconds: u8) {
        if !self.configured {
            return;
        }
        self.clock_update(|dt| dt.set_seconds(seconds));
    }

    /// Set the clock minutes field.
    pub fn set_minutes(&mut self, minutes: u8) {
        if !self.configured {
            return;
        }
        self.clock_update(|dt| dt.set_minutes(minutes));
    }

    /// Set the clock hours field.
    pub fn set_hours(&mut self, hours: u8) {
        if !self.configured {
            return;
        }
        self.clock_update(|dt| dt.set_hours(hours));
    }

    /// Set the clock day-of-month field.
    pub fn set_day(&mut self, day: u8) {
        if !self.configured {
            return;
        }
        self.clock_update(|dt| dt.set_day(day));
    }

    /// Set the clock month field.
    pub fn set_month(&mut self, month: u8) {
        if !self.configured {
            return;
        }
        self.clock_update(|dt| dt.set_month(month));
    }

    /// Set the clock year field, an offset from 2000.
    pub fn set_year(&mut self, year: u8) {
        if !self.configured {
            return;
        }
        self.clock_update(|dt| dt.set_year(year));
    }

    /// Set the time of day as three synchronized single-field writes, in
    /// seconds, minutes, hours order.
    ///
    /// Not atomic as a unit: an alarm match or a 1 Hz tick between the
    /// field writes can observe a transiently inconsistent calendar value.
    /// [`set_date_time`](Self::set_date_time) writes one combined image
    /// instead.
    pub fn set_time(&mut self, hours: u8, minutes: u8, seconds: u8) {
        if !self.configured {
            return;
        }
        self.set_seconds(seconds);
        self.set_minutes(minutes);
        self.set_hours(hours);
    }

    /// Set the date as three synchronized single-field writes, in day,
    /// month, year order.
    ///
    /// Same atomicity caveat as [`set_time`](Self::set_time).
    pub fn set_date(&mut self, day: u8, month: u8, year: u8) {
        if !self.configured {
            return;
        }
        self.set_day(day);
        self.set_month(month);
        self.set_year(year);
    }

    /// Alarm seconds field.
    pub fn alarm_seconds(&mut self) -> u8 {
        self.dev.read_alarm().seconds()
    }

    /// Alarm minutes field.
    pub fn alarm_minutes(&mut self) -> u8 {
        self.dev.read_alarm().minutes()
    }

    /// Alarm hours field.
    pub fn alarm_hours(&mut self) -> u8 {
        self.dev.read_alarm().hours()
    }

    /// Alarm day-of-month field.
    pub fn alarm_day(&mut self) -> u8 {
        self.dev.read_alarm().day()
    }

    /// Alarm month field.
    pub fn alarm_month(&mut self) -> u8 {
        self.dev.read_alarm().month()
    }

    /// Alarm year field, an offset from 2000.
    pub fn alarm_year(&mut self) -> u8 {
        self.dev.read_alarm().year()
    }

    /// Set the alarm seconds field.
    pub fn set_alarm_seconds(&mut self, seconds: u8) {
        if !self.configured {
            return;
        }
        self.alarm_update(|dt| dt.set_seconds(seconds));
    }

    /// Set the alarm minutes field.
    pub fn set_alarm_minutes(&mut self, minutes: u8) {
        if !self.configured {
            return;
        }
        self.alarm_update(|dt| dt.set_minutes(minutes));
    }

    /// Set the alarm hours field.
    pub fn set_alarm_hours(&mut self, hours: u8) {
        if !self.configured {
            return;
        }
        self.alarm_update(|dt| dt.set_hours(hours));
    }

    /// Set the alarm day-of-month field.
    pub fn set_alarm_day(&mut self, day: u8) {
        if !self.configured {
            return;
        }
        self.alarm_update(|dt| dt.set_day(day));
    }

    /// Set the alarm month field.
    pub fn set_alarm_month(&mut self, month: u8) {
        if !self.configured {
            return;
        }
        self.alarm_update(|dt| dt.set_month(month));
    }

    /// Set the alarm year field, an offset from 2000.
    pub fn set_alarm_year(&mut self, year: u8) {
        if !self.configured {
            return;
        }
        self.alarm_update(|dt| dt.set_year(year));
    }

    /// Set the alarm time of day as three synchronized single-field
    /// writes, in seconds, minutes, hours order.
    pub fn set_alarm_time(&mut self, hours: u8, minutes: u8, seconds: u8) {
        if !self.configured {
            return;
        }
        self.set_alarm_seconds(seconds);
        self.set_alarm_minutes(minutes);
        self.set_alarm_hours(hours);
    }

    /// Set the alarm date as three synchronized single-field writes, in
    /// day, month, year order.
    pub fn set_alarm_date(&mut self, day: u8, month: u8, year: u8) {
        if !self.configured {
            return;
        }
        self.set_alarm_day(day);
        self.set_alarm_month(month);
        self.set_alarm_year(year);
    }

    /// Unix timestamp of the current calendar value (UTC, no daylight
    /// saving).
    ///
    /// An uninitialized calendar (all-zero register) reads as
    /// [`Y2K_EPOCH_OFFSET`].
    pub fn epoch(&mut self) -> u32 {
        self.clock_read().to_unix_epoch()
    }

    /// Seconds since 2000-01-01T00:00:00Z.
    pub fn y2k_epoch(&mut self) -> u32 {
        self.epoch() - Y2K_EPOCH_OFFSET
    }

    /// Set the calendar from a Unix timestamp (UTC, no daylight saving)
    /// with one combined synchronized register write.
    ///
    /// Timestamps before [`Y2K_EPOCH_OFFSET`] are clamped to it.
    ///
    /// # Example
    ///
    /// ```
    /// use samd_rtc::{sim::SimRtc, Rtc, Y2K_EPOCH_OFFSET};
    ///
    /// let mut rtc: Rtc<SimRtc> = Rtc::new(SimRtc::new());
    /// rtc.begin(false);
    ///
    /// rtc.set_epoch(1_686_825_000);
    /// assert_eq!(rtc.epoch(), 1_686_825_000);
    ///
    /// // clamped to the epoch floor
    /// rtc.set_epoch(0);
    /// assert_eq!(rtc.epoch(), Y2K_EPOCH_OFFSET);
    /// ```
    pub fn set_epoch(&mut self, ts: u32) {
        if !self.configured {
            return;
        }
        self.dev.write_clock(DateTime::from_unix_epoch(ts));
        self.wait_sync();
    }

    /// Set the calendar from seconds since 2000-01-01T00:00:00Z.
    pub fn set_y2k_epoch(&mut self, ts: u32) {
        self.set_epoch(ts.saturating_add(Y2K_EPOCH_OFFSET));
    }

    /// Set the alarm from a Unix timestamp (UTC, no daylight saving),
    /// written through the individual alarm field setters.
    ///
    /// Timestamps before [`Y2K_EPOCH_OFFSET`] are clamped to it.
    pub fn set_alarm_epoch(&mut self, ts: u32) {
        if !self.configured {
            return;
        }
        let dt: DateTime = DateTime::from_unix_epoch(ts);
        self.set_alarm_date(dt.day(), dt.month(), dt.year());
        self.set_alarm_time(dt.hours(), dt.minutes(), dt.seconds());
    }

    /// Current calendar value as a [`chrono::NaiveDateTime`].
    ///
    /// Returns `None` if the registers do not hold a valid calendar value.
    pub fn date_time(&mut self) -> Option<chrono::NaiveDateTime> {
        self.clock_read().to_naive()
    }

    /// Set the calendar from a [`chrono::NaiveDateTime`] with one combined
    /// synchronized register write.
    ///
    /// Unlike [`set_time`](Self::set_time) and
    /// [`set_date`](Self::set_date) this cannot be observed half-applied.
    pub fn set_date_time(&mut self, date_time: chrono::NaiveDateTime) {
        if !self.configured {
            return;
        }
        self.dev.write_clock(DateTime::from_naive(date_time));
        self.wait_sync();
    }

    /// Select which calendar fields the alarm comparator checks.
    ///
    /// The comparison re-evaluates on every 1 Hz tick. The alarm interrupt
    /// line stays enabled from [`begin`](Self::begin); the selector alone
    /// gates whether a match can fire.
    pub fn enable_alarm(&mut self, policy: AlarmMatch) {
        if !self.configured {
            return;
        }
        self.dev.write_match_mask(policy);
        self.wait_sync();
    }

    /// Set the alarm match selector to never; no further matches fire.
    pub fn disable_alarm(&mut self) {
        if !self.configured {
            return;
        }
        self.dev.write_match_mask(AlarmMatch::Off);
        self.wait_sync();
    }

    /// Attach the alarm callback, replacing any previous one.
    ///
    /// The callback runs in interrupt context whenever the alarm
    /// comparator matches.
    pub fn attach_interrupt(&mut self, callback: fn()) {
        critical_section::with(|cs| ALARM_CALLBACK.borrow(cs).set(Some(callback)));
    }

    /// Detach the alarm callback; subsequent matches invoke nothing.
    pub fn detach_interrupt(&mut self) {
        critical_section::with(|cs| ALARM_CALLBACK.borrow(cs).set(None));
    }

    /// Enter deep sleep until any enabled interrupt (typically the alarm)
    /// wakes the core.
    ///
    /// Entering standby while the native USB debug transport is attached
    /// can hang the device; that is a hardware limitation the driver can
    /// neither detect nor avoid.
    pub fn standby_mode(&mut self) {
        self.dev.standby();
    }

    /// Borrow the underlying device.
    #[must_use]
    pub fn device(&mut self) -> &mut D {
        &mut self.dev
    }

    /// Release the underlying device.
    #[must_use]
    pub fn free(self) -> D {
        self.dev
    }
}

#[cfg(test)]
mod tests {
    use super::Rtc;
    use crate::{
        alarm::AlarmMatch,
        datetime::Y2K_EPOCH_OFFSET,
        device::{ResetCause, RtcDevice},
        sim::SimRtc,
    };
    use core::sync::atomic::{AtomicUsize, Ordering::SeqCst};
    use std::sync::{Mutex as StdMutex, MutexGuard};

    /// Serializes tests that touch the process-wide callback slot.
    static CALLBACK_TEST_LOCK: StdMutex<()> = StdMutex::new(());
    static FIRES: AtomicUsize = AtomicUsize::new(0);

    fn callback_lock() -> MutexGuard<'static, ()> {
        CALLBACK_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn bump() {
        FIRES.fetch_add(1, SeqCst);
    }

    fn configured() -> Rtc<SimRtc> {
        let mut rtc: Rtc<SimRtc> = Rtc::new(SimRtc::new());
        rtc.begin(false);
        rtc
    }

    #[test]
    fn begin_initializes_default_calendar() {
        let mut rtc = configured();
        assert!(rtc.is_configured());
        assert_eq!(rtc.year(), 0);
        assert_eq!(rtc.month(), 1);
        assert_eq!(rtc.day(), 1);
        assert_eq!(rtc.hours(), 0);
        assert_eq!(rtc.minutes(), 0);
        assert_eq!(rtc.seconds(), 0);
        assert_eq!(rtc.epoch(), Y2K_EPOCH_OFFSET);
        assert_eq!(rtc.y2k_epoch(), 0);
    }

    #[test]
    fn clock_field_round_trip() {
        let mut rtc = configured();
        rtc.set_seconds(42);
        rtc.set_minutes(13);
        rtc.set_hours(21);
        rtc.set_day(28);
        rtc.set_month(2);
        rtc.set_year(9);
        assert_eq!(rtc.seconds(), 42);
        assert_eq!(rtc.minutes(), 13);
        assert_eq!(rtc.hours(), 21);
        assert_eq!(rtc.day(), 28);
        assert_eq!(rtc.month(), 2);
        assert_eq!(rtc.year(), 9);
    }

    #[test]
    fn alarm_field_round_trip() {
        let mut rtc = configured();
        rtc.set_alarm_time(7, 30, 15);
        rtc.set_alarm_date(24, 12, 30);
        assert_eq!(rtc.alarm_hours(), 7);
        assert_eq!(rtc.alarm_minutes(), 30);
        assert_eq!(rtc.alarm_seconds(), 15);
        assert_eq!(rtc.alarm_day(), 24);
        assert_eq!(rtc.alarm_month(), 12);
        assert_eq!(rtc.alarm_year(), 30);
    }

    #[test]
    fn compound_setters_compose_to_epoch() {
        let mut rtc = configured();
        rtc.set_date(15, 6, 23);
        rtc.set_time(10, 30, 0);
        // 2023-06-15T10:30:00Z
        assert_eq!(rtc.epoch(), 1_686_825_000);
    }

    #[test]
    fn epoch_round_trip_and_floor() {
        let mut rtc = configured();

        rtc.set_epoch(1_686_825_000);
        assert_eq!(rtc.epoch(), 1_686_825_000);
        assert_eq!(rtc.y2k_epoch(), 1_686_825_000 - Y2K_EPOCH_OFFSET);

        rtc.set_epoch(Y2K_EPOCH_OFFSET - 1);
        assert_eq!(rtc.epoch(), Y2K_EPOCH_OFFSET);

        rtc.set_epoch(0);
        assert_eq!(rtc.epoch(), Y2K_EPOCH_OFFSET);
    }

    #[test]
    fn y2k_epoch_round_trip() {
        let mut rtc = configured();
        rtc.set_y2k_epoch(123_456);
        assert_eq!(rtc.y2k_epoch(), 123_456);
        assert_eq!(rtc.epoch(), Y2K_EPOCH_OFFSET + 123_456);
    }

    #[test]
    fn alarm_epoch_programs_alarm_fields() {
        let mut rtc = configured();
        rtc.set_alarm_epoch(1_686_825_000); // 2023-06-15T10:30:00Z
        assert_eq!(rtc.alarm_year(), 23);
        assert_eq!(rtc.alarm_month(), 6);
        assert_eq!(rtc.alarm_day(), 15);
        assert_eq!(rtc.alarm_hours(), 10);
        assert_eq!(rtc.alarm_minutes(), 30);
        assert_eq!(rtc.alarm_seconds(), 0);
    }

    #[test]
    fn mutations_before_begin_are_no_ops() {
        let mut rtc: Rtc<SimRtc> = Rtc::new(SimRtc::new());
        rtc.set_seconds(10);
        rtc.set_time(1, 2, 3);
        rtc.set_date(4, 5, 6);
        rtc.set_epoch(1_686_825_000);
        rtc.set_alarm_seconds(7);
        rtc.enable_alarm(AlarmMatch::Seconds);
        assert!(!rtc.is_configured());
        // reads are not gated; the registers still hold their reset value
        let mut sim: SimRtc = rtc.free();
        assert_eq!(sim.read_clock().bits(), 0);
        assert_eq!(sim.read_alarm().bits(), 0);
    }

    #[test]
    fn date_time_round_trip() {
        let mut rtc = configured();
        let naive = chrono::NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(12, 0, 1)
            .unwrap();
        rtc.set_date_time(naive);
        assert_eq!(rtc.date_time(), Some(naive));
    }

    #[test]
    fn hot_reset_preserves_calendar() {
        let mut rtc = configured();
        rtc.set_epoch(1_686_825_000);

        let mut sim: SimRtc = rtc.free();
        sim.set_reset_cause(ResetCause::Watchdog);
        let mut rtc: Rtc<SimRtc> = Rtc::new(sim);
        rtc.begin(false);

        assert_eq!(rtc.epoch(), 1_686_825_000);
    }

    #[test]
    fn external_and_system_resets_preserve_calendar() {
        for cause in [ResetCause::External, ResetCause::System] {
            let mut rtc = configured();
            rtc.set_epoch(1_700_000_000);

            let mut sim: SimRtc = rtc.free();
            sim.set_reset_cause(cause);
            let mut rtc: Rtc<SimRtc> = Rtc::new(sim);
            rtc.begin(false);

            assert_eq!(rtc.epoch(), 1_700_000_000);
        }
    }

    #[test]
    fn cold_resets_reinitialize_calendar() {
        for cause in [ResetCause::PowerOn, ResetCause::Brownout] {
            let mut rtc = configured();
            rtc.set_epoch(1_686_825_000);

            let mut sim: SimRtc = rtc.free();
            sim.set_reset_cause(cause);
            let mut rtc: Rtc<SimRtc> = Rtc::new(sim);
            rtc.begin(false);

            assert_eq!(rtc.epoch(), Y2K_EPOCH_OFFSET);
        }
    }

    #[test]
    fn requested_reset_overrides_hot_cause() {
        let mut rtc = configured();
        rtc.set_epoch(1_686_825_000);

        let mut sim: SimRtc = rtc.free();
        sim.set_reset_cause(ResetCause::Watchdog);
        let mut rtc: Rtc<SimRtc> = Rtc::new(sim);
        rtc.begin(true);

        assert_eq!(rtc.epoch(), Y2K_EPOCH_OFFSET);
    }

    #[test]
    fn alarm_fires_every_minute_on_seconds_match() {
        let _guard = callback_lock();
        FIRES.store(0, SeqCst);

        let mut rtc = configured();
        rtc.attach_interrupt(bump);
        rtc.set_alarm_seconds(0);
        rtc.enable_alarm(AlarmMatch::Seconds);

        rtc.device().advance(120);
        assert_eq!(FIRES.load(SeqCst), 2);

        rtc.detach_interrupt();
    }

    #[test]
    fn alarm_fires_daily_on_time_match() {
        let _guard = callback_lock();
        FIRES.store(0, SeqCst);

        let mut rtc = configured();
        rtc.attach_interrupt(bump);
        rtc.set_alarm_time(7, 0, 0);
        rtc.enable_alarm(AlarmMatch::HoursMinutesSeconds);

        // two full days from 2000-01-01 00:00:00, crossing 07:00:00 twice,
        // independent of the programmed alarm date
        rtc.device().advance(2 * 86_400);
        assert_eq!(FIRES.load(SeqCst), 2);

        rtc.detach_interrupt();
    }

    #[test]
    fn full_match_fires_exactly_once() {
        let _guard = callback_lock();
        FIRES.store(0, SeqCst);

        let mut rtc = configured();
        rtc.attach_interrupt(bump);
        rtc.set_alarm_date(1, 1, 0);
        rtc.set_alarm_time(0, 1, 0);
        rtc.enable_alarm(AlarmMatch::YearMonthDayHoursMinutesSeconds);

        rtc.device().advance(3_600);
        assert_eq!(FIRES.load(SeqCst), 1);

        rtc.detach_interrupt();
    }

    #[test]
    fn disable_alarm_stops_further_callbacks() {
        let _guard = callback_lock();
        FIRES.store(0, SeqCst);

        let mut rtc = configured();
        rtc.attach_interrupt(bump);
        rtc.set_alarm_seconds(0);
        rtc.enable_alarm(AlarmMatch::Seconds);

        rtc.device().advance(60);
        assert_eq!(FIRES.load(SeqCst), 1);

        rtc.disable_alarm();
        rtc.device().advance(600);
        assert_eq!(FIRES.load(SeqCst), 1);

        rtc.detach_interrupt();
    }

    #[test]
    fn detach_before_match_never_invokes_callback() {
        let _guard = callback_lock();
        FIRES.store(0, SeqCst);

        let mut rtc = configured();
        rtc.attach_interrupt(bump);
        rtc.detach_interrupt();
        rtc.set_alarm_seconds(0);
        rtc.enable_alarm(AlarmMatch::Seconds);

        rtc.device().advance(120);
        assert_eq!(FIRES.load(SeqCst), 0);
    }

    #[test]
    fn pending_flag_is_clear_after_dispatch() {
        let _guard = callback_lock();
        FIRES.store(0, SeqCst);

        let mut rtc = configured();
        rtc.attach_interrupt(bump);
        rtc.set_alarm_seconds(0);
        rtc.enable_alarm(AlarmMatch::Seconds);

        rtc.device().advance(60);
        assert_eq!(FIRES.load(SeqCst), 1);
        assert!(!rtc.device().alarm_pending());

        rtc.detach_interrupt();
    }

    #[test]
    fn standby_enters_deep_sleep() {
        let mut rtc = configured();
        rtc.standby_mode();
        assert_eq!(rtc.device().standby_entries(), 1);
    }
}
