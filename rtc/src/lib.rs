//! RTC driver for the Microchip SAMD family, clock/calendar mode.
//!
//! Exposes calendar time (seconds through year), one alarm with a
//! configurable match policy, and Unix/Y2K epoch conversions. The register
//! layout differs between the SAMD21 and the SAMD5x/E5x families; the
//! bring-up sequence and the write-synchronization protocol do not, so the
//! driver is generic over a [`RtcDevice`] and the families are selected by
//! cargo feature (`samd21`, `samd51`).
//!
//! The 32.768 kHz crystal is the default clock source; build with the
//! `crystalless` feature to run from the internal ultra-low-power
//! oscillator instead.
//!
//! # Example
//!
//! On hardware (SAMD21 shown; the SAMD5x is identical apart from the device
//! type):
//!
//! ```no_run
//! use samd_rtc::{sim::SimRtc, AlarmMatch, Rtc};
//!
//! fn wake() {}
//!
//! // SimRtc stands in for samd21::Samd21Rtc here so the example runs on
//! // the host; the driver surface is the same
//! let mut rtc: Rtc<SimRtc> = Rtc::new(SimRtc::new());
//! rtc.begin(false);
//!
//! rtc.set_date(15, 6, 23);
//! rtc.set_time(10, 30, 0);
//!
//! rtc.set_alarm_time(7, 0, 0);
//! rtc.enable_alarm(AlarmMatch::HoursMinutesSeconds); // every day at 07:00
//! rtc.attach_interrupt(wake);
//!
//! loop {
//!     rtc.standby_mode();
//! }
//! ```
//!
//! The hardware interrupt handler is a free function; route it to
//! `samd21::on_interrupt` (or `samd51::on_interrupt`), which invokes the
//! attached callback and clears the pending flag.
//!
//! # Errors and hangs
//!
//! There is no error type. Mutating calls before [`Rtc::begin`] are silent
//! no-ops, out-of-range field values are written as-is, and the sync-busy
//! wait loops have no timeout: a peripheral with a dead clock source hangs
//! the caller, which is a hardware fault to fix, not a condition the
//! driver reports.

#![cfg_attr(not(test), no_std)]

pub use chrono;

mod alarm;
mod datetime;
mod device;
mod rtc;

pub mod sim;

#[cfg(feature = "samd21")]
pub mod samd21;

#[cfg(feature = "samd51")]
pub mod samd51;

pub use alarm::AlarmMatch;
pub use datetime::{DateTime, Y2K_EPOCH_OFFSET};
pub use device::{ResetCause, RtcDevice};
pub use rtc::Rtc;
