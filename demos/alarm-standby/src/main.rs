//! Wake from standby once a minute via the RTC alarm.
//!
//! Requires a board with a 32.768 kHz crystal (build `samd-rtc` with
//! `crystalless` otherwise). Flash with probe-rs; standby will hang the
//! device if entered while the native USB debug transport is attached.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt_rtt as _; // global logger
use panic_probe as _;
use samd_rtc::{
    samd21::{self, Samd21Rtc},
    AlarmMatch, Rtc,
};

#[allow(non_snake_case)]
#[no_mangle]
extern "C" fn RTC() {
    samd21::on_interrupt();
}

fn on_alarm() {
    defmt::info!("alarm");
}

#[entry]
fn main() -> ! {
    // safety: the only Samd21Rtc in this program
    let mut rtc: Rtc<Samd21Rtc> = Rtc::new(unsafe { Samd21Rtc::new() });
    rtc.begin(false);

    rtc.attach_interrupt(on_alarm);
    rtc.set_alarm_seconds(0);
    rtc.enable_alarm(AlarmMatch::Seconds);

    loop {
        rtc.standby_mode();
        defmt::info!("woke at epoch {}", rtc.epoch());
    }
}
