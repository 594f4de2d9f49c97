//! SAMD5x/E5x register access.
//!
//! The SAMD5x selects the RTC clock source directly in `OSC32KCTRL` (no
//! generic clock generator in the path) and keeps the clock register
//! continuously synchronized for reading via the `CLOCKSYNC` control bit,
//! so there is no read-request handshake.

use crate::{
    alarm::AlarmMatch,
    datetime::DateTime,
    device::{ResetCause, RtcDevice},
};
use cortex_m::interrupt::InterruptNumber;
use vcell::VolatileCell;

const RTC_BASE: usize = 0x4000_2400;
const MCLK_BASE: usize = 0x4000_0800;
const OSC32KCTRL_BASE: usize = 0x4000_1400;
const RSTC_BASE: usize = 0x4000_0C00;

const CTRLA_SWRST: u16 = 1 << 0;
const CTRLA_ENABLE: u16 = 1 << 1;
const CTRLA_MODE_MASK: u16 = 0x3 << 2;
const CTRLA_MODE_CLOCK: u16 = 0x2 << 2;
const CTRLA_PRESCALER_DIV1024: u16 = 0xB << 8;
const CTRLA_CLOCKSYNC: u16 = 1 << 15;

const INT_ALARM0: u16 = 1 << 0;

const MCLK_APBAMASK_RTC: u32 = 1 << 9;

const RCAUSE_BOD12: u8 = 1 << 1;
const RCAUSE_BOD33: u8 = 1 << 2;
const RCAUSE_EXT: u8 = 1 << 4;
const RCAUSE_WDT: u8 = 1 << 5;
const RCAUSE_SYST: u8 = 1 << 6;
const RCAUSE_BACKUP: u8 = 1 << 7;

cfg_if::cfg_if! {
    if #[cfg(feature = "crystalless")] {
        // 1.024 kHz tap of the ultra-low-power oscillator
        const RTCCTRL_RTCSEL: u8 = 0x0;
        const OSCULP32K_EN32K: u32 = 1 << 1;
        const OSCULP32K_EN1K: u32 = 1 << 2;
    } else {
        // 1.024 kHz tap of the 32.768 kHz crystal oscillator
        const RTCCTRL_RTCSEL: u8 = 0x4;
        const XOSC32K_ENABLE: u16 = 1 << 1;
        const XOSC32K_XTALEN: u16 = 1 << 2;
        const XOSC32K_EN32K: u16 = 1 << 3;
        const XOSC32K_EN1K: u16 = 1 << 4;
        const XOSC32K_RUNSTDBY: u16 = 1 << 6;
        const XOSC32K_ONDEMAND: u16 = 1 << 7;
        const XOSC32K_STARTUP_2S: u16 = 0x6 << 8;
        const XOSC32K_CGM_XT: u16 = 0x1 << 13;
    }
}

const SCB_SCR_SLEEPDEEP: u32 = 0x1 << 2;

/// RTC in clock/calendar mode (MODE2).
#[repr(C)]
struct Mode2 {
    ctrla: VolatileCell<u16>,    // 0x00
    _ctrlb: [u8; 2],             // 0x02
    _evctrl: [u8; 4],            // 0x04
    _intenclr: [u8; 2],          // 0x08
    intenset: VolatileCell<u16>, // 0x0A
    intflag: VolatileCell<u16>,  // 0x0C
    _dbgctrl: u8,                // 0x0E
    _reserved0: u8,              // 0x0F
    syncbusy: VolatileCell<u32>, // 0x10
    _freqcorr: u8,               // 0x14
    _reserved1: [u8; 3],         // 0x15
    clock: VolatileCell<u32>,    // 0x18
    _reserved2: [u8; 4],         // 0x1C
    alarm0: VolatileCell<u32>,   // 0x20
    mask0: VolatileCell<u8>,     // 0x24
}

#[repr(C)]
struct Mclk {
    _reserved0: [u8; 0x14],      // 0x00
    apbamask: VolatileCell<u32>, // 0x14
}

#[repr(C)]
struct Osc32kctrl {
    _reserved0: [u8; 0x10],       // 0x00
    rtcctrl: VolatileCell<u8>,    // 0x10
    _reserved1: [u8; 3],          // 0x11
    #[allow(dead_code)] // only one oscillator source is compiled in
    xosc32k: VolatileCell<u16>,   // 0x14
    _reserved2: [u8; 6],          // 0x16
    #[allow(dead_code)] // only one oscillator source is compiled in
    osculp32k: VolatileCell<u32>, // 0x1C
}

#[repr(C)]
struct Rstc {
    rcause: VolatileCell<u8>, // 0x00
}

#[inline(always)]
fn mode2() -> &'static Mode2 {
    unsafe { &*(RTC_BASE as *const Mode2) }
}

#[inline(always)]
fn mclk() -> &'static Mclk {
    unsafe { &*(MCLK_BASE as *const Mclk) }
}

#[inline(always)]
fn osc32kctrl() -> &'static Osc32kctrl {
    unsafe { &*(OSC32KCTRL_BASE as *const Osc32kctrl) }
}

#[inline(always)]
fn rstc() -> &'static Rstc {
    unsafe { &*(RSTC_BASE as *const Rstc) }
}

/// RTC interrupt, position 11 in the SAMD5x vector table.
#[derive(Debug, Clone, Copy)]
pub struct RtcIrq;

unsafe impl InterruptNumber for RtcIrq {
    #[inline]
    fn number(self) -> u16 {
        11
    }
}

/// SAMD5x RTC peripheral.
pub struct Samd51Rtc {
    _priv: (),
}

impl Samd51Rtc {
    /// Create a handle to the RTC peripheral.
    ///
    /// # Safety
    ///
    /// The hardware has exactly one RTC unit; no more than one `Samd51Rtc`
    /// may exist at any time.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _priv: () }
    }
}

impl RtcDevice for Samd51Rtc {
    fn enable_bus_clock(&mut self) {
        mclk().apbamask.set(mclk().apbamask.get() | MCLK_APBAMASK_RTC);
    }

    fn configure_oscillator(&mut self) {
        cfg_if::cfg_if! {
            if #[cfg(feature = "crystalless")] {
                // keep the factory calibration, enable both output taps
                let osculp32k: u32 = osc32kctrl().osculp32k.get();
                osc32kctrl()
                    .osculp32k
                    .set(osculp32k | OSCULP32K_EN32K | OSCULP32K_EN1K);
            } else {
                osc32kctrl().xosc32k.set(
                    XOSC32K_ONDEMAND
                        | XOSC32K_RUNSTDBY
                        | XOSC32K_EN1K
                        | XOSC32K_EN32K
                        | XOSC32K_XTALEN
                        | XOSC32K_STARTUP_2S
                        | XOSC32K_CGM_XT
                        | XOSC32K_ENABLE,
                );
            }
        }
    }

    fn route_clock(&mut self) {
        // 1.024 kHz into the RTC; the divide-by-1024 prescaler makes 1 Hz
        osc32kctrl().rtcctrl.set(RTCCTRL_RTCSEL);
    }

    fn reset_cause(&mut self) -> ResetCause {
        let rcause: u8 = rstc().rcause.get();
        if rcause & RCAUSE_BACKUP != 0 {
            ResetCause::Backup
        } else if rcause & RCAUSE_SYST != 0 {
            ResetCause::System
        } else if rcause & RCAUSE_WDT != 0 {
            ResetCause::Watchdog
        } else if rcause & RCAUSE_EXT != 0 {
            ResetCause::External
        } else if rcause & (RCAUSE_BOD12 | RCAUSE_BOD33) != 0 {
            ResetCause::Brownout
        } else {
            ResetCause::PowerOn
        }
    }

    fn in_calendar_mode(&mut self) -> bool {
        mode2().ctrla.get() & CTRLA_MODE_MASK == CTRLA_MODE_CLOCK
    }

    fn set_enable(&mut self, enable: bool) {
        let ctrla: u16 = mode2().ctrla.get();
        if enable {
            mode2().ctrla.set(ctrla | CTRLA_ENABLE);
        } else {
            mode2().ctrla.set(ctrla & !CTRLA_ENABLE);
        }
    }

    fn set_software_reset(&mut self, reset: bool) {
        let ctrla: u16 = mode2().ctrla.get();
        if reset {
            mode2().ctrla.set(ctrla | CTRLA_SWRST);
        } else {
            mode2().ctrla.set(ctrla & !CTRLA_SWRST);
        }
    }

    fn apply_calendar_config(&mut self) {
        // calendar mode with a 1 Hz tick and continuous clock register
        // synchronization; MATCHCLR stays clear, CLKREP=0 selects the
        // 24-hour representation
        mode2()
            .ctrla
            .set(CTRLA_MODE_CLOCK | CTRLA_PRESCALER_DIV1024 | CTRLA_CLOCKSYNC);
    }

    fn enable_alarm_interrupt(&mut self) {
        mode2().intenset.set(INT_ALARM0);
    }

    fn write_match_mask(&mut self, policy: AlarmMatch) {
        mode2().mask0.set(policy.sel());
    }

    fn request_clock_read(&mut self) {
        // CLOCK is continuously synchronized (CLOCKSYNC); nothing to
        // request, the sync-busy wait that follows covers the read
    }

    fn read_clock(&mut self) -> DateTime {
        DateTime::from_bits(mode2().clock.get())
    }

    fn write_clock(&mut self, value: DateTime) {
        mode2().clock.set(value.bits());
    }

    fn read_alarm(&mut self) -> DateTime {
        DateTime::from_bits(mode2().alarm0.get())
    }

    fn write_alarm(&mut self, value: DateTime) {
        mode2().alarm0.set(value.bits());
    }

    fn is_syncing(&mut self) -> bool {
        mode2().syncbusy.get() != 0
    }

    fn enable_interrupt_vector(&mut self) {
        let mut nvic = unsafe { cortex_m::Peripherals::steal() }.NVIC;
        unsafe { nvic.set_priority(RtcIrq, 0) };
        unsafe { cortex_m::peripheral::NVIC::unmask(RtcIrq) };
    }

    fn standby(&mut self) {
        // safety: single core, RMW of the system control register
        unsafe {
            (*cortex_m::peripheral::SCB::PTR)
                .scr
                .modify(|scr| scr | SCB_SCR_SLEEPDEEP)
        };
        cortex_m::asm::dsb();
        cortex_m::asm::wfi();
    }
}

/// Service the RTC interrupt.
///
/// Call this from the `RTC` interrupt handler. Invokes the attached
/// callback, then clears the alarm-pending flag; the clear must remain the
/// last action or the interrupt re-fires.
pub fn on_interrupt() {
    crate::rtc::run_alarm_callback();
    mode2().intflag.set(INT_ALARM0);
}

#[cfg(test)]
mod tests {
    use super::{Mclk, Mode2, Osc32kctrl};
    use static_assertions::const_assert_eq;

    const_assert_eq!(core::mem::size_of::<Mode2>(), 0x28);
    const_assert_eq!(core::mem::size_of::<Mclk>(), 0x18);
    const_assert_eq!(core::mem::size_of::<Osc32kctrl>(), 0x20);

    #[test]
    fn register_block_layout() {
        assert_eq!(core::mem::offset_of!(Mode2, syncbusy), 0x10);
        assert_eq!(core::mem::offset_of!(Mode2, clock), 0x18);
        assert_eq!(core::mem::offset_of!(Mode2, alarm0), 0x20);
        assert_eq!(core::mem::offset_of!(Mode2, mask0), 0x24);
        assert_eq!(core::mem::offset_of!(Osc32kctrl, rtcctrl), 0x10);
        assert_eq!(core::mem::offset_of!(Osc32kctrl, osculp32k), 0x1C);
    }
}
