//! SAMD21 register access.
//!
//! The SAMD21 clocks its RTC through generic clock generator 2 and uses an
//! explicit read-request handshake to synchronize the clock register into
//! the bus clock domain.

use crate::{
    alarm::AlarmMatch,
    datetime::DateTime,
    device::{ResetCause, RtcDevice},
};
use cortex_m::interrupt::InterruptNumber;
use vcell::VolatileCell;

const RTC_BASE: usize = 0x4000_1400;
const PM_BASE: usize = 0x4000_0400;
#[cfg(not(feature = "crystalless"))]
const SYSCTRL_BASE: usize = 0x4000_0800;
const GCLK_BASE: usize = 0x4000_0C00;

const CTRL_SWRST: u16 = 1 << 0;
const CTRL_ENABLE: u16 = 1 << 1;
const CTRL_MODE_MASK: u16 = 0x3 << 2;
const CTRL_MODE_CLOCK: u16 = 0x2 << 2;
const CTRL_PRESCALER_DIV1024: u16 = 0xA << 8;

const READREQ_RREQ: u16 = 1 << 15;
const READREQ_RCONT: u16 = 1 << 14;

const INT_ALARM0: u8 = 1 << 0;
const STATUS_SYNCBUSY: u8 = 1 << 7;

const PM_APBAMASK_RTC: u32 = 1 << 5;

const RCAUSE_BOD12: u8 = 1 << 1;
const RCAUSE_BOD33: u8 = 1 << 2;
const RCAUSE_EXT: u8 = 1 << 4;
const RCAUSE_WDT: u8 = 1 << 5;
const RCAUSE_SYST: u8 = 1 << 6;

#[cfg(not(feature = "crystalless"))]
const XOSC32K_ENABLE: u16 = 1 << 1;
#[cfg(not(feature = "crystalless"))]
const XOSC32K_XTALEN: u16 = 1 << 2;
#[cfg(not(feature = "crystalless"))]
const XOSC32K_EN32K: u16 = 1 << 3;
#[cfg(not(feature = "crystalless"))]
const XOSC32K_RUNSTDBY: u16 = 1 << 6;
#[cfg(not(feature = "crystalless"))]
const XOSC32K_ONDEMAND: u16 = 1 << 7;
#[cfg(not(feature = "crystalless"))]
const XOSC32K_STARTUP_2S: u16 = 0x6 << 8;

const GCLK_STATUS_SYNCBUSY: u8 = 1 << 7;
const GENDIV_ID_GEN2: u32 = 2;
// DIVSEL divides by 2^(DIV+1): 32.768 kHz / 32 = 1.024 kHz into the RTC
const GENDIV_DIV_32: u32 = 4 << 8;
const GENCTRL_ID_GEN2: u32 = 2;
const GENCTRL_GENEN: u32 = 1 << 16;
const GENCTRL_DIVSEL: u32 = 1 << 20;
const CLKCTRL_ID_RTC: u16 = 0x04;
const CLKCTRL_GEN_GCLK2: u16 = 0x2 << 8;
const CLKCTRL_CLKEN: u16 = 1 << 14;

cfg_if::cfg_if! {
    if #[cfg(feature = "crystalless")] {
        const GENCTRL_SRC: u32 = 0x03 << 8; // OSCULP32K
    } else {
        const GENCTRL_SRC: u32 = 0x05 << 8; // XOSC32K
    }
}

const SCB_SCR_SLEEPDEEP: u32 = 0x1 << 2;

/// RTC in clock/calendar mode (MODE2).
#[repr(C)]
struct Mode2 {
    ctrl: VolatileCell<u16>,    // 0x00
    readreq: VolatileCell<u16>, // 0x02
    _evctrl: [u8; 2],           // 0x04
    _intenclr: u8,              // 0x06
    intenset: VolatileCell<u8>, // 0x07
    intflag: VolatileCell<u8>,  // 0x08
    _reserved0: u8,             // 0x09
    status: VolatileCell<u8>,   // 0x0A
    _dbgctrl: u8,               // 0x0B
    _freqcorr: u8,              // 0x0C
    _reserved1: [u8; 3],        // 0x0D
    clock: VolatileCell<u32>,   // 0x10
    _reserved2: [u8; 4],        // 0x14
    alarm0: VolatileCell<u32>,  // 0x18
    mask0: VolatileCell<u8>,    // 0x1C
}

#[repr(C)]
struct Pm {
    _reserved0: [u8; 0x18],      // 0x00
    apbamask: VolatileCell<u32>, // 0x18
    _reserved1: [u8; 0x1C],      // 0x1C
    rcause: VolatileCell<u8>,    // 0x38
}

#[cfg(not(feature = "crystalless"))]
#[repr(C)]
struct Sysctrl {
    _reserved0: [u8; 0x14],     // 0x00
    xosc32k: VolatileCell<u16>, // 0x14
}

#[repr(C)]
struct Gclk {
    _ctrl: u8,                  // 0x00
    status: VolatileCell<u8>,   // 0x01
    clkctrl: VolatileCell<u16>, // 0x02
    genctrl: VolatileCell<u32>, // 0x04
    gendiv: VolatileCell<u32>,  // 0x08
}

#[inline(always)]
fn mode2() -> &'static Mode2 {
    unsafe { &*(RTC_BASE as *const Mode2) }
}

#[inline(always)]
fn pm() -> &'static Pm {
    unsafe { &*(PM_BASE as *const Pm) }
}

#[cfg(not(feature = "crystalless"))]
#[inline(always)]
fn sysctrl() -> &'static Sysctrl {
    unsafe { &*(SYSCTRL_BASE as *const Sysctrl) }
}

#[inline(always)]
fn gclk() -> &'static Gclk {
    unsafe { &*(GCLK_BASE as *const Gclk) }
}

/// RTC interrupt, position 3 in the SAMD21 vector table.
#[derive(Debug, Clone, Copy)]
pub struct RtcIrq;

unsafe impl InterruptNumber for RtcIrq {
    #[inline]
    fn number(self) -> u16 {
        3
    }
}

/// SAMD21 RTC peripheral.
pub struct Samd21Rtc {
    _priv: (),
}

impl Samd21Rtc {
    /// Create a handle to the RTC peripheral.
    ///
    /// # Safety
    ///
    /// The hardware has exactly one RTC unit; no more than one `Samd21Rtc`
    /// may exist at any time.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _priv: () }
    }
}

impl RtcDevice for Samd21Rtc {
    fn enable_bus_clock(&mut self) {
        pm().apbamask.set(pm().apbamask.get() | PM_APBAMASK_RTC);
    }

    fn configure_oscillator(&mut self) {
        cfg_if::cfg_if! {
            if #[cfg(feature = "crystalless")] {
                // the ultra-low-power oscillator is always running
            } else {
                sysctrl().xosc32k.set(
                    XOSC32K_ONDEMAND
                        | XOSC32K_RUNSTDBY
                        | XOSC32K_EN32K
                        | XOSC32K_XTALEN
                        | XOSC32K_STARTUP_2S
                        | XOSC32K_ENABLE,
                );
            }
        }
    }

    fn route_clock(&mut self) {
        gclk().gendiv.set(GENDIV_ID_GEN2 | GENDIV_DIV_32);
        while gclk().status.get() & GCLK_STATUS_SYNCBUSY != 0 {}

        gclk()
            .genctrl
            .set(GENCTRL_GENEN | GENCTRL_SRC | GENCTRL_ID_GEN2 | GENCTRL_DIVSEL);
        while gclk().status.get() & GCLK_STATUS_SYNCBUSY != 0 {}

        gclk()
            .clkctrl
            .set(CLKCTRL_CLKEN | CLKCTRL_GEN_GCLK2 | CLKCTRL_ID_RTC);
        while gclk().status.get() & GCLK_STATUS_SYNCBUSY != 0 {}
    }

    fn reset_cause(&mut self) -> ResetCause {
        let rcause: u8 = pm().rcause.get();
        if rcause & RCAUSE_SYST != 0 {
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
        mode2().ctrl.get() & CTRL_MODE_MASK == CTRL_MODE_CLOCK
    }

    fn set_enable(&mut self, enable: bool) {
        let ctrl: u16 = mode2().ctrl.get();
        if enable {
            mode2().ctrl.set(ctrl | CTRL_ENABLE);
        } else {
            mode2().ctrl.set(ctrl & !CTRL_ENABLE);
        }
    }

    fn set_software_reset(&mut self, reset: bool) {
        let ctrl: u16 = mode2().ctrl.get();
        if reset {
            mode2().ctrl.set(ctrl | CTRL_SWRST);
        } else {
            mode2().ctrl.set(ctrl & !CTRL_SWRST);
        }
    }

    fn apply_calendar_config(&mut self) {
        // reads use an explicit request, not continuous synchronization
        mode2().readreq.set(mode2().readreq.get() & !READREQ_RCONT);
        // calendar mode with a 1 Hz tick; MATCHCLR stays clear, CLKREP=0
        // selects the 24-hour representation
        mode2().ctrl.set(CTRL_MODE_CLOCK | CTRL_PRESCALER_DIV1024);
    }

    fn enable_alarm_interrupt(&mut self) {
        mode2().intenset.set(INT_ALARM0);
    }

    fn write_match_mask(&mut self, policy: AlarmMatch) {
        mode2().mask0.set(policy.sel());
    }

    fn request_clock_read(&mut self) {
        mode2().readreq.set(READREQ_RREQ);
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
        mode2().status.get() & STATUS_SYNCBUSY != 0
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
    use super::{Gclk, Mode2, Pm};
    use static_assertions::const_assert_eq;

    const_assert_eq!(core::mem::size_of::<Mode2>(), 0x20);
    const_assert_eq!(core::mem::size_of::<Pm>(), 0x3C);
    const_assert_eq!(core::mem::size_of::<Gclk>(), 0x0C);

    #[test]
    fn register_block_layout() {
        assert_eq!(core::mem::offset_of!(Mode2, clock), 0x10);
        assert_eq!(core::mem::offset_of!(Mode2, alarm0), 0x18);
        assert_eq!(core::mem::offset_of!(Mode2, mask0), 0x1C);
        assert_eq!(core::mem::offset_of!(Pm, apbamask), 0x18);
        assert_eq!(core::mem::offset_of!(Pm, rcause), 0x38);
        assert_eq!(core::mem::offset_of!(Gclk, gendiv), 0x08);
    }
}
