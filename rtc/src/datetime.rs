//! Calendar date and time as stored by the peripheral.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Unix timestamp of 2000-01-01T00:00:00Z.
///
/// The hardware year field starts counting at 2000, so this is the earliest
/// instant the calendar can represent.
pub const Y2K_EPOCH_OFFSET: u32 = 946_684_800;

/// Calendar date and time, packed the way the CLOCK and ALARM registers
/// store it.
///
/// The year field is an offset from the year 2000 (0 through 63).
///
/// Setters mask their argument to the width of the hardware field and
/// perform no validation beyond that; storing an out-of-range value
/// (e.g. month 13) produces hardware-defined behavior, the same as writing
/// it to the register directly.
///
/// # Example
///
/// ```
/// use samd_rtc::DateTime;
///
/// const MIDSUMMER: DateTime = DateTime::DEFAULT
///     .set_year(23)
///     .set_month(6)
///     .set_day(15)
///     .set_hours(10)
///     .set_minutes(30)
///     .set_seconds(0);
/// # assert_eq!(MIDSUMMER.year(), 23);
/// # assert_eq!(MIDSUMMER.month(), 6);
/// # assert_eq!(MIDSUMMER.day(), 15);
/// # assert_eq!(MIDSUMMER.hours(), 10);
/// # assert_eq!(MIDSUMMER.minutes(), 30);
/// # assert_eq!(MIDSUMMER.seconds(), 0);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    val: u32,
}

impl DateTime {
    pub(crate) const SECOND_MASK: u32 = 0x3F;
    pub(crate) const MINUTE_MASK: u32 = 0x3F << 6;
    pub(crate) const HOUR_MASK: u32 = 0x1F << 12;
    pub(crate) const DAY_MASK: u32 = 0x1F << 17;
    pub(crate) const MONTH_MASK: u32 = 0xF << 22;
    pub(crate) const YEAR_MASK: u32 = 0x3F << 26;

    /// Date and time the calendar is initialized to after a cold boot:
    /// 2000-01-01 00:00:00.
    ///
    /// # Example
    ///
    /// ```
    /// use samd_rtc::DateTime;
    ///
    /// assert_eq!(DateTime::DEFAULT.year(), 0);
    /// assert_eq!(DateTime::DEFAULT.month(), 1);
    /// assert_eq!(DateTime::DEFAULT.day(), 1);
    /// assert_eq!(DateTime::DEFAULT.to_unix_epoch(), samd_rtc::Y2K_EPOCH_OFFSET);
    /// ```
    pub const DEFAULT: Self = Self { val: 0 }.set_month(1).set_day(1);

    /// Create a date-time from the raw register value.
    #[must_use]
    pub const fn from_bits(val: u32) -> Self {
        Self { val }
    }

    /// Raw register value.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.val
    }

    /// Set the seconds field, masked to 0-63.
    #[must_use = "set_seconds returns a modified DateTime"]
    pub const fn set_seconds(mut self, seconds: u8) -> Self {
        self.val = (self.val & !Self::SECOND_MASK) | ((seconds as u32) & Self::SECOND_MASK);
        self
    }

    /// Seconds field, 0-59 for a valid calendar value.
    #[must_use]
    pub const fn seconds(self) -> u8 {
        (self.val & Self::SECOND_MASK) as u8
    }

    /// Set the minutes field, masked to 0-63.
    #[must_use = "set_minutes returns a modified DateTime"]
    pub const fn set_minutes(mut self, minutes: u8) -> Self {
        self.val = (self.val & !Self::MINUTE_MASK) | (((minutes as u32) << 6) & Self::MINUTE_MASK);
        self
    }

    /// Minutes field, 0-59 for a valid calendar value.
    #[must_use]
    pub const fn minutes(self) -> u8 {
        ((self.val & Self::MINUTE_MASK) >> 6) as u8
    }

    /// Set the hours field, masked to 0-31.
    #[must_use = "set_hours returns a modified DateTime"]
    pub const fn set_hours(mut self, hours: u8) -> Self {
        self.val = (self.val & !Self::HOUR_MASK) | (((hours as u32) << 12) & Self::HOUR_MASK);
        self
    }

    /// Hours field, 0-23 for a valid calendar value (24-hour representation).
    #[must_use]
    pub const fn hours(self) -> u8 {
        ((self.val & Self::HOUR_MASK) >> 12) as u8
    }

    /// Set the day-of-month field, masked to 0-31.
    #[must_use = "set_day returns a modified DateTime"]
    pub const fn set_day(mut self, day: u8) -> Self {
        self.val = (self.val & !Self::DAY_MASK) | (((day as u32) << 17) & Self::DAY_MASK);
        self
    }

    /// Day-of-month field, 1-31 for a valid calendar value.
    #[must_use]
    pub const fn day(self) -> u8 {
        ((self.val & Self::DAY_MASK) >> 17) as u8
    }

    /// Set the month field, masked to 0-15.
    #[must_use = "set_month returns a modified DateTime"]
    pub const fn set_month(mut self, month: u8) -> Self {
        self.val = (self.val & !Self::MONTH_MASK) | (((month as u32) << 22) & Self::MONTH_MASK);
        self
    }

    /// Month field, 1-12 for a valid calendar value.
    #[must_use]
    pub const fn month(self) -> u8 {
        ((self.val & Self::MONTH_MASK) >> 22) as u8
    }

    /// Set the year field, an offset from 2000, masked to 0-63.
    #[must_use = "set_year returns a modified DateTime"]
    pub const fn set_year(mut self, year: u8) -> Self {
        self.val = (self.val & !Self::YEAR_MASK) | (((year as u32) << 26) & Self::YEAR_MASK);
        self
    }

    /// Year field as an offset from 2000, 0-63.
    #[must_use]
    pub const fn year(self) -> u8 {
        ((self.val & Self::YEAR_MASK) >> 26) as u8
    }

    /// Convert from a [`chrono::NaiveDateTime`].
    ///
    /// Fields are masked to the hardware field widths; years outside
    /// 2000-2063 do not survive the conversion.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use samd_rtc::DateTime;
    ///
    /// let naive = NaiveDate::from_ymd_opt(2023, 6, 15)
    ///     .unwrap()
    ///     .and_hms_opt(10, 30, 0)
    ///     .unwrap();
    /// let dt: DateTime = DateTime::from_naive(naive);
    /// assert_eq!(dt.to_naive(), Some(naive));
    /// ```
    #[must_use]
    pub fn from_naive(naive: NaiveDateTime) -> Self {
        Self { val: 0 }
            .set_year(naive.year().wrapping_sub(2000) as u8)
            .set_month(naive.month() as u8)
            .set_day(naive.day() as u8)
            .set_hours(naive.hour() as u8)
            .set_minutes(naive.minute() as u8)
            .set_seconds(naive.second() as u8)
    }

    /// Convert to a [`chrono::NaiveDateTime`].
    ///
    /// Returns `None` if the stored fields do not form a valid calendar
    /// value (e.g. the all-zero reset image, where month and day are 0).
    #[must_use]
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            2000 + i32::from(self.year()),
            u32::from(self.month()),
            u32::from(self.day()),
        )?
        .and_hms_opt(
            u32::from(self.hours()),
            u32::from(self.minutes()),
            u32::from(self.seconds()),
        )
    }

    /// Convert from a Unix timestamp (UTC, no daylight saving).
    ///
    /// Timestamps before [`Y2K_EPOCH_OFFSET`] are clamped to it.
    ///
    /// # Example
    ///
    /// ```
    /// use samd_rtc::{DateTime, Y2K_EPOCH_OFFSET};
    ///
    /// assert_eq!(DateTime::from_unix_epoch(0), DateTime::DEFAULT);
    /// assert_eq!(DateTime::from_unix_epoch(Y2K_EPOCH_OFFSET + 61).seconds(), 1);
    /// assert_eq!(DateTime::from_unix_epoch(Y2K_EPOCH_OFFSET + 61).minutes(), 1);
    /// ```
    #[must_use]
    pub fn from_unix_epoch(ts: u32) -> Self {
        let ts: u32 = ts.max(Y2K_EPOCH_OFFSET);
        match chrono::DateTime::from_timestamp(i64::from(ts), 0) {
            Some(utc) => Self::from_naive(utc.naive_utc()),
            // unreachable, every u32 timestamp is representable
            None => Self::DEFAULT,
        }
    }

    /// Convert to a Unix timestamp (UTC, no daylight saving).
    ///
    /// An image that does not form a valid calendar value converts to
    /// [`Y2K_EPOCH_OFFSET`].
    #[must_use]
    pub fn to_unix_epoch(self) -> u32 {
        match self.to_naive() {
            Some(naive) => naive.and_utc().timestamp() as u32,
            None => Y2K_EPOCH_OFFSET,
        }
    }
}

impl Default for DateTime {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<NaiveDateTime> for DateTime {
    #[inline]
    fn from(naive: NaiveDateTime) -> Self {
        Self::from_naive(naive)
    }
}

#[cfg(test)]
mod tests {
    use super::{DateTime, Y2K_EPOCH_OFFSET};
    use chrono::NaiveDate;

    #[test]
    fn default_image() {
        // month=1 day=1, everything else zero
        assert_eq!(DateTime::DEFAULT.bits(), (1 << 22) | (1 << 17));
    }

    #[test]
    fn field_round_trip() {
        let dt: DateTime = DateTime::from_bits(0)
            .set_seconds(59)
            .set_minutes(59)
            .set_hours(23)
            .set_day(31)
            .set_month(12)
            .set_year(63);
        assert_eq!(dt.seconds(), 59);
        assert_eq!(dt.minutes(), 59);
        assert_eq!(dt.hours(), 23);
        assert_eq!(dt.day(), 31);
        assert_eq!(dt.month(), 12);
        assert_eq!(dt.year(), 63);
    }

    #[test]
    fn fields_do_not_alias() {
        let dt: DateTime = DateTime::from_bits(u32::MAX).set_minutes(0);
        assert_eq!(dt.seconds(), 63);
        assert_eq!(dt.minutes(), 0);
        assert_eq!(dt.hours(), 31);
    }

    #[test]
    fn epoch_round_trip() {
        let ts: u32 = 1_686_825_000; // 2023-06-15T10:30:00Z
        let dt: DateTime = DateTime::from_unix_epoch(ts);
        assert_eq!(dt.year(), 23);
        assert_eq!(dt.month(), 6);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hours(), 10);
        assert_eq!(dt.minutes(), 30);
        assert_eq!(dt.seconds(), 0);
        assert_eq!(dt.to_unix_epoch(), ts);
    }

    #[test]
    fn epoch_floor_clamp() {
        assert_eq!(DateTime::from_unix_epoch(0).to_unix_epoch(), Y2K_EPOCH_OFFSET);
        assert_eq!(
            DateTime::from_unix_epoch(Y2K_EPOCH_OFFSET - 1).to_unix_epoch(),
            Y2K_EPOCH_OFFSET
        );
        assert_eq!(
            DateTime::from_unix_epoch(Y2K_EPOCH_OFFSET).to_unix_epoch(),
            Y2K_EPOCH_OFFSET
        );
    }

    #[test]
    fn invalid_image_converts_to_floor() {
        assert_eq!(DateTime::from_bits(0).to_naive(), None);
        assert_eq!(DateTime::from_bits(0).to_unix_epoch(), Y2K_EPOCH_OFFSET);
    }

    #[test]
    fn leap_day() {
        let naive = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let dt: DateTime = DateTime::from_naive(naive);
        assert_eq!(dt.to_naive(), Some(naive));
        assert_eq!(DateTime::from_unix_epoch(dt.to_unix_epoch()), dt);
    }
}
