use ::time::{Date, Month, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use der::DateTime;
use der::asn1::{GeneralizedTime, UtcTime};

use super::Simplified;
use crate::error::{CertPathError, Result};

/// `Time ::= CHOICE { utcTime UTCTime, generalTime GeneralizedTime }`.
///
/// Both variants carry a UTC timestamp truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Time {
    UtcTime(OffsetDateTime),
    GeneralizedTime(OffsetDateTime),
}

impl Time {
    /// Picks UTCTime for years 1950 through 2049 and GeneralizedTime otherwise.
    pub fn from_date(value: OffsetDateTime) -> Result<Self> {
        let value = value
            .to_offset(UtcOffset::UTC)
            .replace_nanosecond(0)?;
        if (1950..2050).contains(&value.year()) {
            Ok(Time::UtcTime(value))
        } else {
            Ok(Time::GeneralizedTime(value))
        }
    }

    pub fn value(&self) -> OffsetDateTime {
        match *self {
            Time::UtcTime(value) | Time::GeneralizedTime(value) => value,
        }
    }
}

impl Simplified for Time {
    type Schema = x509_cert::time::Time;
    const NAME: &'static str = "Time";

    fn from_schema(schema: Self::Schema) -> Result<Self> {
        match schema {
            x509_cert::time::Time::UtcTime(utc) => {
                Ok(Time::UtcTime(to_offset_date_time(utc.to_date_time())?))
            }
            x509_cert::time::Time::GeneralTime(general) => Ok(Time::GeneralizedTime(
                to_offset_date_time(general.to_date_time())?,
            )),
        }
    }

    fn to_schema(&self) -> Result<Self::Schema> {
        match *self {
            Time::UtcTime(value) => Ok(x509_cert::time::Time::UtcTime(UtcTime::from_date_time(
                to_date_time(value)?,
            )?)),
            Time::GeneralizedTime(value) => Ok(x509_cert::time::Time::GeneralTime(
                GeneralizedTime::from_date_time(to_date_time(value)?),
            )),
        }
    }
}

pub(crate) fn to_offset_date_time(value: DateTime) -> Result<OffsetDateTime> {
    let date = Date::from_calendar_date(
        i32::from(value.year()),
        Month::try_from(value.month())?,
        value.day(),
    )?;
    let time = ::time::Time::from_hms(value.hour(), value.minutes(), value.seconds())?;
    Ok(PrimitiveDateTime::new(date, time).assume_utc())
}

pub(crate) fn to_date_time(value: OffsetDateTime) -> Result<DateTime> {
    let value = value.to_offset(UtcOffset::UTC);
    let year = u16::try_from(value.year())
        .map_err(|_| CertPathError::InvalidInput(format!("year {} out of range", value.year())))?;
    Ok(DateTime::new(
        year,
        u8::from(value.month()),
        value.day(),
        value.hour(),
        value.minute(),
        value.second(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::time::macros::datetime;

    #[test]
    fn variant_follows_year() {
        let utc = Time::from_date(datetime!(2049-12-31 23:59:59 UTC)).unwrap();
        assert!(matches!(utc, Time::UtcTime(_)));
        let general = Time::from_date(datetime!(2050-01-01 00:00:00 UTC)).unwrap();
        assert!(matches!(general, Time::GeneralizedTime(_)));
    }

    #[test]
    fn encodes_with_matching_tag() {
        let utc = Time::from_date(datetime!(2024-02-29 12:30:00 UTC)).unwrap();
        let der = utc.to_der().unwrap();
        assert_eq!(der[0], 0x17);
        assert_eq!(&der[2..], b"240229123000Z");
        assert_eq!(Time::from_der(&der).unwrap(), utc);

        let general = Time::from_date(datetime!(2100-01-01 00:00:00 UTC)).unwrap();
        assert_eq!(general.to_der().unwrap()[0], 0x18);
    }

    #[test]
    fn drops_sub_second_precision() {
        let value = Time::from_date(datetime!(2030-06-01 08:00:00.75 +02:00)).unwrap();
        assert_eq!(value.value(), datetime!(2030-06-01 06:00:00 UTC));
    }

    #[test]
    fn wrong_tag_is_a_schema_mismatch() {
        let err = Time::from_der(&[0x02, 0x01, 0x00]).unwrap_err();
        assert!(matches!(err, CertPathError::SchemaMismatch { structure: "Time", .. }));
    }
}
