// Bit-packed date and sequence-number codec
//
// Four raw bytes jointly encode a calendar date and a 10-bit sequence
// counter:
//
//   b0  low 8 bits of the sequence number
//   b1  high 6 bits: day offset within a 64-day block
//       low 2 bits: high 2 bits of the sequence number
//   b2  bit 7: year parity; bits 3-6: month (0-indexed);
//       bits 0-2: 64-day block index
//   b3  half-year count since 1900

use chrono::{Datelike, Duration, NaiveDate};

use crate::schema::{FieldType, FormatError, RangeError, StructValue, Value, Warning};

/// Reference year the packed date counts from, in two-year steps.
pub const EPOCH_YEAR: i32 = 1900;

/// Last year whose half-year count still fits one byte.
pub const MAX_YEAR: i32 = EPOCH_YEAR + 2 * (u8::MAX as i32) + 1;

/// Highest sequence number representable in 10 bits.
pub const MAX_SEQUENCE: u16 = 0x3FF;

/// January 1 of the epoch year.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(EPOCH_YEAR, 1, 1).unwrap_or_default()
}

/// Composite field mapping four raw bytes to `{date, sequence_number}`.
///
/// Decode and encode are exact algebraic inverses over the supported
/// domain (years 1900..=2411, sequence 0..=1023).
pub struct SequenceAndDate;

impl SequenceAndDate {
    /// Derive the logical date and sequence number from the raw bytes.
    ///
    /// The packed month is redundant with the day arithmetic; when the two
    /// disagree the quirky packing may have been mis-derived for this input,
    /// so a non-fatal warning is recorded and the computed date returned.
    pub fn unpack(raw: [u8; 4], warnings: &mut Vec<Warning>) -> (NaiveDate, u16) {
        let [b0, b1, b2, b3] = raw;

        let day_of_year = (((b2 % 8) as i64) << 6) + (b1 >> 2) as i64;
        let year = EPOCH_YEAR + 2 * b3 as i32 + (b2 >> 7) as i32;

        // Jan 1 exists for every reachable year (1900..=2411)
        let year_start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default();
        let date = year_start + Duration::days(day_of_year);

        let packed_month = (b2 % 128) >> 3;
        if date.month() != packed_month as u32 + 1 {
            let warning = Warning::TimestampInconsistency {
                packed_month: packed_month + 1,
                derived_month: date.month() as u8,
            };
            tracing::warn!("{warning}");
            warnings.push(warning);
        }

        let sequence = b0 as u16 + 256 * (b1 % 4) as u16;
        (date, sequence)
    }

    /// Pack a date and sequence number into the four raw bytes.
    pub fn pack(date: NaiveDate, sequence: u16) -> Result<[u8; 4], RangeError> {
        if sequence > MAX_SEQUENCE {
            return Err(RangeError::SequenceOutOfRange(sequence));
        }
        let year = date.year();
        if !(EPOCH_YEAR..=MAX_YEAR).contains(&year) {
            return Err(RangeError::YearOutOfRange(year));
        }

        let month = date.month0() as u8;
        let day_of_year = date.ordinal0();
        let year_parity = (year % 2) as u8;

        let b0 = (sequence & 0xFF) as u8;
        let b1 = (((day_of_year % 64) as u8) << 2) | ((sequence >> 8) as u8);
        let b2 = (year_parity << 7) | (month << 3) | ((day_of_year >> 6) as u8);
        let b3 = ((year - EPOCH_YEAR) / 2) as u8;

        Ok([b0, b1, b2, b3])
    }
}

impl FieldType for SequenceAndDate {
    fn size(&self) -> usize {
        4
    }

    fn default_value(&self) -> Value {
        let mut sv = StructValue::new();
        // Sequence numbers start at 1 in shipped files
        sv.set("sequence_number", 1u64);
        sv.set("date", epoch());
        Value::Struct(sv)
    }

    fn decode(&self, data: &[u8], warnings: &mut Vec<Warning>) -> Result<Value, FormatError> {
        if data.len() < 4 {
            return Err(FormatError::BufferTooShort {
                expected: 4,
                actual: data.len(),
            });
        }
        let raw = [data[0], data[1], data[2], data[3]];
        let (date, sequence) = Self::unpack(raw, warnings);

        let mut sv = StructValue::new();
        sv.set("date", date);
        sv.set("sequence_number", sequence as u64);
        Ok(Value::Struct(sv))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, RangeError> {
        let sv = value.as_struct().ok_or(RangeError::TypeMismatch {
            expected: "struct",
            actual: value.kind(),
        })?;

        let date = sv.date("date").unwrap_or_else(epoch);
        let sequence = sv.uint("sequence_number").unwrap_or(1) as u16;

        Ok(SequenceAndDate::pack(date, sequence)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_pack_known_value() {
        // 2022-07-22: day-of-year 202 = 3*64 + 10, month 6 (0-indexed),
        // even year -> parity 0, half-year count 61
        let raw = SequenceAndDate::pack(date(2022, 7, 22), 1).unwrap();
        assert_eq!(raw, [1, 10 << 2, (6 << 3) | 3, 61]);
    }

    #[test]
    fn test_unpack_known_value() {
        let mut warnings = Vec::new();
        let (d, seq) = SequenceAndDate::unpack([1, 10 << 2, (6 << 3) | 3, 61], &mut warnings);
        assert_eq!(d, date(2022, 7, 22));
        assert_eq!(seq, 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_sequence_straddles_bytes() {
        // 1023 = 0xFF low byte + upper 2 bits in b1
        let raw = SequenceAndDate::pack(date(2000, 1, 1), 1023).unwrap();
        assert_eq!(raw[0], 0xFF);
        assert_eq!(raw[1] & 0x03, 0x03);

        let mut warnings = Vec::new();
        let (_, seq) = SequenceAndDate::unpack(raw, &mut warnings);
        assert_eq!(seq, 1023);
    }

    #[test]
    fn test_round_trip_over_domain() {
        // Sample the domain: a spread of years including both parities and
        // the epoch/limit ends, every month, edge days, several sequences.
        let years = [1900, 1901, 1999, 2000, 2022, 2023, 2399, 2400, 2411];
        let sequences = [0u16, 1, 255, 256, 512, 1023];

        for year in years {
            for month in 1..=12 {
                for day in [1, 15, 28] {
                    let d = date(year, month, day);
                    for seq in sequences {
                        let raw = SequenceAndDate::pack(d, seq).unwrap();
                        let mut warnings = Vec::new();
                        let (d2, s2) = SequenceAndDate::unpack(raw, &mut warnings);
                        assert_eq!((d2, s2), (d, seq), "failed for {d} seq {seq}");
                        assert!(warnings.is_empty(), "spurious warning for {d}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_leap_day_round_trip() {
        let d = date(2000, 2, 29);
        let raw = SequenceAndDate::pack(d, 7).unwrap();
        let mut warnings = Vec::new();
        let (d2, s2) = SequenceAndDate::unpack(raw, &mut warnings);
        assert_eq!((d2, s2), (d, 7));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_year_end_round_trip() {
        for d in [date(2023, 12, 31), date(2024, 12, 31)] {
            let raw = SequenceAndDate::pack(d, 0).unwrap();
            let mut warnings = Vec::new();
            let (d2, _) = SequenceAndDate::unpack(raw, &mut warnings);
            assert_eq!(d2, d);
        }
    }

    #[test]
    fn test_out_of_domain() {
        assert_eq!(
            SequenceAndDate::pack(date(2000, 1, 1), 1024),
            Err(RangeError::SequenceOutOfRange(1024))
        );
        assert_eq!(
            SequenceAndDate::pack(date(1899, 12, 31), 0),
            Err(RangeError::YearOutOfRange(1899))
        );
        assert_eq!(
            SequenceAndDate::pack(date(2412, 1, 1), 0),
            Err(RangeError::YearOutOfRange(2412))
        );
    }

    #[test]
    fn test_inconsistent_month_warns_but_decodes() {
        // Claim month 11 (0-indexed 10) while the day arithmetic lands in
        // January
        let raw = [0, 0, 10 << 3, 50];
        let mut warnings = Vec::new();
        let (d, _) = SequenceAndDate::unpack(raw, &mut warnings);
        assert_eq!(d, date(2000, 1, 1));
        assert_eq!(
            warnings,
            vec![Warning::TimestampInconsistency {
                packed_month: 11,
                derived_month: 1
            }]
        );
    }

    #[test]
    fn test_field_type_round_trip() {
        let ty = SequenceAndDate;
        let mut sv = StructValue::new();
        sv.set("date", date(2010, 3, 14));
        sv.set("sequence_number", 300u64);

        let bytes = ty.encode(&Value::Struct(sv)).unwrap();
        assert_eq!(bytes.len(), 4);

        let mut warnings = Vec::new();
        let back = ty.decode(&bytes, &mut warnings).unwrap();
        let sv = back.as_struct().unwrap();
        assert_eq!(sv.date("date"), Some(date(2010, 3, 14)));
        assert_eq!(sv.uint("sequence_number"), Some(300));
    }
}
