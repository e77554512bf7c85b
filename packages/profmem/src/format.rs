//! Human-readable rendering of byte counts.

const BYTES: &str = "B";
const UNITS: [&str; 5] = [BYTES, "KiB", "MiB", "GiB", "TiB"];

// A value is shown in the current unit once it drops below this many units.
const MAX_WHOLE_UNITS: f64 = 10.0 * 1024.0;

// Below this many units (other than bytes) we show one decimal place.
const MAX_FRACTIONAL_UNITS: f64 = 100.0;

const UNIT_SCALE: f64 = 1024.0;

/// Formats a byte count as a short human-readable string with a binary unit suffix.
///
/// The value is scaled to the first unit in which it is below 10240, so that the rendered
/// number has at most five digits. Values below 100 of any unit larger than a byte are shown
/// with one decimal place. The sign of negative values is preserved.
///
/// # Examples
///
/// ```
/// use profmem::format_size;
///
/// assert_eq!(format_size(999), "999 B");
/// assert_eq!(format_size(10 * 1024), "10.0 KiB");
/// assert_eq!(format_size(100 * 1024), "100 KiB");
/// assert_eq!(format_size(-20 * 1024 * 1024), "-20.0 MiB");
/// ```
#[must_use]
pub fn format_size(bytes: i64) -> String {
    #[expect(
        clippy::cast_precision_loss,
        reason = "display only - we never show more than five significant digits"
    )]
    let mut value = bytes as f64;

    let [smaller @ .., largest] = UNITS;

    for unit in smaller {
        if value.abs() < MAX_FRACTIONAL_UNITS && unit != BYTES {
            return format!("{value:.1} {unit}");
        }

        if value.abs() < MAX_WHOLE_UNITS {
            return format!("{value:.0} {unit}");
        }

        value /= UNIT_SCALE;
    }

    // The largest unit absorbs everything that is left, however big.
    if value.abs() < MAX_FRACTIONAL_UNITS {
        format!("{value:.1} {largest}")
    } else {
        format!("{value:.0} {largest}")
    }
}

/// Formats an unsigned byte count, such as a memory reading, via [`format_size`].
///
/// Counts beyond `i64::MAX` are clamped; no process gets anywhere near that.
pub(crate) fn format_memory(bytes: u64) -> String {
    format_size(i64::try_from(bytes).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const KIB: i64 = 1024;
    const MIB: i64 = 1024 * KIB;
    const GIB: i64 = 1024 * MIB;
    const TIB: i64 = 1024 * GIB;

    #[test]
    fn zero_is_bytes() {
        assert_eq!(format_size(0), "0 B");
    }

    #[test]
    fn small_values_stay_in_bytes_without_decimals() {
        assert_eq!(format_size(1), "1 B");
        assert_eq!(format_size(99), "99 B");
        assert_eq!(format_size(999), "999 B");
        assert_eq!(format_size(KIB), "1024 B");
        assert_eq!(format_size(10 * KIB - 1), "10239 B");
    }

    #[test]
    fn crossing_the_whole_unit_limit_moves_to_next_unit() {
        assert_eq!(format_size(10 * KIB), "10.0 KiB");
        assert_eq!(format_size(15 * KIB), "15.0 KiB");
        assert_eq!(format_size(99 * KIB), "99.0 KiB");
    }

    #[test]
    fn one_hundred_units_or_more_drops_decimals() {
        assert_eq!(format_size(100 * KIB), "100 KiB");
        assert_eq!(format_size(MIB), "1024 KiB");
        assert_eq!(format_size(10 * MIB - KIB), "10239 KiB");
    }

    #[test]
    fn larger_units() {
        assert_eq!(format_size(10 * MIB), "10.0 MiB");
        assert_eq!(format_size(512 * MIB), "512 MiB");
        assert_eq!(format_size(10 * GIB), "10.0 GiB");
        assert_eq!(format_size(10 * TIB), "10.0 TiB");
    }

    #[test]
    fn largest_unit_absorbs_everything() {
        assert_eq!(format_size(1024 * TIB), "1024 TiB");
        assert_eq!(format_size(100_000 * TIB), "100000 TiB");
        assert_eq!(format_size(i64::MAX), "8388608 TiB");
    }

    #[test]
    fn fractional_values_are_rendered_with_one_decimal() {
        assert_eq!(format_size(10 * KIB + 512), "10.5 KiB");
    }

    #[test]
    fn negative_values_keep_their_sign() {
        assert_eq!(format_size(-1), "-1 B");
        assert_eq!(format_size(-999), "-999 B");
        assert_eq!(format_size(-10 * KIB), "-10.0 KiB");
        assert_eq!(format_size(-100 * KIB), "-100 KiB");
    }

    #[test]
    fn every_non_negative_value_has_a_unit_and_at_most_one_decimal_point() {
        let mut value: i64 = 0;

        while value < i64::MAX / 3 {
            let formatted = format_size(value);

            assert!(
                UNITS.iter().any(|unit| formatted.ends_with(&format!(" {unit}"))),
                "{formatted} has no known unit"
            );
            assert!(
                formatted.matches('.').count() <= 1,
                "{formatted} has more than one decimal point"
            );

            value = value * 3 + 1;
        }
    }

    #[test]
    fn memory_readings_are_clamped() {
        assert_eq!(format_memory(0), "0 B");
        assert_eq!(format_memory(u64::MAX), format_size(i64::MAX));
    }
}
