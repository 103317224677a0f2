//! Human-readable durations.
//!
//! The grammar is a sequence of decimal numbers, each with an optional
//! fraction and a mandatory unit suffix, such as `300ms`, `1.5h` or `2h45m`.
//! Valid units are `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m` and `h`. A lone
//! `0` is accepted without a unit. [`format`] produces the canonical spelling,
//! which [`parse`] always reads back to the same value.

use std::fmt::Write;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Reason a duration token was rejected.
///
/// Kept as a static string so [`crate::ValueError`] can carry it cheaply.
pub type Reason = &'static str;

/// Parses a duration token.
pub fn parse(token: &str) -> Result<Duration, Reason> {
    let (negative, mut rest) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err("empty duration");
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, after) = rest.split_at(int_len);

        let (frac_part, after) = match after.strip_prefix('.') {
            Some(tail) => {
                let frac_len = tail.bytes().take_while(u8::is_ascii_digit).count();
                tail.split_at(frac_len)
            }
            None => ("", after),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err("expected a number");
        }

        let unit_len = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        let scale = unit_scale(unit).ok_or(if unit.is_empty() {
            "missing unit"
        } else {
            "unknown unit"
        })?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| "duration out of range")?
        };
        let mut span = whole.checked_mul(scale).ok_or("duration out of range")?;

        // Digits past the 19th cannot change a nanosecond count.
        let frac_digits = &frac_part[..frac_part.len().min(19)];
        if !frac_digits.is_empty() {
            let numerator: u128 = frac_digits.parse().map_err(|_| "invalid fraction")?;
            let denominator = 10u128.pow(frac_digits.len() as u32);
            span += numerator * scale / denominator;
        }

        total = total.checked_add(span).ok_or("duration out of range")?;
        if total > u64::MAX as u128 {
            return Err("duration out of range");
        }
        rest = after;
    }

    if negative && total != 0 {
        return Err("negative duration");
    }
    Ok(Duration::from_nanos(total as u64))
}

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Renders a duration in its canonical form, e.g. `1m30s`, `1.5ms` or `0s`.
pub fn format(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < NANOS_PER_SEC {
        return if nanos < 1_000 {
            format!("{nanos}ns")
        } else if nanos < 1_000_000 {
            format!("{}µs", decimal(nanos, 1_000))
        } else {
            format!("{}ms", decimal(nanos, 1_000_000))
        };
    }

    let secs = nanos / NANOS_PER_SEC;
    let (hours, minutes, seconds) = (secs / 3600, (secs / 60) % 60, secs % 60);

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(
        out,
        "{}s",
        decimal(seconds * NANOS_PER_SEC + nanos % NANOS_PER_SEC, NANOS_PER_SEC)
    );
    out
}

/// Formats `value / scale` with the shortest exact fractional part.
fn decimal(value: u128, scale: u128) -> String {
    let (whole, frac) = (value / scale, value % scale);
    if frac == 0 {
        return whole.to_string();
    }
    let width = scale.ilog10() as usize;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_simple_units() {
        assert_eq!(parse("7s"), Ok(Duration::from_secs(7)));
        assert_eq!(parse("300ms"), Ok(Duration::from_millis(300)));
        assert_eq!(parse("2us"), Ok(Duration::from_micros(2)));
        assert_eq!(parse("2µs"), Ok(Duration::from_micros(2)));
        assert_eq!(parse("5ns"), Ok(Duration::from_nanos(5)));
        assert_eq!(parse("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn test_parses_compound_and_fractional() {
        assert_eq!(parse("1m30s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse("2h45m"), Ok(Duration::from_secs(2 * 3600 + 45 * 60)));
        assert_eq!(parse("1.5h"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse(".5s"), Ok(Duration::from_millis(500)));
        assert_eq!(parse("1.s"), Ok(Duration::from_secs(1)));
    }

    #[test]
    fn test_zero_forms() {
        assert_eq!(parse("0"), Ok(Duration::ZERO));
        assert_eq!(parse("-0"), Ok(Duration::ZERO));
        assert_eq!(parse("0s"), Ok(Duration::ZERO));
        assert_eq!(parse("+0h"), Ok(Duration::ZERO));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(parse(""), Err("empty duration"));
        assert_eq!(parse("7"), Err("missing unit"));
        assert_eq!(parse("7days"), Err("unknown unit"));
        assert_eq!(parse("s"), Err("expected a number"));
        assert_eq!(parse("."), Err("expected a number"));
        assert_eq!(parse("-1s"), Err("negative duration"));
        assert!(parse("99999999999999999999h").is_err());
    }

    #[test]
    fn test_formats_canonically() {
        assert_eq!(format(Duration::ZERO), "0s");
        assert_eq!(format(Duration::from_secs(7)), "7s");
        assert_eq!(format(Duration::from_secs(90)), "1m30s");
        assert_eq!(format(Duration::from_secs(60)), "1m0s");
        assert_eq!(format(Duration::from_secs(3600)), "1h0m0s");
        assert_eq!(format(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format(Duration::from_micros(1500)), "1.5ms");
        assert_eq!(format(Duration::from_nanos(1500)), "1.5µs");
        assert_eq!(format(Duration::from_nanos(12)), "12ns");
    }

    #[test]
    fn test_format_then_parse_is_identity() {
        for nanos in [1, 999, 1_000, 1_001, 59_999_999_999, 3_600_000_000_001, u64::MAX] {
            let d = Duration::from_nanos(nanos);
            assert_eq!(parse(&format(d)), Ok(d), "round trip of {nanos}ns");
        }
    }
}
