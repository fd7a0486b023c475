//! Duration formatting and parsing for the editor, plan table and summary.

use crate::error::ValidationError;

/// `m:ss`, as shown in round tables and the running panel.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// `"{m}m {s}s"`, or just `"{s}s"` under a minute.
pub fn format_total(secs: u64) -> String {
    let minutes = secs / 60;
    let seconds = secs % 60;
    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// `"{m}m {ss}s"`, the editor's display for breathe and hold fields.
pub fn format_field(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    format!("{sign}{}m {:02}s", secs / 60, secs % 60)
}

/// Parse `"1m 30s"`, `"90s"`, `"10 sec"` or a bare integer into seconds.
///
/// A leading `-` is kept so that validation can report negative input.
pub fn parse_duration(input: &str) -> Result<i64, ValidationError> {
    let err = || ValidationError::Duration {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    if body.is_empty() {
        return Err(err());
    }

    let secs = if let Ok(n) = body.parse::<i64>() {
        n
    } else if let Some((minutes, rest)) = body.split_once('m') {
        let minutes: i64 = minutes.trim().parse().map_err(|_| err())?;
        let rest = rest.trim();
        let seconds: i64 = if rest.is_empty() {
            0
        } else {
            rest.strip_suffix('s')
                .ok_or_else(err)?
                .trim()
                .parse()
                .map_err(|_| err())?
        };
        if !(0..60).contains(&seconds) {
            return Err(err());
        }
        minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .ok_or_else(err)?
    } else {
        let digits = body
            .strip_suffix("sec")
            .or_else(|| body.strip_suffix('s'))
            .ok_or_else(err)?;
        digits.trim().parse().map_err(|_| err())?
    };

    Ok(if negative { -secs } else { secs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(600), "10:00");
    }

    #[test]
    fn total_drops_minutes_when_zero() {
        assert_eq!(format_total(45), "45s");
        assert_eq!(format_total(3015), "50m 15s");
        assert_eq!(format_total(120), "2m 0s");
    }

    #[test]
    fn field_format() {
        assert_eq!(format_field(60), "1m 00s");
        assert_eq!(format_field(125), "2m 05s");
        assert_eq!(format_field(-5), "-0m 05s");
    }

    #[test]
    fn parses_editor_formats() {
        assert_eq!(parse_duration("1m 00s").unwrap(), 60);
        assert_eq!(parse_duration("2m 30s").unwrap(), 150);
        assert_eq!(parse_duration("2m").unwrap(), 120);
        assert_eq!(parse_duration("10 sec").unwrap(), 10);
        assert_eq!(parse_duration("45s").unwrap(), 45);
        assert_eq!(parse_duration("90").unwrap(), 90);
        assert_eq!(parse_duration(" -15 ").unwrap(), -15);
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", "abc", "1m 75s", "m 10s", "10 minutes", "-", "1m 10"] {
            assert!(parse_duration(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn parse_inverts_field_format() {
        for secs in [0, 9, 60, 61, 3599] {
            assert_eq!(parse_duration(&format_field(secs)).unwrap(), secs);
        }
    }
}
