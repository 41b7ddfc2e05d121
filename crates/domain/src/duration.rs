/// Activation duration applied when no policy rule can be resolved.
pub const DEFAULT_MAX_ACTIVATION_HOURS: u32 = 8;

/// Parses a policy maximum-duration value into whole hours.
///
/// Supported forms are `PT{n}H`, `PT{n}M` (rounded down, never below one
/// hour) and `P{n}D`. Anything else is untranslatable and yields `None` so
/// callers fall through to their default.
#[must_use]
pub fn parse_activation_duration(value: &str) -> Option<u32> {
    let value = value.trim();

    if let Some(body) = value.strip_prefix("PT") {
        if let Some(hours) = body.strip_suffix('H') {
            return hours.parse::<u32>().ok();
        }
        if let Some(minutes) = body.strip_suffix('M') {
            return minutes.parse::<u32>().ok().map(|minutes| (minutes / 60).max(1));
        }
        return None;
    }

    if let Some(body) = value.strip_prefix('P') {
        if let Some(days) = body.strip_suffix('D') {
            return days.parse::<u32>().ok().and_then(|days| days.checked_mul(24));
        }
    }

    None
}

/// Formats a whole-hour duration as an ISO-8601 duration string.
#[must_use]
pub fn format_hours(hours: u32) -> String {
    format!("PT{hours}H")
}

#[cfg(test)]
mod tests {
    use super::{format_hours, parse_activation_duration};

    #[test]
    fn parses_hour_durations() {
        assert_eq!(parse_activation_duration("PT2H"), Some(2));
        assert_eq!(parse_activation_duration("PT8H"), Some(8));
    }

    #[test]
    fn minute_durations_round_down_but_never_below_one_hour() {
        assert_eq!(parse_activation_duration("PT90M"), Some(1));
        assert_eq!(parse_activation_duration("PT30M"), Some(1));
        assert_eq!(parse_activation_duration("PT240M"), Some(4));
    }

    #[test]
    fn parses_day_durations() {
        assert_eq!(parse_activation_duration("P1D"), Some(24));
        assert_eq!(parse_activation_duration("P14D"), Some(336));
    }

    #[test]
    fn unrecognized_forms_yield_none() {
        assert_eq!(parse_activation_duration("PT2H30M"), None);
        assert_eq!(parse_activation_duration("P1Y"), None);
        assert_eq!(parse_activation_duration("8 hours"), None);
        assert_eq!(parse_activation_duration(""), None);
    }

    #[test]
    fn formats_whole_hours() {
        assert_eq!(format_hours(8), "PT8H");
    }
}
