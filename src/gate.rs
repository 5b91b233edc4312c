use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::GateError;

pub const ACTIVITY_URL_PATTERN: &str = r"strava\.com/activities/";

pub static ACTIVITY_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ACTIVITY_URL_PATTERN).unwrap());

/// Reject any address that is not an activity page before extraction runs.
pub fn check(location: &str, pattern: &Regex, message: &str) -> Result<(), GateError> {
    if location.is_empty() || !pattern.is_match(location) {
        debug!("Gate rejected {:?}", location);
        return Err(GateError {
            message: message.to_string(),
            location: location.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MSG: &str = "Please open a Strava activity page";

    #[test]
    fn accepts_activity_pages() {
        assert!(check("https://www.strava.com/activities/123456", &ACTIVITY_URL_RE, MSG).is_ok());
        assert!(check("https://strava.com/activities/1/overview", &ACTIVITY_URL_RE, MSG).is_ok());
    }

    #[test]
    fn rejects_other_pages_with_message() {
        let err = check("https://www.strava.com/dashboard", &ACTIVITY_URL_RE, MSG).unwrap_err();
        assert_eq!(err.to_string(), MSG);
        assert_eq!(err.location, "https://www.strava.com/dashboard");
    }

    #[test]
    fn rejects_empty_address() {
        assert!(check("", &ACTIVITY_URL_RE, MSG).is_err());
    }
}
