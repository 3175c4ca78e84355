//! The status fragment rendered on every logged-in page.

use serde::Serialize;

use super::rules::{group, Rule};
use super::ParseError;

const ONE_HOUR_MARKER: &str = "<noscript>1 hour";
const IN_BATTLE_MARKER: &str = r#"<a href="?id=41">In battle!</a>"#;
const HOSPITALIZED_MARKER: &str = r#"<a href="?id=34">Hospitalized!</a>"#;

static LOGOUT_TIMER: Rule = Rule::new(
    "logout timer",
    r"<b>Logout timer:</b>.+<noscript>([0-9]+) minutes (([0-9]+) seconds)*",
);

/// Per-page status flags and the logout countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Sidebar {
    pub in_battle: bool,
    pub hospitalized: bool,
    /// Minutes until the session is logged out.
    pub logout_timer: f32,
}

/// Parse the sidebar out of any logged-in page.
pub fn parse_sidebar(html: &str) -> Result<Sidebar, ParseError> {
    let logout_timer = if html.contains(ONE_HOUR_MARKER) {
        60.0
    } else {
        let caps = LOGOUT_TIMER
            .regex()
            .captures(html)
            .ok_or(ParseError::SidebarUnparseable)?;
        let minutes: f32 = group(&caps, 1)
            .parse()
            .map_err(|_| ParseError::SidebarUnparseable)?;
        let seconds: f32 = match group(&caps, 3) {
            "" => 0.0,
            raw => raw.parse().map_err(|_| ParseError::SidebarUnparseable)?,
        };
        minutes + seconds / 60.0
    };

    Ok(Sidebar {
        in_battle: html.contains(IN_BATTLE_MARKER),
        hospitalized: html.contains(HOSPITALIZED_MARKER),
        logout_timer,
    })
}
