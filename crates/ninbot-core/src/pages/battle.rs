//! Battle pages: the anti-bot entrance, the opponent preview, the
//! battleground form and the per-round outcome.

use std::collections::BTreeMap;

use serde::Serialize;

use super::rules::{group, Rule};
use super::{normalize_name, parse_sidebar, PageKind, ParsePage, ParseError, Sidebar};

const ACTION_SUBMITTED_MARKER: &str = r#"<td align="center">Your action has been submitted"#;
const OUTCOME_FIELD: &str = "outcome";
const OUTCOME_MARKER: &str =
    r#"<td align="center" style="border-top:none;" class="subHeader">Outcome:</td>"#;

static ENTRANCE_PATHS: Rule = Rule::new(
    "path choice",
    r#"<a href="(\?id=35&act=[^"]+)"><img src=\.(/images/antibot/[^>]+)></a> <img src=\./images/antibot/or\.gif> <a href="(\?id=35&act=[^"]+)"><img src=\.(/images/antibot/[^>]+)></a>"#,
);
static OPPONENT_NAME: Rule = Rule::new(
    "opponent name",
    r#"<td align="center" style="font-weight:bold;">([^<]+)</td>"#,
);
static BATTLE_ID: Rule = Rule::new(
    "battle ID",
    r#"<input type="hidden" name="battle_id" value="([0-9]+)">"#,
);
static ACTION: Rule = Rule::new(
    "actions",
    r#"<input name="action" type="radio" value="([^"]+)" (Checked)?> ([^<]+)"#,
);
static OPPONENT: Rule = Rule::new(
    "opponents",
    r#"input name="opponent" type="radio" value="([0-9]+)" (Checked)?> ([^<]+)"#,
);
static DEAL: Rule = Rule::new(
    "damage deals",
    r##"<font color="#000080"><i>([^<]+)</i> deals ([0-9\.]+) [a-z]* *damage to <i>([^<]+)</i></font>"##,
);

/// The "choose a path" challenge shown before a battle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleEntrancePage {
    pub sidebar: Sidebar,
    /// Absolute paths of the two choices.
    pub left_link: String,
    pub right_link: String,
    /// Image paths shown for each choice.
    pub left_image: String,
    pub right_image: String,
}

impl ParsePage for BattleEntrancePage {
    const KIND: PageKind = PageKind::BattleEntrance;

    fn parse(html: &str) -> Result<Self, ParseError> {
        let sidebar = parse_sidebar(html)?;
        let caps = ENTRANCE_PATHS.first(Self::KIND, html)?;
        Ok(Self {
            sidebar,
            left_link: format!("/{}", group(&caps, 1)),
            left_image: group(&caps, 2).to_string(),
            right_link: format!("/{}", group(&caps, 3)),
            right_image: group(&caps, 4).to_string(),
        })
    }
}

/// Preview of the upcoming fight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattlePreparePage {
    pub sidebar: Sidebar,
    pub opponent_name: String,
}

impl ParsePage for BattlePreparePage {
    const KIND: PageKind = PageKind::BattlePrepare;

    fn parse(html: &str) -> Result<Self, ParseError> {
        let sidebar = parse_sidebar(html)?;
        let caps = OPPONENT_NAME.first(Self::KIND, html)?;
        Ok(Self {
            sidebar,
            opponent_name: group(&caps, 1).to_string(),
        })
    }
}

/// The battle form: available actions and opponents.
///
/// When the page only confirms a submitted action, `action_submitted` is set
/// and nothing else is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BattlegroundPage {
    pub sidebar: Sidebar,
    pub id: u64,
    /// Normalized action name to the action token the form posts.
    pub actions: BTreeMap<String, String>,
    /// Normalized opponent name to opponent ID.
    pub opponents: BTreeMap<String, u64>,
    pub action_submitted: bool,
}

impl ParsePage for BattlegroundPage {
    const KIND: PageKind = PageKind::Battleground;

    fn parse(html: &str) -> Result<Self, ParseError> {
        let sidebar = parse_sidebar(html)?;

        if html.contains(ACTION_SUBMITTED_MARKER) {
            return Ok(Self {
                sidebar,
                action_submitted: true,
                ..Self::default()
            });
        }

        let caps = BATTLE_ID.first(Self::KIND, html)?;
        let id = BATTLE_ID.number(Self::KIND, group(&caps, 1))?;

        let actions = ACTION
            .all(Self::KIND, html)?
            .iter()
            .map(|caps| (normalize_name(group(caps, 3)), group(caps, 1).to_string()))
            .collect();

        let opponents = OPPONENT
            .all(Self::KIND, html)?
            .iter()
            .map(|caps| {
                let id = OPPONENT.number(Self::KIND, group(caps, 1))?;
                Ok((normalize_name(group(caps, 3)), id))
            })
            .collect::<Result<_, ParseError>>()?;

        Ok(Self {
            sidebar,
            id,
            actions,
            opponents,
            action_submitted: false,
        })
    }
}

/// One "X deals N damage to Y" line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleHit {
    pub damage: f32,
    pub by: String,
    pub to: String,
}

/// Outcome of one battle round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleRoundPage {
    pub sidebar: Sidebar,
    /// Hits in the order the server rendered them.
    pub hits: Vec<BattleHit>,
}

impl ParsePage for BattleRoundPage {
    const KIND: PageKind = PageKind::BattleRound;

    fn parse(html: &str) -> Result<Self, ParseError> {
        let sidebar = parse_sidebar(html)?;

        if !html.contains(OUTCOME_MARKER) {
            return Err(ParseError::MissingField {
                page: Self::KIND,
                field: OUTCOME_FIELD,
            });
        }

        let hits = DEAL
            .all(Self::KIND, html)?
            .iter()
            .map(|caps| {
                Ok(BattleHit {
                    damage: DEAL.number(Self::KIND, group(caps, 2))?,
                    by: group(caps, 1).to_string(),
                    to: group(caps, 3).to_string(),
                })
            })
            .collect::<Result<_, ParseError>>()?;

        Ok(Self { sidebar, hits })
    }
}
