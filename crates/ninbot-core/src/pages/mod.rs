//! Typed scrapers for the pages the bot understands.
//!
//! Every parser is a pure function from raw HTML to a typed page. Except for
//! the login captcha page (served before there is a session), each one
//! parses the [`Sidebar`] first and fails the whole page with
//! [`ParseError::SidebarUnparseable`] if that fails, so a markup change
//! shows up on the first request rather than as silently empty fields.
//!
//! Extraction is pattern based; the patterns live next to each parser as
//! named [`rules::Rule`]s.

pub mod battle;
pub mod login;
pub mod rules;
pub mod sidebar;
pub mod train;

pub use battle::{
    BattleEntrancePage, BattleHit, BattlePreparePage, BattleRoundPage, BattlegroundPage,
};
pub use login::LoginCaptchaPage;
pub use sidebar::{parse_sidebar, Sidebar};
pub use train::{TrainAmountSelectionPage, TrainResultPage};

use serde::Serialize;

const MAINTENANCE_MARKER: &str = "Maintenance";
const BATTLE_SUMMARY_MARKER: &str = ">Battle summary:</td>";

/// One variant per page the scraper understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    LoginCaptcha,
    BattleEntrance,
    BattlePrepare,
    Battleground,
    BattleRound,
    TrainAmountSelection,
    TrainResult,
}

impl PageKind {
    pub const ALL: [PageKind; 7] = [
        PageKind::LoginCaptcha,
        PageKind::BattleEntrance,
        PageKind::BattlePrepare,
        PageKind::Battleground,
        PageKind::BattleRound,
        PageKind::TrainAmountSelection,
        PageKind::TrainResult,
    ];

    /// Kebab-case identifier, as accepted by [`std::str::FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::LoginCaptcha => "login-captcha",
            PageKind::BattleEntrance => "battle-entrance",
            PageKind::BattlePrepare => "battle-prepare",
            PageKind::Battleground => "battleground",
            PageKind::BattleRound => "battle-round",
            PageKind::TrainAmountSelection => "train-amount-selection",
            PageKind::TrainResult => "train-result",
        }
    }
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        PageKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = PageKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown page kind \"{s}\" (expected one of: {})", known.join(", "))
            })
    }
}

/// A required pattern did not match, or matched with an unusable value.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Failed to parse the logout timer in the sidebar")]
    SidebarUnparseable,

    #[error("Failed to parse {page} page: couldn't find {field}")]
    MissingField {
        page: PageKind,
        field: &'static str,
    },

    #[error("Failed to parse {page} page: invalid {field} {value:?}")]
    InvalidNumber {
        page: PageKind,
        field: &'static str,
        value: String,
    },
}

/// A typed page with its own parser.
pub trait ParsePage: Sized + Into<Page> {
    const KIND: PageKind;

    fn parse(html: &str) -> Result<Self, ParseError>;
}

/// Any parsed page, tagged by kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Page {
    LoginCaptcha(LoginCaptchaPage),
    BattleEntrance(BattleEntrancePage),
    BattlePrepare(BattlePreparePage),
    Battleground(BattlegroundPage),
    BattleRound(BattleRoundPage),
    TrainAmountSelection(TrainAmountSelectionPage),
    TrainResult(TrainResultPage),
}

impl Page {
    /// Parse `html` as a page of the given kind.
    pub fn parse(kind: PageKind, html: &str) -> Result<Page, ParseError> {
        Ok(match kind {
            PageKind::LoginCaptcha => LoginCaptchaPage::parse(html)?.into(),
            PageKind::BattleEntrance => BattleEntrancePage::parse(html)?.into(),
            PageKind::BattlePrepare => BattlePreparePage::parse(html)?.into(),
            PageKind::Battleground => BattlegroundPage::parse(html)?.into(),
            PageKind::BattleRound => BattleRoundPage::parse(html)?.into(),
            PageKind::TrainAmountSelection => TrainAmountSelectionPage::parse(html)?.into(),
            PageKind::TrainResult => TrainResultPage::parse(html)?.into(),
        })
    }

    pub fn kind(&self) -> PageKind {
        match self {
            Page::LoginCaptcha(_) => PageKind::LoginCaptcha,
            Page::BattleEntrance(_) => PageKind::BattleEntrance,
            Page::BattlePrepare(_) => PageKind::BattlePrepare,
            Page::Battleground(_) => PageKind::Battleground,
            Page::BattleRound(_) => PageKind::BattleRound,
            Page::TrainAmountSelection(_) => PageKind::TrainAmountSelection,
            Page::TrainResult(_) => PageKind::TrainResult,
        }
    }

    /// The sidebar, for every page that has one.
    pub fn sidebar(&self) -> Option<&Sidebar> {
        match self {
            Page::LoginCaptcha(_) => None,
            Page::BattleEntrance(p) => Some(&p.sidebar),
            Page::BattlePrepare(p) => Some(&p.sidebar),
            Page::Battleground(p) => Some(&p.sidebar),
            Page::BattleRound(p) => Some(&p.sidebar),
            Page::TrainAmountSelection(p) => Some(&p.sidebar),
            Page::TrainResult(p) => Some(&p.sidebar),
        }
    }
}

macro_rules! page_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Page {
                fn from(page: $ty) -> Self {
                    Page::$variant(page)
                }
            }
        )*
    };
}

page_from! {
    LoginCaptcha => LoginCaptchaPage,
    BattleEntrance => BattleEntrancePage,
    BattlePrepare => BattlePreparePage,
    Battleground => BattlegroundPage,
    BattleRound => BattleRoundPage,
    TrainAmountSelection => TrainAmountSelectionPage,
    TrainResult => TrainResultPage,
}

/// Whether the server rendered the battle summary instead of a battle page.
pub fn is_battle_summary_page(html: &str) -> bool {
    html.contains(BATTLE_SUMMARY_MARKER)
}

/// Whether the server rendered its maintenance page.
pub fn is_maintenance_page(html: &str) -> bool {
    html.contains(MAINTENANCE_MARKER)
}

/// Map key for an action or opponent display name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
