//! Training pages.

use serde::Serialize;

use super::rules::{group, Rule};
use super::{parse_sidebar, PageKind, ParsePage, ParseError, Sidebar};

static MAX_AMOUNT: Rule = Rule::new("maximum training amount", r">([0-9]+)</option></select>");
static TRAIN_RESULT: Rule = Rule::new(
    "training gains",
    r"You gained ([0-9]+) exp.+You improved ([0-9\.]+) points in",
);

/// The form asking how many times to train.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainAmountSelectionPage {
    pub sidebar: Sidebar,
    /// Largest selectable amount (the last option of the select).
    pub max_amount: u32,
}

impl ParsePage for TrainAmountSelectionPage {
    const KIND: PageKind = PageKind::TrainAmountSelection;

    fn parse(html: &str) -> Result<Self, ParseError> {
        let sidebar = parse_sidebar(html)?;
        let caps = MAX_AMOUNT.last(Self::KIND, html)?;
        let max_amount = MAX_AMOUNT.number(Self::KIND, group(&caps, 1))?;
        Ok(Self {
            sidebar,
            max_amount,
        })
    }
}

/// Outcome of a training session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainResultPage {
    pub sidebar: Sidebar,
    pub gain_exp: u32,
    pub gain_stat: f32,
    pub gain_chakra: f32,
    pub spent_chakra: f32,
    pub spent_stamina: f32,
}

impl ParsePage for TrainResultPage {
    const KIND: PageKind = PageKind::TrainResult;

    fn parse(html: &str) -> Result<Self, ParseError> {
        let sidebar = parse_sidebar(html)?;
        let caps = TRAIN_RESULT.first(Self::KIND, html)?;
        Ok(Self {
            sidebar,
            gain_exp: TRAIN_RESULT.number(Self::KIND, group(&caps, 1))?,
            gain_stat: TRAIN_RESULT.number(Self::KIND, group(&caps, 2))?,
            // Not rendered in the result sentence.
            gain_chakra: 0.0,
            spent_chakra: 0.0,
            spent_stamina: 0.0,
        })
    }
}
