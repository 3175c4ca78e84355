use serde::Serialize;

use super::rules::{group, Rule};
use super::{PageKind, ParsePage, ParseError};

static CAPTCHA_URL: Rule = Rule::new("captcha iframe", r#"<iframe src="([^"]+)"#);

/// The login form re-rendered with a captcha challenge.
///
/// Served to a visitor without a session, so there is no sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginCaptchaPage {
    pub captcha_url: String,
}

impl ParsePage for LoginCaptchaPage {
    const KIND: PageKind = PageKind::LoginCaptcha;

    fn parse(html: &str) -> Result<Self, ParseError> {
        let caps = CAPTCHA_URL.first(Self::KIND, html)?;
        Ok(Self {
            captcha_url: group(&caps, 1).to_string(),
        })
    }
}
