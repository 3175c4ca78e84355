//! State-gated action client.
//!
//! [`Client`] mirrors the server-side state of one character: whether the
//! session is logged in and whether the character is awake or in battle.
//! Each action checks its precondition locally before sending anything,
//! sends the request through the [`SessionTransport`], parses the response
//! with the matching page parser and only then updates the held status.
//!
//! One client drives one session. Actions take `&mut self`, so a session
//! never has two requests in flight.

pub mod rank;
pub mod training;

pub use rank::{Rank, UnknownRank};
pub use training::{InvalidTrainingStat, Stance, TrainAmount, TrainingStat};

use std::time::Duration;

use crate::error::{Error, Result};
use crate::pages::{
    is_battle_summary_page, normalize_name, parse_sidebar, BattleEntrancePage, BattlePreparePage,
    BattleRoundPage, BattlegroundPage, LoginCaptchaPage, ParsePage, TrainAmountSelectionPage,
    TrainResultPage,
};
use crate::session::{Response, SessionConfig, SessionTransport};
use crate::transport::{HttpTransport, Method, Transport};

const LOGIN_PATH: &str = "/?id=1";
/// Redirect target of a successful login.
const HOME_REDIRECT: &str = "?id=1";
const BATTLE_ENTRANCE_PATH: &str = "/?id=35";
const BATTLEGROUND_PATH: &str = "/?id=41";
const ATTACK_PATH: &str = "/?id=41&act=do";
const EAT_ALL_PATH: &str = "/?id=25&buy=8";

const NO_MORE_FOOD_MARKER: &str = "No more food for you";
const ATE_MARKER: &str = "You pay for your dinner and quietly enjoy it";

/// Coarse server-side state of the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Awake,
    InBattle,
    Asleep,
}

/// Point-in-time view of the session a client holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub logged_in: bool,
    pub status: Status,
}

/// Result of submitting an attack.
#[derive(Debug, Clone, PartialEq)]
pub enum AttackOutcome {
    /// The round was played; hits in presentation order.
    Round(BattleRoundPage),
    /// The server showed the battle summary instead: the battle is over.
    BattleFinished,
}

impl BattlegroundPage {
    /// Look up an action token and opponent ID by display name, in any case.
    pub fn resolve(&self, action: &str, opponent: &str) -> Result<(&str, u64)> {
        let action_token = self
            .actions
            .get(&normalize_name(action))
            .ok_or_else(|| Error::UnknownAction(action.to_string()))?;
        let opponent_id = self
            .opponents
            .get(&normalize_name(opponent))
            .ok_or_else(|| Error::UnknownOpponent(opponent.to_string()))?;
        Ok((action_token.as_str(), *opponent_id))
    }
}

/// Drives one game session.
pub struct Client<T> {
    session: SessionTransport<T>,
    logged_in: bool,
    status: Status,
}

impl Client<HttpTransport> {
    /// Client over reqwest with the given request timeout.
    pub fn http(config: SessionConfig, timeout: Duration) -> Self {
        Self::with_transport(HttpTransport::new(timeout), config)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T, config: SessionConfig) -> Self {
        Self {
            session: SessionTransport::new(transport, config),
            logged_in: false,
            status: Status::default(),
        }
    }

    /// Continue a session that was logged in elsewhere.
    pub fn resume(&mut self, token: impl Into<String>) {
        self.session.resume(token.into());
        self.logged_in = true;
    }

    pub fn session(&self) -> SessionSnapshot {
        SessionSnapshot {
            token: self.session.token().map(str::to_string),
            logged_in: self.logged_in,
            status: self.status,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Submit the credentials without a proof and return the captcha URL the
    /// operator has to solve.
    pub async fn request_challenge(&mut self, name: &str, password: &str) -> Result<String> {
        let page: LoginCaptchaPage = self
            .fetch(
                Method::Post,
                LOGIN_PATH,
                &[
                    ("lgn_usr_stpd", name),
                    ("login_password", password),
                    ("LoginSubmit", "Submit"),
                ],
            )
            .await?;
        Ok(page.captcha_url)
    }

    /// Log in with a solved challenge. Returns whether the server accepted it.
    pub async fn login(&mut self, proof: &str, name: &str, password: &str) -> Result<bool> {
        let resp = self
            .session
            .post(
                LOGIN_PATH,
                &[
                    ("recaptcha_challenge_field", proof),
                    ("recaptcha_response_field", "manual_challenge"),
                    ("lgn_usr_stpd", name),
                    ("login_password", password),
                    ("LoginSubmit", "Submit"),
                ],
            )
            .await?;
        self.logged_in = resp.location() == Some(HOME_REDIRECT);
        tracing::debug!("Login redirect {:?}", resp.location());
        Ok(self.logged_in)
    }

    /// Pass the path-choice challenge and enter a battle. Returns the
    /// opponent's display name.
    pub async fn enter_battle(&mut self) -> Result<String> {
        self.require(Status::Awake)?;
        let entrance: BattleEntrancePage =
            self.fetch(Method::Get, BATTLE_ENTRANCE_PATH, &[]).await?;
        let link = self.choose_entrance_link(&entrance).await?;
        let prepare: BattlePreparePage = self.fetch(Method::Get, link, &[]).await?;
        self.status = Status::InBattle;
        Ok(prepare.opponent_name)
    }

    /// The larger of the two challenge images marks the path to take.
    /// Sizes compare as numbers, not as Content-Length strings; a tie picks
    /// the right link.
    async fn choose_entrance_link<'p>(&mut self, page: &'p BattleEntrancePage) -> Result<&'p str> {
        let left = self.session.get(&page.left_image).await?.content_length();
        let right = self.session.get(&page.right_image).await?.content_length();
        tracing::debug!("Entrance images: left {left} bytes, right {right} bytes");
        if left > right {
            Ok(&page.left_link)
        } else {
            Ok(&page.right_link)
        }
    }

    /// Current battle form.
    pub async fn battleground(&mut self) -> Result<BattlegroundPage> {
        self.require(Status::InBattle)?;
        self.fetch(Method::Get, BATTLEGROUND_PATH, &[]).await
    }

    /// Submit one action against one opponent and read the round's outcome.
    pub async fn attack(
        &mut self,
        battle_id: u64,
        action: &str,
        opponent_id: u64,
    ) -> Result<AttackOutcome> {
        self.require(Status::InBattle)?;
        let opponent = opponent_id.to_string();
        let battle = battle_id.to_string();
        let resp = self
            .send(
                Method::Post,
                ATTACK_PATH,
                &[
                    ("action", action),
                    ("opponent", opponent.as_str()),
                    ("Submit", "Submit"),
                    ("battle_id", battle.as_str()),
                ],
            )
            .await?;

        if is_battle_summary_page(&resp.body) {
            self.status = Status::Awake;
            return Ok(AttackOutcome::BattleFinished);
        }
        let submitted = BattlegroundPage::parse(&resp.body)?;
        if !submitted.action_submitted {
            return Err(Error::ActionNotSubmitted);
        }

        let round: BattleRoundPage = self.fetch(Method::Get, BATTLEGROUND_PATH, &[]).await?;
        Ok(AttackOutcome::Round(round))
    }

    /// [`Client::attack`] by display names, resolved against `battleground`.
    pub async fn attack_named(
        &mut self,
        battleground: &BattlegroundPage,
        action: &str,
        opponent: &str,
    ) -> Result<AttackOutcome> {
        self.require(Status::InBattle)?;
        let (action_token, opponent_id) = battleground.resolve(action, opponent)?;
        self.attack(battleground.id, action_token, opponent_id).await
    }

    /// Order "eat all you can". Returns `false` when no more food is needed.
    pub async fn eat_all(&mut self) -> Result<bool> {
        self.require(Status::Awake)?;
        let resp = self.send(Method::Get, EAT_ALL_PATH, &[]).await?;
        parse_sidebar(&resp.body)?;
        if resp.body.contains(NO_MORE_FOOD_MARKER) {
            return Ok(false);
        }
        if resp.body.contains(ATE_MARKER) {
            return Ok(true);
        }
        Err(Error::UnexpectedResponse(
            "Failed to eat: unexpected response after ordering \"eat all you can\"",
        ))
    }

    /// Train `stat` at the training grounds of `rank`.
    pub async fn train(
        &mut self,
        rank: Rank,
        stat: &TrainingStat,
        amount: TrainAmount,
    ) -> Result<TrainResultPage> {
        self.require(Status::Awake)?;
        let path = format!("/?id={}&page=train", rank.training_page()?);
        let stance = stat.stance.form_value();

        let amount = match amount {
            TrainAmount::Exact(n) => n,
            TrainAmount::Max => {
                let selection: TrainAmountSelectionPage = self
                    .fetch(
                        Method::Post,
                        &path,
                        &[
                            ("train", stat.stat.as_str()),
                            ("do_train", stance),
                            ("Submit", "Train"),
                        ],
                    )
                    .await?;
                selection.max_amount
            }
        };

        let amount = amount.to_string();
        self.fetch(
            Method::Post,
            &path,
            &[
                ("train_amount", amount.as_str()),
                ("train", stat.stat.as_str()),
                ("do_train", stance),
                ("Submit", "Train"),
            ],
        )
        .await
    }

    fn require(&self, status: Status) -> Result<()> {
        if !self.logged_in {
            return Err(Error::NotLoggedIn);
        }
        if self.status == status {
            return Ok(());
        }
        Err(match status {
            Status::Awake => Error::NotAwake,
            Status::InBattle => Error::NotInBattle,
            Status::Asleep => Error::NotAsleep,
        })
    }

    async fn send(&mut self, method: Method, path: &str, form: &[(&str, &str)]) -> Result<Response> {
        self.session.send(method, path, form).await
    }

    async fn fetch<P: ParsePage>(
        &mut self,
        method: Method,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<P> {
        let resp = self.send(method, path, form).await?;
        Ok(P::parse(&resp.body)?)
    }
}
