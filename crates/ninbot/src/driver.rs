//! The bot loops: log in, then train or battle until stopped.

use std::time::Duration;

use anyhow::{bail, Context};
use ninbot_core::{AttackOutcome, BattleHit, Client, TrainAmount, Transport};
use rand::Rng;

use crate::challenge::ChallengeSolver;
use crate::config::Config;

/// Upper bound of the random pause added to every rest.
pub const DEFAULT_JITTER: Duration = Duration::from_secs(2);

/// What the bot does once logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    #[default]
    Train,
    Battle,
}

/// Runs one mode against one client.
pub struct Driver<T> {
    client: Client<T>,
    config: Config,
    /// Iterations (trainings or battles) before stopping; `None` runs forever.
    cycles: Option<u64>,
    jitter: Duration,
}

impl<T: Transport> Driver<T> {
    pub fn new(client: Client<T>, config: Config) -> Self {
        Self {
            client,
            config,
            cycles: None,
            jitter: DEFAULT_JITTER,
        }
    }

    pub fn with_cycles(mut self, cycles: Option<u64>) -> Self {
        self.cycles = cycles;
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    /// Use an already logged-in session instead of logging in.
    pub fn resume(&mut self, token: String) {
        self.client.resume(token);
        self.log_logged_in();
    }

    /// Log in through the captcha challenge.
    pub async fn login(&mut self, solver: &mut dyn ChallengeSolver) -> anyhow::Result<()> {
        let account = &self.config.account;
        tracing::info!("Ninbot is logging in");
        let url = self
            .client
            .request_challenge(&account.name, &account.password)
            .await
            .context("Can't get captcha URL")?;
        let proof = solver.solve(&url).await?;
        let accepted = self
            .client
            .login(&proof, &account.name, &account.password)
            .await
            .context("Can't login")?;
        if !accepted {
            bail!("Name, password or captcha proof code are wrong");
        }
        self.log_logged_in();
        Ok(())
    }

    pub async fn run(&mut self, mode: Mode) -> anyhow::Result<()> {
        match mode {
            Mode::Train => self.train().await,
            Mode::Battle => self.battle().await,
        }
    }

    /// Train each configured stat in turn, resting in between.
    pub async fn train(&mut self) -> anyhow::Result<()> {
        let rank = self.config.account.rank;
        let stats = self.config.train.sequence.clone();
        let rest = self.config.train.rest;

        for (done, stat) in stats.iter().cycle().enumerate() {
            if self.finished(done as u64) {
                break;
            }
            let result = self
                .client
                .train(rank, stat, TrainAmount::Max)
                .await
                .context("Can't train")?;
            tracing::info!(
                "Training improved {} by {}, now resting...",
                stat,
                result.gain_stat
            );
            self.rest(rest).await;
        }
        Ok(())
    }

    /// Fight battles back to back, eating after each one.
    pub async fn battle(&mut self) -> anyhow::Result<()> {
        let actions = self.config.battle.sequence.clone();
        let rest = self.config.battle.rest;
        let mut battles = 0u64;

        while !self.finished(battles) {
            tracing::info!("Entering battle...");
            let opponent = self
                .client
                .enter_battle()
                .await
                .context("Failed to enter battle")?;
            tracing::info!("Fighting {}", opponent);
            let battleground = self
                .client
                .battleground()
                .await
                .context("Failed to get battleground")?;

            for action in actions.iter().cycle() {
                let outcome = self
                    .client
                    .attack_named(&battleground, action, &opponent)
                    .await
                    .context("Failed to attack")?;
                match outcome {
                    AttackOutcome::Round(round) => {
                        tracing::info!("{}", hit_summary(&round.hits, &opponent));
                    }
                    AttackOutcome::BattleFinished => break,
                }
            }

            battles += 1;
            tracing::info!("Battle number {} done", battles);
            if self.client.eat_all().await.context("Failed to eat all")? {
                tracing::info!("Ate all you can");
            } else {
                tracing::info!("Can't eat anymore");
            }
            tracing::info!("Resting a while...");
            self.rest(rest).await;
        }
        Ok(())
    }

    fn finished(&self, done: u64) -> bool {
        self.cycles.is_some_and(|limit| done >= limit)
    }

    async fn rest(&self, secs: u64) {
        let mut pause = Duration::from_secs(secs);
        if !self.jitter.is_zero() {
            pause += rand::thread_rng().gen_range(Duration::ZERO..self.jitter);
        }
        tokio::time::sleep(pause).await;
    }

    fn log_logged_in(&self) {
        let snapshot = self.client.session();
        tracing::info!(
            "Logged in as {} with PHPSESSID = {}",
            self.config.account.name,
            snapshot.token.as_deref().unwrap_or("")
        );
    }
}

/// One line per round: who hit for how much, damage truncated.
pub fn hit_summary(hits: &[BattleHit], opponent: &str) -> String {
    let mut line = String::new();
    for hit in hits {
        let damage = hit.damage as i64;
        if hit.by == opponent {
            line.push_str(&format!("\tHe hits {damage}\t"));
        } else {
            line.push_str(&format!("\tYou hit {damage}\t"));
        }
    }
    line
}
