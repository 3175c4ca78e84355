//! Solving the login captcha with a human in the loop.

use anyhow::{bail, Context};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

/// Turns a captcha URL into the proof code the login form expects.
#[async_trait]
pub trait ChallengeSolver: Send {
    async fn solve(&mut self, captcha_url: &str) -> anyhow::Result<String>;
}

/// Shows the captcha to the operator and reads the proof code from a line
/// of input.
pub struct PromptSolver<R = BufReader<Stdin>> {
    popup: bool,
    input: R,
}

impl PromptSolver {
    /// Read the proof from stdin. With `popup` the captcha opens in the
    /// default browser, otherwise its URL is only logged.
    pub fn stdin(popup: bool) -> Self {
        Self::new(popup, BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> PromptSolver<R> {
    pub fn new(popup: bool, input: R) -> Self {
        Self { popup, input }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> ChallengeSolver for PromptSolver<R> {
    async fn solve(&mut self, captcha_url: &str) -> anyhow::Result<String> {
        if self.popup {
            tracing::info!("A captcha window will pop up, solve it and paste the resulting code");
            open::that(captcha_url)
                .context("Can't open the captcha webpage with a browser")?;
        } else {
            tracing::info!(
                "Open the following url, solve it and paste the resulting code: {}",
                captcha_url
            );
        }

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .await
            .context("Can't read the captcha proof code")?;
        let code = line.trim();
        if code.is_empty() {
            bail!("No captcha proof code given");
        }
        Ok(code.to_string())
    }
}
