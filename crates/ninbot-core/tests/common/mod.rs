#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ninbot_core::transport::NetworkError;
use ninbot_core::{Client, RawResponse, Request, SessionConfig, Transport};

pub const SIDEBAR: &str = r#"<td><b>Logout timer:</b> <span id="lt"><noscript>25 minutes 12 seconds</noscript></span></td>"#;
pub const OUTCOME: &str =
    r#"<td align="center" style="border-top:none;" class="subHeader">Outcome:</td>"#;

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct StubTransport {
    script: Mutex<VecDeque<Result<RawResponse, NetworkError>>>,
    requests: Mutex<Vec<Request>>,
}

impl StubTransport {
    pub fn new(script: Vec<RawResponse>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> Request {
        self.requests.lock().unwrap()[index].clone()
    }

    pub fn form_value(&self, index: usize, name: &str) -> Option<String> {
        self.request(index)
            .form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: &Request) -> Result<RawResponse, NetworkError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(NetworkError::new("stub script exhausted")))
    }
}

pub fn config() -> SessionConfig {
    SessionConfig {
        maintenance_delay: Duration::ZERO,
        ..SessionConfig::with_base_url("http://game.test")
    }
}

pub fn client(script: Vec<RawResponse>) -> (Client<Arc<StubTransport>>, Arc<StubTransport>) {
    let stub = StubTransport::new(script);
    (Client::with_transport(stub.clone(), config()), stub)
}

/// A logged-in page with the given content.
pub fn html(body: &str) -> RawResponse {
    RawResponse::ok(format!(
        "<html><body><table><tr>{SIDEBAR}</tr></table>\n{body}\n</body></html>"
    ))
}

pub fn entrance_page() -> RawResponse {
    html(
        r#"<a href="?id=35&act=left1"><img src=./images/antibot/l.gif></a> <img src=./images/antibot/or.gif> <a href="?id=35&act=right1"><img src=./images/antibot/r.gif></a>"#,
    )
}

pub fn image(size: u64) -> RawResponse {
    RawResponse::ok("").with_header("Content-Length", size.to_string())
}

pub fn prepare_page(opponent: &str) -> RawResponse {
    html(&format!(
        r#"<td align="center" style="font-weight:bold;">{opponent}</td>"#
    ))
}

pub fn battleground_page() -> RawResponse {
    html(
        r#"<form method="post">
<input type="hidden" name="battle_id" value="5150">
<input name="action" type="radio" value="atk_basic" Checked> Basic Attack<br>
<input name="action" type="radio" value="jut_clone" > Clone Technique<br>
<input name="opponent" type="radio" value="4471" Checked> Rogue Ninja</td>
</form>"#,
    )
}

pub fn submitted_page() -> RawResponse {
    html(r#"<td align="center">Your action has been submitted</td>"#)
}

pub fn round_page() -> RawResponse {
    html(&format!(
        r##"{OUTCOME}
<font color="#000080"><i>Naruto</i> deals 12.5 damage to <i>Rogue Ninja</i></font><br>
<font color="#000080"><i>Rogue Ninja</i> deals 7 damage to <i>Naruto</i></font><br>"##
    ))
}

pub fn summary_page() -> RawResponse {
    html(r#"<td class="subHeader">Battle summary:</td>"#)
}

/// A client that is logged in and already in battle, with its stub.
pub async fn client_in_battle(
    mut script: Vec<RawResponse>,
) -> (Client<Arc<StubTransport>>, Arc<StubTransport>) {
    let mut full = vec![entrance_page(), image(100), image(900), prepare_page("Rogue Ninja")];
    full.append(&mut script);
    let (mut client, stub) = client(full);
    client.resume("sess-1");
    client.enter_battle().await.unwrap();
    (client, stub)
}
