//! End-to-end action flows against a scripted transport.

mod common;

use common::*;
use ninbot_core::transport::BodyError;
use ninbot_core::{
    AttackOutcome, Error, Method, ParseError, Rank, RawResponse, Status, TrainAmount,
    TrainingStat,
};

// ── preconditions ──

#[tokio::test]
async fn test_attack_before_battle_makes_no_request() {
    let (mut client, stub) = client(vec![]);
    client.resume("sess-1");

    let err = client.attack(1, "atk_basic", 2).await.unwrap_err();
    assert!(matches!(err, Error::NotInBattle));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_actions_require_login() {
    let (mut client, stub) = client(vec![]);

    assert!(matches!(client.enter_battle().await, Err(Error::NotLoggedIn)));
    assert!(matches!(client.eat_all().await, Err(Error::NotLoggedIn)));
    assert!(matches!(client.battleground().await, Err(Error::NotLoggedIn)));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_awake_actions_rejected_in_battle() {
    let (mut client, stub) = client_in_battle(vec![]).await;
    let before = stub.calls();

    let stat: TrainingStat = "+Taijutsu".parse().unwrap();
    assert!(matches!(
        client.train(Rank::Genin, &stat, TrainAmount::Max).await,
        Err(Error::NotAwake)
    ));
    assert!(matches!(client.eat_all().await, Err(Error::NotAwake)));
    assert!(matches!(client.enter_battle().await, Err(Error::NotAwake)));
    assert_eq!(stub.calls(), before);
}

// ── login ──

#[tokio::test]
async fn test_request_challenge_returns_captcha_url() {
    let (mut client, stub) = client(vec![RawResponse::ok(
        r#"<form><iframe src="http://captcha.test/noscript?k=abc" width="500"></iframe></form>"#,
    )]);

    let url = client.request_challenge("naruto", "ramen").await.unwrap();
    assert_eq!(url, "http://captcha.test/noscript?k=abc");
    assert!(!client.is_logged_in());

    let req = stub.request(0);
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.url, "http://game.test/?id=1");
    assert_eq!(stub.form_value(0, "lgn_usr_stpd").as_deref(), Some("naruto"));
    assert_eq!(stub.form_value(0, "login_password").as_deref(), Some("ramen"));
    assert_eq!(stub.form_value(0, "recaptcha_challenge_field"), None);
}

#[tokio::test]
async fn test_login_success_follows_home_redirect() {
    let (mut client, stub) = client(vec![RawResponse {
        status: 302,
        ..RawResponse::ok("")
    }
    .with_header("Location", "?id=1")
    .with_header("Set-Cookie", "PHPSESSID=fresh; path=/")]);

    assert!(client.login("03AHJ_proof", "naruto", "ramen").await.unwrap());

    let snapshot = client.session();
    assert!(snapshot.logged_in);
    assert_eq!(snapshot.token.as_deref(), Some("fresh"));
    assert_eq!(snapshot.status, Status::Awake);
    assert_eq!(
        stub.form_value(0, "recaptcha_challenge_field").as_deref(),
        Some("03AHJ_proof")
    );
    assert_eq!(
        stub.form_value(0, "recaptcha_response_field").as_deref(),
        Some("manual_challenge")
    );
}

#[tokio::test]
async fn test_login_rejected() {
    let (mut client, _stub) = client(vec![RawResponse::ok("<p>Wrong password</p>")
        .with_header("Location", "?id=2")]);

    assert!(!client.login("bad", "naruto", "ramen").await.unwrap());
    assert!(!client.is_logged_in());
}

// ── entering battle ──

#[tokio::test]
async fn test_enter_battle_follows_larger_image() {
    let (mut client, stub) = client(vec![
        entrance_page(),
        image(100),
        image(900),
        prepare_page("Rogue Ninja"),
    ]);
    client.resume("sess-1");

    let opponent = client.enter_battle().await.unwrap();
    assert_eq!(opponent, "Rogue Ninja");
    assert_eq!(client.status(), Status::InBattle);

    assert_eq!(stub.request(0).url, "http://game.test/?id=35");
    assert_eq!(stub.request(1).url, "http://game.test/images/antibot/l.gif");
    assert_eq!(stub.request(2).url, "http://game.test/images/antibot/r.gif");
    assert_eq!(stub.request(3).url, "http://game.test/?id=35&act=right1");
    assert_eq!(stub.request(3).header("cookie"), Some("PHPSESSID=sess-1"));
}

#[tokio::test]
async fn test_enter_battle_left_image_larger() {
    let (mut client, stub) = client(vec![
        entrance_page(),
        image(4096),
        image(512),
        prepare_page("Bandit"),
    ]);
    client.resume("sess-1");

    assert_eq!(client.enter_battle().await.unwrap(), "Bandit");
    assert_eq!(stub.request(3).url, "http://game.test/?id=35&act=left1");
}

#[tokio::test]
async fn test_enter_battle_compares_sizes_numerically() {
    let (mut client, stub) = client(vec![
        entrance_page(),
        image(900),
        image(1000),
        prepare_page("Bandit"),
    ]);
    client.resume("sess-1");

    client.enter_battle().await.unwrap();
    assert_eq!(stub.request(3).url, "http://game.test/?id=35&act=right1");
}

#[tokio::test]
async fn test_enter_battle_parse_failure_keeps_status() {
    let (mut client, stub) = client(vec![html("<p>You are in the hospital</p>")]);
    client.resume("sess-1");

    let err = client.enter_battle().await.unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::MissingField { .. })));
    assert_eq!(client.status(), Status::Awake);
    assert_eq!(stub.calls(), 1);
}

// ── attacking ──

#[tokio::test]
async fn test_attack_named_plays_a_round() {
    let (mut client, stub) =
        client_in_battle(vec![battleground_page(), submitted_page(), round_page()]).await;

    let bg = client.battleground().await.unwrap();
    assert_eq!(bg.id, 5150);

    let outcome = client
        .attack_named(&bg, "CLONE TECHNIQUE", "rogue ninja")
        .await
        .unwrap();
    let AttackOutcome::Round(round) = outcome else {
        panic!("expected a played round");
    };
    assert_eq!(round.hits.len(), 2);
    assert_eq!(round.hits[0].by, "Naruto");
    assert_eq!(round.hits[0].damage, 12.5);
    assert_eq!(round.hits[1].by, "Rogue Ninja");
    assert_eq!(round.hits[1].to, "Naruto");
    assert_eq!(client.status(), Status::InBattle);

    // 4 requests entering, then battleground, attack, round.
    let attack = 5;
    assert_eq!(stub.request(attack).url, "http://game.test/?id=41&act=do");
    assert_eq!(stub.form_value(attack, "action").as_deref(), Some("jut_clone"));
    assert_eq!(stub.form_value(attack, "opponent").as_deref(), Some("4471"));
    assert_eq!(stub.form_value(attack, "battle_id").as_deref(), Some("5150"));
    assert_eq!(stub.request(attack + 1).method, Method::Get);
    assert_eq!(stub.request(attack + 1).url, "http://game.test/?id=41");
}

#[tokio::test]
async fn test_attack_on_finished_battle() {
    let (mut client, stub) = client_in_battle(vec![battleground_page(), summary_page()]).await;

    let bg = client.battleground().await.unwrap();
    let outcome = client
        .attack_named(&bg, "Basic Attack", "Rogue Ninja")
        .await
        .unwrap();
    assert_eq!(outcome, AttackOutcome::BattleFinished);
    assert_eq!(client.status(), Status::Awake);

    let calls = stub.calls();
    assert!(matches!(
        client.attack_named(&bg, "Basic Attack", "Rogue Ninja").await,
        Err(Error::NotInBattle)
    ));
    assert_eq!(stub.calls(), calls);
}

#[tokio::test]
async fn test_attack_without_submission_marker() {
    let (mut client, _stub) =
        client_in_battle(vec![battleground_page(), battleground_page()]).await;

    let bg = client.battleground().await.unwrap();
    let err = client
        .attack_named(&bg, "Basic Attack", "Rogue Ninja")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ActionNotSubmitted));
    assert_eq!(client.status(), Status::InBattle);
}

#[tokio::test]
async fn test_unknown_names_are_never_sent() {
    let (mut client, stub) = client_in_battle(vec![battleground_page()]).await;
    let bg = client.battleground().await.unwrap();
    let calls = stub.calls();

    assert!(matches!(
        client.attack_named(&bg, "Rasengan", "Rogue Ninja").await,
        Err(Error::UnknownAction(_))
    ));
    assert!(matches!(
        client.attack_named(&bg, "Basic Attack", "Zabuza").await,
        Err(Error::UnknownOpponent(_))
    ));
    assert_eq!(stub.calls(), calls);
}

// ── eating ──

#[tokio::test]
async fn test_eat_all_outcomes() {
    let (mut client, stub) = client(vec![
        html("You pay for your dinner and quietly enjoy it."),
        html("No more food for you, you are full."),
        html("The ramen shop is closed."),
    ]);
    client.resume("sess-1");

    assert!(client.eat_all().await.unwrap());
    assert!(!client.eat_all().await.unwrap());
    assert!(matches!(
        client.eat_all().await,
        Err(Error::UnexpectedResponse(_))
    ));
    assert_eq!(stub.request(0).url, "http://game.test/?id=25&buy=8");
}

#[tokio::test]
async fn test_eat_all_needs_sidebar() {
    let (mut client, _stub) = client(vec![RawResponse::ok(
        "You pay for your dinner and quietly enjoy it.",
    )]);
    client.resume("sess-1");

    assert!(matches!(
        client.eat_all().await,
        Err(Error::Parse(ParseError::SidebarUnparseable))
    ));
}

// ── training ──

#[tokio::test]
async fn test_train_max_discovers_amount_first() {
    let (mut client, stub) = client(vec![
        html(r#"<select name="train_amount"><option>1</option><option>12</option></select>"#),
        html("You gained 150 exp for your efforts. You improved 2.5 points in Taijutsu"),
    ]);
    client.resume("sess-1");
    let stat: TrainingStat = "+Taijutsu".parse().unwrap();

    let result = client
        .train(Rank::Genin, &stat, TrainAmount::Max)
        .await
        .unwrap();
    assert_eq!(result.gain_exp, 150);
    assert_eq!(result.gain_stat, 2.5);

    assert_eq!(stub.calls(), 2);
    assert_eq!(stub.request(0).url, "http://game.test/?id=29&page=train");
    assert_eq!(stub.form_value(0, "train_amount"), None);
    assert_eq!(stub.form_value(0, "do_train").as_deref(), Some("Offensive"));
    assert_eq!(stub.form_value(1, "train_amount").as_deref(), Some("12"));
    assert_eq!(stub.form_value(1, "train").as_deref(), Some("Taijutsu"));
}

#[tokio::test]
async fn test_train_exact_amount_posts_once() {
    let (mut client, stub) = client(vec![html(
        "You gained 40 exp. You improved 0.75 points in Ninjutsu",
    )]);
    client.resume("sess-1");
    let stat: TrainingStat = "-Ninjutsu".parse().unwrap();

    let result = client
        .train(Rank::AcademyStudent, &stat, TrainAmount::Exact(3))
        .await
        .unwrap();
    assert_eq!(result.gain_exp, 40);
    assert_eq!(stub.calls(), 1);
    assert_eq!(stub.request(0).url, "http://game.test/?id=18&page=train");
    assert_eq!(stub.form_value(0, "train_amount").as_deref(), Some("3"));
    assert_eq!(stub.form_value(0, "do_train").as_deref(), Some("Defensive"));
}

#[tokio::test]
async fn test_train_unsupported_rank_makes_no_request() {
    let (mut client, stub) = client(vec![]);
    client.resume("sess-1");
    let stat: TrainingStat = "+Taijutsu".parse().unwrap();

    for rank in [Rank::Jounin, Rank::SpecialJounin] {
        assert!(matches!(
            client.train(rank, &stat, TrainAmount::Max).await,
            Err(Error::UnsupportedRank(r)) if r == rank
        ));
    }
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_train_broken_read_does_not_train_twice() {
    let broken = RawResponse {
        body: Err(BodyError {
            partial: "<html>".to_string(),
            message: "connection reset".to_string(),
        }),
        ..RawResponse::ok("")
    };
    let (mut client, stub) = client(vec![
        broken,
        html("You gained 40 exp. You improved 0.75 points in Taijutsu"),
    ]);
    client.resume("sess-1");
    let stat: TrainingStat = "+Taijutsu".parse().unwrap();

    let err = client
        .train(Rank::Genin, &stat, TrainAmount::Exact(3))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BodyRead { attempts: 1, .. }));
    assert_eq!(stub.calls(), 1);
}
