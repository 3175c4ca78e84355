// Copyright 2026 Ninbot Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ninbot core: session transport, page scrapers and the state-gated action
//! client for The Ninja-RPG.
//!
//! Data flows one way per operation: [`Client`] sends a request through
//! [`SessionTransport`], the raw HTML comes back, a parser in [`pages`] turns
//! it into a typed page, and the client updates its status from the result.

pub mod client;
pub mod error;
pub mod pages;
pub mod session;
pub mod transport;

pub use client::{
    AttackOutcome, Client, Rank, SessionSnapshot, Stance, Status, TrainAmount, TrainingStat,
};
pub use error::{Error, Result};
pub use pages::{
    BattleEntrancePage, BattleHit, BattlePreparePage, BattleRoundPage, BattlegroundPage,
    LoginCaptchaPage, Page, PageKind, ParseError, ParsePage, Sidebar, TrainAmountSelectionPage,
    TrainResultPage,
};
pub use session::{SessionConfig, SessionTransport};
pub use transport::{HttpTransport, Method, RawResponse, Request, Transport};
