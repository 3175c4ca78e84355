// Copyright 2026 Ninbot Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ninbot: configuration, captcha prompt and the train/battle loops on
//! top of `ninbot-core`.

pub mod challenge;
pub mod config;
pub mod driver;
pub mod logging;

pub use challenge::{ChallengeSolver, PromptSolver};
pub use config::{resolve_config_path, Config, ConfigError};
pub use driver::{Driver, Mode};
