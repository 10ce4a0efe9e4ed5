//! 食品写真AI認識・栄養成分表示
//!
//! 照合・分量換算の本体は `food_ai_common`、
//! このクレートは分類器連携・セッション管理・CLIを担う。

pub mod ai_provider;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod image_source;
pub mod interactive;
pub mod logging;
pub mod session;
