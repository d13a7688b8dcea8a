//! car-assess
//!
//! 車両写真の損傷判定ツール。判定ロジック本体は `car_assess_common`、
//! このクレートは解析バックエンド・アセットカタログ・CLI/HTTPの入口を持つ。

pub mod analyzer;
pub mod assets;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod server;
