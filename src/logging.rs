//! ログ初期化
//!
//! `RUST_LOG` があればそれを使い、なければ `--verbose` で debug、通常は warn。
//! 画面出力（結果表示）と混ざらないよう stderr に出す。

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("food_ai_rust={0},food_ai_common={0}", default_level)));

    // 二重初期化（テストなど）は無視
    let _ = fmt()
        .compact()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
