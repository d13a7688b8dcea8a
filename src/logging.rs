//! ログ初期化
//!
//! tracing + tracing-subscriber。利用者向けの進捗表示は従来通り標準出力に出し、
//! 診断ログはここで設定したsubscriber経由で標準エラーに出す。

use tracing_subscriber::{fmt, EnvFilter};

/// ログを初期化
///
/// # 環境変数
/// - RUST_LOG: ログレベルのフィルタ（省略時: `--verbose` なら debug、それ以外は warn）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // 二重初期化（テスト等）は無視
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// サーバ用: リクエストログを既定で出す
pub fn init_server(verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        "info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}
