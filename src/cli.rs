use clap::{Parser, Subcommand};
use crate::analyzer::AnalyzerBackend;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "car-assess")]
#[command(about = "車両写真の損傷判定・3Dモデルキー解決ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 解析バックエンド (detector/http)、省略時は設定値
    #[arg(long, global = true)]
    pub backend: Option<AnalyzerBackend>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 1枚の写真を解析して判定結果を表示
    Assess {
        /// 写真ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 判定結果JSONの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 損傷のない検出部位も結果に含める
        #[arg(long)]
        include_detected_parts: bool,
    },

    /// 写真フォルダを一括解析してJSONを出力
    Run {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力JSONファイル（デフォルト: 入力フォルダ/assessment.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// キャッシュを使用（再解析をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 保存済みの解析結果から判定結果を組み立てる
    Report {
        /// 上流ペイロードのJSONファイル
        #[arg(required_unless_present = "detector_output", conflicts_with = "detector_output")]
        payload: Option<PathBuf>,

        /// 検出スクリプトの出力テキスト
        #[arg(long)]
        detector_output: Option<PathBuf>,

        /// 損傷のない検出部位も結果に含める（--detector-output 時）
        #[arg(long)]
        include_detected_parts: bool,
    },

    /// 部位名または領域番号から合成キーを表示
    Key {
        /// 部位名または損傷文字列（例: front_bumper, "hood (dent)"）
        parts: Vec<String>,

        /// 領域番号（例: 3,1）
        #[arg(long, value_delimiter = ',', conflicts_with = "parts")]
        regions: Vec<u8>,
    },

    /// 合成キーの3Dモデルを取り出す
    Asset {
        /// 合成キー（例: 36）
        #[arg(required_unless_present = "list")]
        key: Option<String>,

        /// 出力ファイル（デフォルト: カレント/<key>.glb）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// アセットディレクトリ（省略時は設定値）
        #[arg(long)]
        asset_dir: Option<PathBuf>,

        /// 番兵モデルへのフォールバックを無効化
        #[arg(long)]
        no_fallback: bool,

        /// カタログのキー一覧を表示
        #[arg(long)]
        list: bool,
    },

    /// HTTPサービスを起動
    Serve {
        /// 待ち受けアドレス（省略時は設定値）
        #[arg(long)]
        addr: Option<String>,

        /// アセットディレクトリ（省略時は設定値）
        #[arg(long)]
        asset_dir: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 解析サービスのURLを設定
        #[arg(long)]
        set_analyzer_url: Option<String>,

        /// アセットディレクトリを設定
        #[arg(long)]
        set_asset_dir: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}
