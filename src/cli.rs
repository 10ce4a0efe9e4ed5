use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "food-ai")]
#[command(about = "食品写真AI認識・栄養成分表示ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AIプロバイダ (claude/codex/gemini)。省略時は設定ファイルの値
    #[arg(long, global = true)]
    pub ai_provider: Option<AiProvider>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 食品写真を認識して栄養成分を表示
    Classify {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 分量（グラム）。省略時は推奨分量
        #[arg(short, long)]
        portion: Option<String>,

        /// キャッシュを使用（同じ画像の再分類をスキップ）
        #[arg(long)]
        use_cache: bool,

        /// 結果をJSONで出力（対話なし）
        #[arg(long)]
        json: bool,

        /// 手動選択・分量入力の対話をしない
        #[arg(long)]
        no_interactive: bool,
    },

    /// 食品カタログを一覧表示
    Foods,

    /// 指定した食品の栄養成分を表示
    Show {
        /// 食品ID（`food-ai foods` で確認）
        #[arg(required = true)]
        id: String,

        /// 分量（グラム）。省略時は推奨分量
        #[arg(short, long)]
        grams: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 食品カタログJSONを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 既定のAIプロバイダを設定
        #[arg(long)]
        set_provider: Option<AiProvider>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 推論キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}
