use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "guitar-id")]
#[command(about = "ギター製造年・モデル判定ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// カタログフォルダ（設定・環境変数より優先）
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// シリアル番号から製造年を判定
    Serial {
        /// シリアル番号
        #[arg(required = true)]
        serial: String,

        /// ネックブロック刻印（元号コード）
        #[arg(short, long)]
        neck_block: Option<String>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// ネックブロック刻印のみ解読
    Neck {
        /// 刻印コード
        #[arg(required = true)]
        code: String,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 特徴クイズでモデルを絞り込む
    Quiz {
        /// 最終結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// シリアル一覧（1行1件）を一括判定
    Batch {
        /// 入力テキストファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 全件共通のネックブロック刻印
        #[arg(short, long)]
        neck_block: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// カタログフォルダを設定
        #[arg(long)]
        set_catalog_dir: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
