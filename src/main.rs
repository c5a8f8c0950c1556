use clap::Parser;
use guitar_id::{batch, catalog, cli, config, error, quiz_session, report};
use catalog::Catalog;
use cli::{Cli, Commands};
use config::{Config, OutputFormat};
use error::Result;
use guitar_id_common::{lookup, resolve_neck_block};
use tracing::info;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "guitar_id=debug,guitar_id_common=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let catalog_dir = cli.catalog.clone().or_else(|| config.catalog_dir());
    info!(catalog = ?catalog_dir, "起動");

    match cli.command {
        Commands::Serial { serial, neck_block, json } => {
            let catalog = Catalog::load_optional(catalog_dir.as_deref())?;
            let result = lookup(
                &serial,
                neck_block.as_deref(),
                &catalog.patterns,
                &catalog.approved_guitars,
            )?;

            if json || config.default_output == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("🎸 guitar-id - 製造年判定\n");
                print!("{}", report::format_lookup(&result, report::current_year()));
            }
        }

        Commands::Neck { code, json } => {
            let result = resolve_neck_block(&code);
            if json || config.default_output == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", report::format_neck_block(&result));
            }
        }

        Commands::Quiz { json } => {
            let catalog = Catalog::load_optional(catalog_dir.as_deref())?;
            quiz_session::run_interactive_quiz(&catalog, json)?;
        }

        Commands::Batch { input, output, neck_block } => {
            // 標準出力はJSON専用、進捗表示は標準エラーへ
            eprintln!("📋 guitar-id - 一括判定\n");

            let catalog = Catalog::load_optional(catalog_dir.as_deref())?;
            let serials = batch::read_serials(&input)?;
            eprintln!("✔ {}件のシリアルを検出", serials.serials.len());
            if !serials.skipped_lines.is_empty() {
                eprintln!("⚠ 空行をスキップ: {}行", serials.skipped_lines.len());
            }

            batch::configure_threads(config.batch_threads);
            let entries = batch::run_batch(&serials.serials, neck_block.as_deref(), &catalog, true);
            batch::write_results(&entries, output.as_deref(), &mut std::io::stdout().lock())?;
            if let Some(path) = &output {
                eprintln!("✔ 結果を保存: {}", path.display());
            }
        }

        Commands::Config { set_catalog_dir, show } => {
            let mut config = config;

            if let Some(dir) = set_catalog_dir {
                config.set_catalog_dir(dir)?;
                println!("✔ カタログフォルダを設定しました");
            }

            if show {
                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!(
                    "  カタログフォルダ: {}",
                    config
                        .catalog_dir()
                        .map(|d| d.display().to_string())
                        .unwrap_or_else(|| "未設定".to_string())
                );
                println!("  出力形式: {:?}", config.default_output);
                println!("  一括判定スレッド数: {}", config.batch_threads);
            }
        }
    }

    Ok(())
}
