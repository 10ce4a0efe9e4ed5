use clap::Parser;
use food_ai_rust::{classifier, cli, config, display, error, interactive, logging, session};
use classifier::{AiCliLoader, CachedLoader, ModelLoader, PredictionCache};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use food_ai_common::SelectionState;
use indicatif::ProgressBar;
use session::{ClassificationSession, ClassifyOutcome};
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

struct ClassifyOptions {
    portion: Option<String>,
    json: bool,
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load()?;
    if let Some(provider) = cli.ai_provider {
        config.ai_provider = provider;
    }

    match cli.command {
        Commands::Classify { image, portion, use_cache, json, no_interactive } => {
            let catalog = config.load_catalog()?;
            let loader = AiCliLoader::from_config(&config);
            let options = ClassifyOptions {
                portion,
                json,
                interactive: !json && !no_interactive && std::io::stdin().is_terminal(),
            };

            if use_cache {
                let loader = CachedLoader::new(loader, Config::cache_dir()?);
                let session = ClassificationSession::new(loader, catalog);
                run_classify(&session, &image, &options).await
            } else {
                let session = ClassificationSession::new(loader, catalog);
                run_classify(&session, &image, &options).await
            }
        }

        Commands::Foods => {
            let catalog = config.load_catalog()?;
            println!("📋 食物列表（{}种）\n", catalog.len());
            println!("{}", display::render_catalog(&catalog));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Show { id, grams } => {
            let catalog = config.load_catalog()?;
            let Some(food) = catalog.find_by_id(&id) else {
                println!("⚠ 未找到食物: {}（请用 `food-ai foods` 查看）", id);
                return Ok(ExitCode::FAILURE);
            };

            let mut selection = SelectionState::new();
            selection.select(food.clone());
            if let Some(grams) = grams {
                if let Err(e) = selection.set_portion(&grams) {
                    println!("⚠ {}", e);
                }
            }

            if let (Some(current), Some(nutrition)) = (selection.current(), selection.nutrition()) {
                println!("{}  {}", current.food.display_name(), display::render_portion(current));
                println!("{}", display::render_nutrition(&nutrition));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Config { set_catalog, set_provider, show } => {
            if let Some(path) = set_catalog {
                config.set_catalog_path(path)?;
                println!("✔ 食品カタログを設定しました");
            }

            if let Some(provider) = set_provider {
                config.ai_provider = provider;
                config.save()?;
                println!("✔ AIプロバイダを設定しました: {}", provider);
            }

            if show {
                println!("設定:");
                println!("  AIプロバイダ: {}", config.ai_provider);
                println!("  モデル: {}", config.model.as_deref().unwrap_or("(CLI既定)"));
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  候補数: {}", config.top_k);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                match &config.catalog_path {
                    Some(path) => println!("  食品カタログ: {}", path.display()),
                    None => println!("  食品カタログ: 組み込み"),
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Cache { clear, info } => {
            let cache_dir = Config::cache_dir()?;
            let cache_path = PredictionCache::cache_path(&cache_dir);

            if info || !clear {
                if cache_path.exists() {
                    let cache = PredictionCache::load(&cache_dir);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match PredictionCache::clear(&cache_dir) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_classify<L: ModelLoader>(
    session: &ClassificationSession<L>,
    image: &Path,
    options: &ClassifyOptions,
) -> Result<ExitCode> {
    let spinner = (!options.json).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("正在识别 {} ...", image.display()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    });

    let outcome = session.classify_file(image).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let failed = matches!(outcome, ClassifyOutcome::Failed(_));

    if !options.interactive || failed {
        if let Some(portion) = &options.portion {
            apply_requested_portion(session, portion);
        }
        if options.json {
            println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        } else {
            println!("{}", display::render_snapshot(&session.snapshot()));
        }
        return Ok(exit_code(failed));
    }

    println!("{}", display::render_snapshot(&session.snapshot()));

    // 照合結果があっても手動で置き換えられる
    if interactive::choose_food(session)? && options.portion.is_none() {
        println!("{}", display::render_snapshot(&session.snapshot()));
    }

    // 分量指定は食品が決まってから適用する
    match &options.portion {
        Some(portion) => {
            apply_requested_portion(session, portion);
            println!("{}", display::render_snapshot(&session.snapshot()));
        }
        None => interactive::edit_portion(session)?,
    }

    Ok(exit_code(failed))
}

/// `--portion` の適用。食品未選択・不正値は警告のみ
fn apply_requested_portion<L: ModelLoader>(session: &ClassificationSession<L>, portion: &str) {
    match session.set_portion(portion) {
        Ok(Some(_)) => {}
        Ok(None) => eprintln!("⚠ 未选择食物，份量 {} 未应用", portion.trim()),
        Err(e) => eprintln!("⚠ {}", e),
    }
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
