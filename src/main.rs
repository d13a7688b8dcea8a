use car_assess::{analyzer, assets, cli, config, error, logging, scanner, server};
use car_assess_common::{
    assemble_payload, fetch_asset, fetch_asset_or_default, parse_detector_output, parse_payload,
    resolve_key_from_parts, AssessmentResult, AssetCatalog, CompositeKey,
};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if matches!(cli.command, Commands::Serve { .. }) {
        logging::init_server(cli.verbose);
    } else {
        logging::init(cli.verbose);
    }

    let config = Config::load()?;
    let backend = cli.backend.unwrap_or(config.backend);

    match cli.command {
        Commands::Assess { image, output, include_detected_parts } => {
            println!("🚗 car-assess - 損傷判定\n");

            scanner::validate_image(&image)?;

            let mut config = config;
            config.include_detected_parts |= include_detected_parts;

            println!("[1/2] 解析中... ({})", backend);
            let payload = analyzer::analyze_image(&image, backend, &config).await?;
            println!("✔ 解析完了\n");

            println!("[2/2] 判定結果を作成中...");
            let result = assemble_payload(&payload);
            print_result(&result);

            if let Some(output) = output {
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&output, json)?;
                println!("\n✔ 結果を保存: {}", output.display());
            }
        }

        Commands::Run { folder, output, use_cache } => {
            println!("🚗 car-assess - 一括判定\n");

            println!("[1/3] 写真をスキャン中...");
            let images = scanner::scan_folder(&folder)?;
            println!("✔ {}枚の写真を検出\n", images.len());

            if images.is_empty() {
                return Err(error::AssessError::NoImagesFound(folder.display().to_string()).into());
            }

            println!("[2/3] 解析中... ({}){}", backend, if use_cache { " (キャッシュ有効)" } else { "" });
            let records = if use_cache {
                analyzer::assess_images_with_cache(&images, &folder, backend, &config).await?
            } else {
                analyzer::assess_images(&images, backend, &config).await?
            };
            let damaged = records.iter().filter(|r| r.result.defect_count() > 0).count();
            println!("✔ 解析完了（損傷あり: {}/{}台）\n", damaged, records.len());

            println!("[3/3] 結果を保存中...");
            let output = output.unwrap_or_else(|| folder.join("assessment.json"));
            let json = serde_json::to_string_pretty(&records)?;
            std::fs::write(&output, json)?;
            println!("✔ 結果を保存: {}", output.display());

            println!("\n✅ 完了");
        }

        Commands::Report { payload, detector_output, include_detected_parts } => {
            let payload = match (payload, detector_output) {
                (Some(path), _) => {
                    let content = read_input(&path)?;
                    parse_payload(&content)?
                }
                (None, Some(path)) => {
                    let content = read_input(&path)?;
                    parse_detector_output(&content)
                        .categorize(include_detected_parts || config.include_detected_parts)
                }
                (None, None) => {
                    return Err(error::AssessError::FileNotFound("入力ファイル".into()).into());
                }
            };

            let result = assemble_payload(&payload);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Key { parts, regions } => {
            let key = if regions.is_empty() {
                // "hood (dent)" のような損傷文字列も受け付ける
                let tokens: Vec<String> = parts
                    .iter()
                    .map(|p| car_assess_common::parse_defect(p).part)
                    .collect();
                resolve_key_from_parts(&tokens)
            } else {
                CompositeKey::from_region_numbers(&regions)
            };
            println!("{}", key);
        }

        Commands::Asset { key, output, asset_dir, no_fallback, list } => {
            let catalog = assets::FsCatalog::new(asset_dir.unwrap_or_else(|| config.asset_dir.clone()));

            if list {
                for key in catalog.keys()? {
                    println!("{}", key);
                }
                return Ok(());
            }

            let Some(key) = key else {
                return Ok(());
            };
            let key = CompositeKey::parse(&key)?;
            let asset = if no_fallback {
                fetch_asset(&catalog, &key)?
            } else {
                fetch_asset_or_default(&catalog, &key)?
            };

            if asset.key != key {
                println!("⚠ {} が見つからないため {} を使用", key.asset_file_name(), asset.key.asset_file_name());
            }

            let output = output.unwrap_or_else(|| PathBuf::from(asset.key.asset_file_name()));
            std::fs::write(&output, &asset.bytes)?;
            println!("✔ {} ({} bytes, {}) → {}", asset.key, asset.bytes.len(), asset.content_type, output.display());
        }

        Commands::Serve { addr, asset_dir } => {
            let addr = addr.unwrap_or_else(|| config.listen_addr.clone());
            let catalog = assets::FsCatalog::new(asset_dir.unwrap_or_else(|| config.asset_dir.clone()));

            if !catalog.path_for(&CompositeKey::sentinel()).exists() {
                tracing::warn!(dir = %catalog.root().display(), "default asset 0.glb is missing");
            }

            let state = server::AppState {
                config: Arc::new(config),
                catalog: Arc::new(catalog),
                backend,
            };
            server::run_server(state, &addr).await?;
        }

        Commands::Config { set_analyzer_url, set_asset_dir, show } => {
            let mut config = config;

            if let Some(url) = set_analyzer_url {
                config.set_analyzer_url(url)?;
                println!("✔ 解析サービスのURLを設定しました");
            }

            if let Some(dir) = set_asset_dir {
                config.set_asset_dir(dir)?;
                println!("✔ アセットディレクトリを設定しました");
            }

            if show {
                println!("設定:");
                println!("  バックエンド: {}", config.backend);
                println!("  解析サービス: {}", config.analyzer_url.as_deref().unwrap_or("未設定"));
                println!("  検出コマンド: {} {}", config.detector_command, config.detector_args.join(" "));
                println!("  アセット: {}", config.asset_dir.display());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  検出部位を含める: {}", config.include_detected_parts);
                println!("  待ち受け: {}", config.listen_addr);
                println!("  CORS許可オリジン: {}", config.cors_allowed_origins.join(", "));
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = analyzer::CacheFile::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = analyzer::CacheFile::load(&target);
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
                match analyzer::CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn read_input(path: &std::path::Path) -> Result<String> {
    if !path.exists() {
        return Err(error::AssessError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

fn print_result(result: &AssessmentResult) {
    println!("状態: {} ({})", result.status, result.status.summary());
    println!("{}", result.description);

    let sections = [
        ("バンパー", &result.categorized_defects.bumpers),
        ("ドア", &result.categorized_defects.doors),
        ("車体", &result.categorized_defects.body),
    ];
    for (title, defects) in sections {
        if defects.is_empty() {
            continue;
        }
        println!("  {}:", title);
        for defect in defects {
            println!("    - {}", defect.display_label);
        }
    }

    println!("3Dモデル: {}", result.composite_key.asset_file_name());
}
