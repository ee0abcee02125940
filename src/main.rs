use anyhow::Context;
use clap::Parser;
use device_checklist::{cli, config, export, inspect, intake};
use device_checklist_common::{compose, infer, DocumentMeta, InspectionRecord};
use cli::{Cli, Commands};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "device_checklist=debug,device_checklist_common=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().context("falha ao carregar configuração")?;

    match cli.command {
        Commands::New { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "{} já existe (use --force para sobrescrever)",
                    output.display()
                );
            }
            intake::save_record(&InspectionRecord::new(), &output)?;
            println!("✔ Novo checklist: {}", output.display());
        }

        Commands::Inspect { record } => {
            inspect::run_interactive_inspection(&record)?;
        }

        Commands::Photo { record, slot, path } => {
            let mut loaded = intake::load_record(&record)?;
            match path {
                Some(path) => {
                    intake::attach_photo(&mut loaded, slot, &path)?;
                    println!("✔ Foto {} anexada: {}", slot, path.display());
                }
                None => {
                    let index = slot
                        .checked_sub(1)
                        .ok_or(device_checklist_common::Error::PhotoSlot(slot))?;
                    loaded.set_photo(index, None)?;
                    println!("✔ Foto {} removida", slot);
                }
            }
            intake::save_record(&loaded, &record)?;
        }

        Commands::Diagnose { input } => {
            let record = intake::load_record(&input)?;
            println!("🔍 Análise de Defeitos ({})\n", input.display());
            for diagnosis in infer(&record) {
                println!("• {}", diagnosis);
            }
        }

        Commands::Text { input, output } => {
            let record = intake::load_record(&input)?;
            let document = compose(&record, &infer(&record), &DocumentMeta::now(config.brand.clone()));
            let text = document.to_plain_text();
            match output {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    println!("✔ Texto salvo: {}", path.display());
                }
                None => println!("{}", text),
            }
        }

        Commands::Generate { input, output, pdf_quality, brand } => {
            println!("📄 device-checklist - Gerar PDF\n");

            let mut config = config;
            if let Some(brand) = brand {
                config.brand = brand;
                config.validate()?;
            }
            let quality = pdf_quality.unwrap_or(config.pdf_quality);

            // 生成中に元ファイルが編集されても影響しないようスナップショットを渡す
            let record = intake::load_record(&input)?;
            if let Err(e) = record.validate() {
                println!("✗ {}", e);
                anyhow::bail!("geração desabilitada: preencha os campos obrigatórios");
            }

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message("Gerando PDF...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let generator = export::ChecklistGenerator::from_config(&config, quality);
            let result = generator.generate(record.snapshot()).await;
            spinner.finish_and_clear();

            let generated = result.context("Erro ao gerar PDF. Tente novamente.")?;
            let output_dir = output
                .or_else(|| config.output_dir.clone())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            let path = export::write_checklist(&generated, &output_dir)?;

            println!("Análise de Defeitos:");
            for diagnosis in &generated.diagnoses {
                println!("  • {}", diagnosis);
            }
            println!(
                "\n✔ PDF gerado com sucesso! {} ({} página(s), qualidade: {})",
                path.display(),
                generated.page_count,
                quality
            );
        }

        Commands::Config { set_brand, show } => {
            let mut config = config;

            if let Some(brand) = set_brand {
                config.set_brand(brand)?;
                println!("✔ Loja configurada");
            }

            if show {
                println!("Configuração:");
                println!("  Loja: {}", config.brand);
                println!("  Largura de renderização: {}px x{}", config.render_width_px, config.render_scale);
                println!("  Margem: {}mm", config.margin_mm);
                println!("  Qualidade PDF: {}", config.pdf_quality);
                println!(
                    "  Pasta de saída: {}",
                    config
                        .output_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| ".".into())
                );
            }
        }
    }

    Ok(())
}
