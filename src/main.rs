use clap::Parser;
use recon_client::core::Storage;
use recon_client::utils::error::ErrorSeverity;
use recon_client::utils::{logger, validation::Validate};
use recon_client::{
    CliConfig, ClientSettings, Completion, FileSlot, HttpTransport, LedgerFile, LocalStorage,
    ReconCategory, ReconError, ReconWorkflow, RequestMode,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if config.list_categories {
        for category in ReconCategory::ALL {
            println!("{:<14} {}", category.as_tag(), category.label());
        }
        return Ok(());
    }

    tracing::info!("Starting recon-client");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match config.validate().and_then(|_| config.settings()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            fail(&e);
        }
    };
    tracing::debug!("Effective settings: {:?}", settings);

    if let Err(e) = run(&config, &settings).await {
        tracing::error!(
            "❌ Reconciliation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        fail(&e);
    }

    Ok(())
}

async fn run(config: &CliConfig, settings: &ClientSettings) -> recon_client::Result<()> {
    let transport = HttpTransport::new(settings)?;
    let output = LocalStorage::new(settings.output_path.clone());
    let ledgers = LocalStorage::new(".".to_string());
    let mut workflow = ReconWorkflow::new(transport, output.clone());

    for (slot, path) in [
        (FileSlot::Primary, &config.primary),
        (FileSlot::Secondary, &config.secondary),
    ] {
        if let Some(path) = path {
            let bytes = ledgers.read_file(path).await?;
            let name = Path::new(path)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(path.as_str());
            workflow.select_file(slot, LedgerFile::new(name, bytes));
        }
    }

    if let Some(category) = config.category {
        workflow.select_category(category);
    }

    let mode = if config.download {
        RequestMode::Download
    } else {
        RequestMode::Preview
    };

    match workflow.submit(mode).await? {
        Completion::Previewed => {
            if let Some(summary) = workflow.summary() {
                println!("Analysis Summary");
                println!("  Total Matched:      {}", summary.matched);
                println!("  Missing in Bank:    {}", summary.missing_in_bank);
                println!("  Missing in Switch:  {}", summary.missing_in_provider);
                println!("  Total Transactions: {}", summary.total);
            }

            match workflow.diff_table() {
                Some(table) => {
                    println!();
                    println!(
                        "Data Preview (Mismatches): {} columns displayed",
                        table.column_count()
                    );
                    print!("{}", table);

                    if let Some(path) = &config.export_csv {
                        output.write_file(path, &table.to_csv_bytes()?).await?;
                        println!("📁 Mismatches exported to: {}", output.resolve(path).display());
                    }
                }
                None => tracing::info!("No mismatches to display"),
            }
        }
        Completion::Downloaded(report) => {
            tracing::info!("✅ Report downloaded ({} bytes)", report.size_bytes);
            println!(
                "📁 Report saved to: {}",
                output.resolve(&report.filename).display()
            );
        }
    }

    Ok(())
}

fn fail(e: &ReconError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
