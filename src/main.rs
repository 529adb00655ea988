use clap::Parser;
use dld_etl::utils::error::ErrorSeverity;
use dld_etl::utils::{logger, validation::Validate};
use dld_etl::{
    AzureBlobStore, CliConfig, DldPipeline, EtlEngine, EtlError, LocalStorage, RunStatus, Secrets,
    SmtpNotifier,
};

fn exit_with(e: &EtlError, code: i32) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    // 設定與環境變數在任何網路請求之前驗證
    let settings = match cli.load_settings().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => exit_with(&e, 1),
    };
    let secrets = match Secrets::from_env().and_then(|s| s.validate().map(|_| s)) {
        Ok(secrets) => secrets,
        Err(e) => exit_with(&e, 1),
    };
    tracing::debug!("Secrets: {:?}", secrets);

    let blob_store = match AzureBlobStore::new(&secrets, &settings.storage) {
        Ok(store) => store,
        Err(e) => exit_with(&e, 1),
    };
    let notifier = match SmtpNotifier::new(&settings.notify, &secrets.email_password) {
        Ok(notifier) => notifier,
        Err(e) => exit_with(&e, 1),
    };

    let storage = LocalStorage::new(settings.snapshot.directory.clone());
    let pipeline = DldPipeline::new(
        storage,
        blob_store,
        settings.source.clone(),
        settings.snapshot.clone(),
    )?;
    let engine = EtlEngine::new(pipeline, notifier).with_dry_run(cli.dry_run);

    let report = match engine.run().await {
        Ok(report) => report,
        // 通知本身失敗: 無人會收到錯誤信, 以非零碼結束
        Err(e) => {
            let code = match e.severity() {
                ErrorSeverity::Critical => 3,
                _ => 2,
            };
            exit_with(&e, code)
        }
    };

    match report.status {
        RunStatus::Published => tracing::info!(
            "✅ Published {} records in {:.1?}",
            report.records,
            report.elapsed
        ),
        RunStatus::DryRun => tracing::info!(
            "✅ Dry run fetched {} records in {:.1?}",
            report.records,
            report.elapsed
        ),
        RunStatus::NothingToPublish => tracing::info!("✅ Run finished, nothing to publish"),
        RunStatus::FetchFailed | RunStatus::PublishFailed => tracing::warn!(
            "⚠️ Run finished with {:?}; operator notified: {}",
            report.status,
            report.notified
        ),
    }

    if report.is_failure() && cli.fail_on_error {
        std::process::exit(2);
    }

    Ok(())
}
