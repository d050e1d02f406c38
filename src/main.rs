use clap::Parser;
use mail_verify_etl::config::cli::Command;
use mail_verify_etl::domain::ports::ConfigProvider;
use mail_verify_etl::utils::error::ErrorSeverity;
use mail_verify_etl::utils::{logger, validation::Validate};
use mail_verify_etl::{
    AppConfig, CliConfig, EtlError, HttpSheetsClient, HttpVerificationClient, LocalStorage,
    RunOrchestrator, UploadRef,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting mail-verify-etl");

    let config = match AppConfig::from_file(&cli.config).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    let storage = LocalStorage::new(config.upload_dir().to_string());
    let verifier = HttpVerificationClient::new(
        &config,
        config.verifier.timeout_seconds.map(Duration::from_secs),
    )
    .unwrap_or_else(|e| fail(e));
    let sheets = HttpSheetsClient::new(
        &config,
        config.sheets.timeout_seconds.map(Duration::from_secs),
    )
    .unwrap_or_else(|e| fail(e));
    let orchestrator = RunOrchestrator::new(&storage, &verifier, &sheets, &config);

    match cli.command {
        Command::Run { file } => match orchestrator.run(&UploadRef::new(file)).await {
            Ok(result) => {
                println!(
                    "✅ Results written to sheet '{}'",
                    result.destination_name.as_deref().unwrap_or_default()
                );
                println!("📊 {:?}", result.summary());
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Err(e) => fail(e),
        },
        Command::ReadBack { file } => match orchestrator.read_back(&file).await {
            Ok(result) => {
                println!("📊 {:?}", result.summary());
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Err(e) => fail(e),
        },
        Command::Credits => {
            let balance = orchestrator.credits().await;
            println!("{}", serde_json::to_string_pretty(&balance)?);
        }
    }

    Ok(())
}

fn fail(e: EtlError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("{}", serde_json::to_string(&e.to_body()).unwrap_or_else(|_| e.to_string()));
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
