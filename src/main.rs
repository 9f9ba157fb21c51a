use clap::Parser;
use titanic_survival::config::cli::{Command, PredictArgs, ServeArgs, StatsArgs, TrainArgs};
use titanic_survival::core::dataset::load_dataset;
use titanic_survival::core::predictor::predict_result;
use titanic_survival::core::statistics::death_statistics;
use titanic_survival::domain::model::ModelCode;
use titanic_survival::utils::error::ErrorSeverity;
use titanic_survival::utils::{logger, validation::Validate};
use titanic_survival::{
    build_router, AppConfig, AppError, AppState, Cli, LocalStorage, ModelStore, Result,
    TrainingEngine, TrainingPipeline,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(&config.logging.format, cli.verbose || config.logging.verbose);
    tracing::info!("Starting titanic-survival");
    tracing::debug!("Configuration: {:?}", config);

    let result = match cli.command {
        Command::Serve(args) => serve(args, config).await,
        Command::Train(args) => train(args, &config).await,
        Command::Predict(args) => predict(args, &config).await,
        Command::Stats(args) => stats(args, &config).await,
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 依錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn serve(args: ServeArgs, mut config: AppConfig) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let addr = config.bind_address();
    let variant = config.server.variant;
    let state = AppState::load(config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Server listening on http://{} ({:?} variant)", addr, variant);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn train(args: TrainArgs, config: &AppConfig) -> Result<()> {
    config.validate()?;

    let codes: Vec<ModelCode> = if args.algorithm.eq_ignore_ascii_case("all") {
        ModelCode::ALL.to_vec()
    } else {
        let code = ModelCode::parse(&args.algorithm).ok_or_else(|| AppError::InvalidConfigValueError {
            field: "algorithm".to_string(),
            value: args.algorithm.clone(),
            reason: "Valid values: dt, svc, lr, all".to_string(),
        })?;
        vec![code]
    };

    for code in codes {
        tracing::info!("Training {} ({})", code.display_name(), code);
        let pipeline = TrainingPipeline::new(
            LocalStorage::new("."),
            config.data.dataset_path.clone(),
            LocalStorage::new(config.model_dir()),
            code,
        );
        let engine = TrainingEngine::new_with_monitoring(pipeline, args.monitor);
        let report = engine.run().await?;

        println!(
            "✅ {} Acc= {:.4} ({} train / {} test) -> {}",
            code.as_str().to_uppercase(),
            report.accuracy,
            report.train_rows,
            report.test_rows,
            config.model_dir().join(&report.model_path).display()
        );
    }

    Ok(())
}

async fn predict(args: PredictArgs, config: &AppConfig) -> Result<()> {
    let fields = args.fields();
    let features = fields.to_features()?;
    let code = fields
        .model
        .as_deref()
        .map(ModelCode::resolve)
        .unwrap_or_else(|| config.default_model());

    let store = ModelStore::new(LocalStorage::new(config.model_dir()));
    let model = store.load(code).await?;
    let result = predict_result(&model, &features);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn stats(args: StatsArgs, config: &AppConfig) -> Result<()> {
    let records = load_dataset(&LocalStorage::new("."), &config.data.dataset_path).await?;
    let statistics = death_statistics(&records, &args.sex);

    println!("{}", serde_json::to_string_pretty(&statistics)?);
    Ok(())
}
