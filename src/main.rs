use campus_compare::utils::error::ErrorSeverity;
use campus_compare::utils::{logger, validation::Validate};
use campus_compare::{
    ApiClient, CancelSource, CliConfig, ComparisonProfile, ComparisonSession, CompareError,
    HistoryStore, LocalStorage, SortMode,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting campus-compare CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let api = ApiClient::new(&config.api_base_url, config.token());

    let outcome = if config.list_saved {
        list_saved(&config, api).await
    } else {
        run_comparison(&config, api).await
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Comparison failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

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

    Ok(())
}

async fn run_comparison(config: &CliConfig, api: ApiClient) -> campus_compare::Result<()> {
    let profile_path = config
        .profile
        .as_deref()
        .ok_or_else(|| CompareError::MissingConfigError {
            field: "profile".to_string(),
        })?;
    let profile = ComparisonProfile::from_file(profile_path)?;
    profile.validate_config()?;

    let mut session = ComparisonSession::from_config(api.clone(), api.clone(), config);
    *session.categories_mut() = profile.category_set();
    for college in profile.college_refs() {
        session.selector_mut().add(college);
    }

    let source = CancelSource::new();
    let cancel = source.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling comparison");
            source.cancel();
        }
    });

    tracing::info!("📡 Submitting comparison for {} colleges", session.colleges().len());
    session.run(&cancel).await?;

    if let Some(result) = session.result() {
        let mut ranked = result.entities.clone();
        ranked.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

        println!("🏆 Results:");
        for (rank, entry) in ranked.iter().enumerate() {
            println!("{:>2}. {:<45} {:>5.1}", rank + 1, entry.college.name, entry.total_score);
        }
        if let Some(summary) = &result.summary {
            println!("📝 {}", summary);
        }
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let filename = session.export_to(&storage, "comparison.csv").await?;
    println!("📁 Export saved to: {}/{}", config.output_path, filename);

    if let Some(name) = &config.save_as {
        let explicit = Some(name.as_str()).filter(|n| !n.trim().is_empty());
        if let Some(result) = session.result() {
            let mut history = HistoryStore::new(api.clone(), api.clone());
            let saved = history
                .save(session.result_categories(), session.colleges(), result, explicit)
                .await?;
            println!("💾 Saved as {:?} ({})", saved.name, saved.id);
        }
    }

    println!("✅ Comparison complete");
    Ok(())
}

async fn list_saved(config: &CliConfig, api: ApiClient) -> campus_compare::Result<()> {
    let mode: SortMode = config.sort.parse()?;
    let mut history = HistoryStore::new(api.clone(), api.clone());
    history.fetch().await?;

    let entries = history.view(&config.search, mode);
    if entries.is_empty() {
        println!("No saved comparisons matched");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {}  {} ({} colleges)",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.name,
            entry.colleges.len()
        );
    }
    Ok(())
}
