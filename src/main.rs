use clap::Parser;
use module_tour::core::checks::{check_catalog, has_errors};
use module_tour::domain::ports::CatalogSource;
use module_tour::utils::logger;
use module_tour::{CatalogPath, CliConfig, Tour, TourError};

fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting module-tour");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config) {
        tracing::error!("❌ {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

fn run(config: &CliConfig) -> Result<(), TourError> {
    let source: Box<dyn CatalogSource> = match &config.catalog {
        Some(path) => Box::new(CatalogPath::new(path.clone())),
        None => Box::new(config.example),
    };

    tracing::info!("📁 Loading {}", source.describe());
    let catalog = source.load_catalog()?;
    tracing::info!(
        "✅ Loaded '{}' with {} modules",
        catalog.name,
        catalog.modules.len()
    );

    if config.check {
        let diagnostics = check_catalog(&catalog);
        for diagnostic in &diagnostics {
            println!("{}", diagnostic);
        }
        if has_errors(&diagnostics) {
            return Err(TourError::CatalogInvalid { diagnostics });
        }
        println!("✅ Catalog passes every module rule");
        return Ok(());
    }

    let tour = Tour::new(catalog).with_module_filter(config.modules.clone());

    if config.json {
        println!("{}", serde_json::to_string_pretty(&tour.summary())?);
    } else {
        tour.print();
    }

    // The tour is printed even for a broken catalog; the exit code still reports it.
    tour.ensure_clean()
}
