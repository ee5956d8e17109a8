//! Command handlers for WorldPop Fetcher CLI
//!
//! This module implements the command handlers that coordinate between
//! CLI arguments and the core application functionality. Listings go to
//! stdout so they can be piped; prompts, warnings and progress go to stderr.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::app::context::{AppContext, DownloadOptions, UpdateOutcome};
use crate::app::countries::{self, CountryInfo};
use crate::app::resolver::{self, CountrySelection, ResolveWarning};
use crate::cli::args::{
    CatalogAction, CatalogArgs, ConfigAction, ConfigArgs, DownloadArgs, GlobalArgs, IsosArgs,
    OutputFormat,
};
use crate::cli::progress::{format_bytes, spinner, ProgressConfig, ProgressDisplay};
use crate::cli::startup::{confirm_update, ensure_catalog_fresh, StartupStatus};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Load configuration and apply the global command line overrides
pub fn load_config(global: &GlobalArgs) -> Result<AppConfig> {
    let mut config = AppConfig::load(global.config.as_deref())?;

    if let Some(catalog) = &global.catalog {
        debug!("--catalog overrides catalog path");
        config.catalog.path = Some(catalog.clone());
    }
    if let Some(url) = &global.remote_url {
        debug!("--remote-url overrides remote_url");
        config.transport.remote_url = url.clone();
    }

    config.validate()?;
    Ok(config)
}

fn progress_config(global: &GlobalArgs, config: &AppConfig) -> ProgressConfig {
    ProgressConfig {
        enable_progress_bars: config.download.show_progress,
        quiet: global.quiet,
    }
}

fn print_warnings(warnings: &[ResolveWarning]) {
    for warning in warnings {
        eprintln!("⚠️  Warning: {}", warning);
    }
}

/// Handle the isos command
pub fn handle_isos(args: IsosArgs) -> Result<()> {
    println!("{}", render_countries(countries::all(), args.format)?);
    Ok(())
}

/// Render the country table as `numeric,alpha3,name` lines or as JSON
pub fn render_countries(table: &[CountryInfo], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Screen => Ok(table
            .iter()
            .map(|c| format!("{},{},{}", c.numeric, c.alpha3, c.name))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => {
            let keyed: BTreeMap<&str, &CountryInfo> =
                table.iter().map(|c| (c.alpha3, c)).collect();
            serde_json::to_string_pretty(&keyed)
                .map_err(|e| AppError::generic(format!("Failed to render countries: {}", e)))
        }
    }
}

/// Render a country's datasets as `id<TAB>description` lines in catalog order
pub fn render_datasets(selection: &CountrySelection<'_>) -> String {
    selection
        .catalog
        .records()
        .map(|record| record.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Handle the download command
///
/// Runs the catalog freshness check, then either lists the country's
/// datasets (`--datasets`) or resolves the requested ids and downloads them
/// one at a time.
pub fn handle_download(global: &GlobalArgs, args: DownloadArgs) -> Result<()> {
    let config = load_config(global)?;
    let progress = progress_config(global, &config);
    let mut ctx = AppContext::from_config(&config);

    // Reject bad ids before touching the network
    let ids = if args.datasets {
        Default::default()
    } else {
        resolver::parse_ids(&args.ids)?
    };

    if global.no_update_check {
        info!("Catalog update check skipped");
    } else {
        let status = ensure_catalog_fresh(&mut ctx, &progress, io::stdin().lock(), io::stderr())?;
        info!("{}", status.summary());
        if !global.quiet && !matches!(status, StartupStatus::Fresh) {
            eprintln!("{}", status.summary());
        }
    }

    if args.datasets {
        let selection = ctx.iter_datasets_for_country(&args.iso, args.filter())?;
        print_warnings(&selection.warnings);
        let listing = render_datasets(&selection);
        if !listing.is_empty() {
            println!("{}", listing);
        }
        return Ok(());
    }

    let plan = ctx.resolve_targets(&args.iso, ids, args.filter())?;
    print_warnings(&plan.warnings);

    let output_dir = match args.output_folder.clone().or(config.download.output_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let options = DownloadOptions {
        policy: args.failure_policy().unwrap_or(config.download.on_failure),
        show_progress: progress.bars_visible(),
    };
    info!(
        "Downloading {} datasets for {} into {} (on failure: {})",
        plan.targets.len(),
        plan.alpha3,
        output_dir.display(),
        options.policy
    );

    let display = ProgressDisplay::new(progress);
    let report = ctx.download_plan(&plan, &output_dir, options, |event| display.update(event))?;
    display.finish(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(AppError::generic(format!(
            "{} of {} downloads failed",
            report.failed.len(),
            report.total()
        )))
    }
}

/// Handle catalog management commands
pub fn handle_catalog(global: &GlobalArgs, args: CatalogArgs) -> Result<()> {
    let config = load_config(global)?;
    let progress = progress_config(global, &config);
    let mut ctx = AppContext::from_config(&config);

    match args.action {
        CatalogAction::Check => {
            let check = spinner("Checking remote manifest...", &progress);
            let report = ctx.check_for_update();
            check.finish_and_clear();
            let report = report?;

            println!("Local:  {}", report.local);
            println!("Remote: {}", report.remote);
            if report.is_stale() {
                println!("📋 An updated catalog is available. Run 'catalog update' to fetch it");
            } else {
                println!("✅ Catalog is up to date");
            }
            Ok(())
        }
        CatalogAction::Update { yes, force } => {
            let outcome = if force {
                ctx.force_update(progress.bars_visible())?
            } else {
                ctx.perform_update(progress.bars_visible(), |report| {
                    yes || report.local.is_absent()
                        || confirm_update(io::stdin().lock(), io::stderr(), report)
                            .unwrap_or(false)
                })?
            };

            match outcome {
                UpdateOutcome::Updated {
                    previous,
                    current,
                    records,
                } => {
                    println!("✅ Catalog updated: {} -> {}", previous, current);
                    println!("   {} datasets", records);
                }
                UpdateOutcome::Declined => println!("Catalog left unchanged"),
                UpdateOutcome::UpToDate => println!("✅ Catalog is up to date"),
            }
            Ok(())
        }
        CatalogAction::Info => {
            let info = ctx.store().info()?;
            println!("📁 Catalog: {}", info.path.display());
            println!("   Compression: {}", info.compression);
            if !info.exists {
                println!("   Not downloaded yet. Run 'catalog update' to fetch it");
                return Ok(());
            }
            if let Some(size) = info.size_bytes {
                println!("   Size: {}", format_bytes(size));
            }
            if let Some(modified) = info.modified {
                println!("   Modified: {}", modified.format("%Y-%m-%d %H:%M:%S"));
            }
            println!("   Fingerprint: {}", info.fingerprint);

            let snapshot = ctx.catalog()?;
            println!("   Datasets: {}", snapshot.len());
            println!("   Countries: {}", snapshot.countries().len());
            Ok(())
        }
    }
}

/// Handle configuration commands
pub fn handle_config(global: &GlobalArgs, args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Init { path } => {
            let target: Option<PathBuf> = path.or_else(|| global.config.clone());
            let (path, created) = AppConfig::initialize(target.as_deref())?;
            if created {
                println!("✅ Created configuration file: {}", path.display());
            } else {
                println!("Configuration file already exists: {}", path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(global)?;
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", config.to_toml()?)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::catalog::CatalogSnapshot;

    const CSV: &str = "ID,ISO,ISO3,CountryName,DataSetName,Description,PathToRaster\n\
                       14,404,KEN,Kenya,ppp_2020,Population 2020,GIS/KEN/ken_ppp_2020.tif\n\
                       2,404,KEN,Kenya,ppp_2000,Population 2000,GIS/KEN/ken_ppp_2000.tif\n\
                       7,404,KEN,Kenya,srtm,Elevation,GIS/KEN/ken_srtm.tif\n";

    #[test]
    fn test_render_countries_screen() {
        let rendered = render_countries(countries::all(), OutputFormat::Screen).unwrap();
        assert!(rendered.lines().any(|line| line == "404,KEN,Kenya"));
        assert_eq!(rendered.lines().count(), countries::all().len());
    }

    /// Test JSON country listing
    /// Purpose: Verify the JSON output is keyed by alpha-3 code
    /// Benefit: Scripts can index the listing directly by catalog key
    #[test]
    fn test_render_countries_json() {
        let rendered = render_countries(countries::all(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["KEN"]["name"], "Kenya");
        assert_eq!(value["KEN"]["numeric"], "404");
    }

    #[test]
    fn test_render_datasets_keeps_catalog_order() {
        let snapshot = CatalogSnapshot::parse(CSV.as_bytes()).unwrap();

        let all = resolver::select_country(&snapshot, "ken", None).unwrap();
        assert_eq!(
            render_datasets(&all),
            "14\tPopulation 2020\n2\tPopulation 2000\n7\tElevation"
        );

        let filtered = resolver::select_country(&snapshot, "KEN", Some("population")).unwrap();
        assert_eq!(
            render_datasets(&filtered),
            "14\tPopulation 2020\n2\tPopulation 2000"
        );
    }

    #[test]
    fn test_load_config_rejects_bad_remote_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, AppConfig::generate_default_config_content()).unwrap();

        let global = GlobalArgs {
            config: Some(config_path),
            remote_url: Some("gopher://example.org".to_string()),
            ..Default::default()
        };
        assert!(load_config(&global).is_err());
    }

    #[test]
    fn test_load_config_applies_catalog_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, AppConfig::generate_default_config_content()).unwrap();

        let global = GlobalArgs {
            config: Some(config_path),
            catalog: Some(dir.path().join("catalog.csv.gz")),
            ..Default::default()
        };
        let config = load_config(&global).unwrap();
        assert_eq!(
            config.catalog.resolved_path(),
            dir.path().join("catalog.csv.gz")
        );
    }
}
