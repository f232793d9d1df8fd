use anyhow::{Result, bail};
use log::debug;

use crate::{
    lock::builtin_lock_group_specs, pipeline, report::ResolutionReport, runtime::Runtime,
};

pub mod config;

use config::Config;
pub use config::SyncOptions;

/// How a report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Resolve the requested packages into the destination directory and print
/// the report. With `strict`, missing packages make the command fail.
#[tracing::instrument(skip(runtime, options))]
pub async fn sync<R: Runtime>(
    runtime: R,
    options: SyncOptions,
    format: OutputFormat,
    strict: bool,
) -> Result<ResolutionReport> {
    let config = Config::new(runtime, options)?;
    debug!(
        "Syncing {} package(s) into {:?}",
        config.packages.len(),
        config.dest
    );

    let report = pipeline::run(
        &config.resolver,
        config.resolver.runtime(),
        &config.lock_groups,
        &config.packages,
        &config.dest,
    )
    .await?;

    print_report(&report, format)?;

    if strict && !report.is_complete() {
        bail!("{} package(s) could not be resolved", report.missing.len());
    }
    Ok(report)
}

fn print_report(report: &ResolutionReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

/// Print the built-in lock groups.
pub fn lock_groups(format: OutputFormat) -> Result<()> {
    let specs = builtin_lock_group_specs();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&specs)?),
        OutputFormat::Text => {
            for spec in specs {
                match spec.exclude {
                    Some(exclude) => {
                        println!("{}: {} (excluding {})", spec.name, spec.include, exclude)
                    }
                    None => println!("{}: {}", spec.name, spec.include),
                }
            }
        }
    }
    Ok(())
}
