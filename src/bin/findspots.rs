use clap::Parser;
use firespots::{AnalysisOptions, AnalysisSettings, FireSpotsResult};
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;

/*-------------------------------------------------------------------------------------------------
 *                                     Command Line Options
 *-----------------------------------------------------------------------------------------------*/

///
/// Find hotspot clusters in FIRMS active fire archives.
///
/// Every zip archive in the input directory is loaded, one table per instrument. The tables are
/// filtered, the top points by FRP (or another column) are found, and each one is paired with every
/// detection close to it in space and time. The clusters go to standard output, a log file and a
/// CSV file under {output_dir}/results, and optionally a KML map.
///
#[derive(Debug, Parser)]
#[clap(bin_name = "findspots")]
#[clap(author, version, about)]
struct FindSpotsOptionsInit {
    #[clap(flatten)]
    analysis: AnalysisOptions,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

/// Get the command line arguments, start logging, and check the arguments.
fn parse_args() -> FireSpotsResult<AnalysisSettings> {
    let FindSpotsOptionsInit { analysis, verbose } = FindSpotsOptionsInit::parse();

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("firespots", level)
        .with_module_level("findspots", level)
        .init()?;

    let settings = analysis.check()?;

    if verbose {
        info!("{}", settings);
    }

    Ok(settings)
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> FireSpotsResult<()> {
    let settings = parse_args()?;

    let results = firespots::run(&settings)?;

    for clusters in &results {
        let num_points: usize = clusters.clusters.iter().map(|c| c.num_points()).sum();
        info!(
            "{}: {} clusters with {} points",
            clusters.instrument,
            clusters.len(),
            num_points
        );
    }

    if results.is_empty() {
        warn!("no clusters were produced, all cluster outputs are turned off");
    }

    Ok(())
}
