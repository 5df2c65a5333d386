use chrono::Duration;
use clap::Parser;
use firespots::{FirePoint, FireSpotsError, FireSpotsResult, Instrument};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
 *                                     Command Line Options
 *-----------------------------------------------------------------------------------------------*/

///
/// Compare two fire detections.
///
/// Loads the archives in the input directory and prints two detections from the same instrument,
/// the distance and time between them, and whether they would be neighbors in a cluster.
///
#[derive(Debug, Parser)]
#[clap(bin_name = "comparespots")]
#[clap(author, version, about)]
struct CompareSpotsOptionsInit {
    /// Directory with the FIRMS zip archives.
    #[clap(short, long, env = "FIRESPOTS_INPUT_DIR", default_value = "data")]
    input_dir: PathBuf,

    /// The instrument, MODIS or VIIRS.
    #[clap(parse(try_from_str=parse_instrument))]
    instrument: Instrument,

    /// Row number (0 based) of the first detection in the instrument's table.
    first: usize,

    /// Row number (0 based) of the second detection in the instrument's table.
    second: usize,

    /// Points closer than this many kilometers are close in space.
    #[clap(short, long, default_value_t = 100.0)]
    distance: f64,

    /// Points closer than this many days are close in time.
    #[clap(short = 't', long, default_value_t = 365.0)]
    days: f64,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn parse_instrument(inst: &str) -> FireSpotsResult<Instrument> {
    Instrument::string_contains_instrument(inst).ok_or_else(|| {
        FireSpotsError::Config(format!("Argument is not a valid instrument name: {}", inst))
    })
}

/// Python style duration, e.g. "12 days, 3:04:00".
fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().abs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    match days {
        0 => format!("{}:{:02}:{:02}", hours, minutes, seconds),
        1 => format!("1 day, {}:{:02}:{:02}", hours, minutes, seconds),
        _ => format!("{} days, {}:{:02}:{:02}", days, hours, minutes, seconds),
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> FireSpotsResult<()> {
    let opts = CompareSpotsOptionsInit::parse();

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("firespots", level)
        .with_module_level("comparespots", level)
        .init()?;

    info!("loading data...");
    let datasets = firespots::load_datasets(&opts.input_dir)?;
    let dataset = datasets.get(&opts.instrument).ok_or_else(|| {
        FireSpotsError::Config(format!("no {} data in the archives", opts.instrument))
    })?;

    let get_point = |idx: usize| -> FireSpotsResult<FirePoint> {
        dataset
            .records()
            .get(idx)
            .map(|rec| rec.point)
            .ok_or_else(|| {
                FireSpotsError::Config(format!(
                    "row {} is out of range, there are {} {} rows",
                    idx,
                    dataset.len(),
                    opts.instrument
                ))
            })
    };

    let p1 = get_point(opts.first)?;
    let p2 = get_point(opts.second)?;

    println!("FirePoint 1: {}", p1);
    println!("FirePoint 2: {}", p2);
    println!("Spatial Distance: {} Km", p1.distance_km(&p2));
    println!("Temporal Distance: {}", format_duration(p1.time_between(&p2)));

    let are_close = p1.is_neighbor_of(&p2, opts.distance, opts.days);
    println!("Are they close?");
    println!(
        "Considering point within {} kilometers and {} days as being close, the points ARE{} close",
        opts.distance,
        opts.days,
        if are_close { "" } else { " NOT" }
    );

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(3_840)), "1:04:00");
        assert_eq!(format_duration(Duration::hours(27)), "1 day, 3:00:00");
        assert_eq!(
            format_duration(Duration::days(12) + Duration::minutes(184)),
            "12 days, 3:04:00"
        );
    }

    #[test]
    fn test_parse_instrument() {
        assert_eq!(parse_instrument("viirs").unwrap(), Instrument::VIIRS);
        assert_eq!(parse_instrument("MODIS_C6").unwrap(), Instrument::MODIS);
        assert!(parse_instrument("GOES").is_err());
    }
}
