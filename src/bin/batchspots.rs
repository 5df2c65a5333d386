use clap::Parser;
use firespots::{AnalysisOptions, AnalysisSettings, FireSpotsError, FireSpotsResult};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::fmt::{self, Display};

/*-------------------------------------------------------------------------------------------------
 *                                     Command Line Options
 *-----------------------------------------------------------------------------------------------*/

///
/// Find hotspot clusters one year at a time.
///
/// The analysis is run once for each requested year with the data restricted to that year. The
/// log and CSV files for each year are named {year}_log.txt and {year}_firepoints.csv, and any
/// value filter on the command line is replaced by the year filter.
///
#[derive(Debug, Parser)]
#[clap(bin_name = "batchspots")]
#[clap(author, version, about)]
struct BatchSpotsOptionsInit {
    #[clap(flatten)]
    analysis: AnalysisOptions,

    /// The years to analyze, as a comma separated list or a range, e.g. 2015,2017 or 2015-2019.
    #[clap(short, long)]
    #[clap(parse(try_from_str=parse_years))]
    #[clap(default_value = "2015-2019")]
    years: YearList,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct YearList(Vec<i32>);

impl Display for YearList {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let years: Vec<String> = self.0.iter().map(|y| y.to_string()).collect();
        write!(f, "{}", years.join(", "))
    }
}

fn parse_years(years_str: &str) -> FireSpotsResult<YearList> {
    let bad_year = |s: &str| FireSpotsError::Config(format!("invalid year: '{}'", s));

    let mut years = vec![];
    for part in years_str.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start: i32 = start.trim().parse().map_err(|_| bad_year(part))?;
                let end: i32 = end.trim().parse().map_err(|_| bad_year(part))?;
                if start > end {
                    return Err(bad_year(part));
                }
                years.extend(start..=end);
            }
            None => years.push(part.parse().map_err(|_| bad_year(part))?),
        }
    }

    if years.is_empty() {
        return Err(FireSpotsError::Config("no years given".to_owned()));
    }

    Ok(YearList(years))
}

#[derive(Debug)]
struct BatchSpotsOptionsChecked {
    /// Settings shared by every year.
    settings: AnalysisSettings,

    /// The years to run.
    years: YearList,
}

impl Display for BatchSpotsOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.settings)?;
        writeln!(f, "               Years: {}", self.years)?;
        writeln!(f, "\n")?;

        Ok(())
    }
}

/// Get the command line arguments, start logging, and check the arguments.
fn parse_args() -> FireSpotsResult<BatchSpotsOptionsChecked> {
    let BatchSpotsOptionsInit {
        analysis,
        years,
        verbose,
    } = BatchSpotsOptionsInit::parse();

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("firespots", level)
        .with_module_level("batchspots", level)
        .init()?;

    let checked = BatchSpotsOptionsChecked {
        settings: analysis.check()?,
        years,
    };

    if verbose {
        info!("{}", checked);
    }

    Ok(checked)
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> FireSpotsResult<()> {
    let BatchSpotsOptionsChecked { settings, years } = parse_args()?;

    for &year in &years.0 {
        info!("starting analysis for {}", year);

        let results = firespots::run(&settings.for_year(year))?;
        for clusters in &results {
            info!("{} {}: {} clusters", year, clusters.instrument, clusters.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_years() {
        assert_eq!(
            parse_years("2015-2019").unwrap(),
            YearList(vec![2015, 2016, 2017, 2018, 2019])
        );
        assert_eq!(
            parse_years("2015, 2017,2020-2021").unwrap(),
            YearList(vec![2015, 2017, 2020, 2021])
        );
        assert_eq!(parse_years("2018").unwrap().to_string(), "2018");

        assert!(parse_years("").is_err());
        assert!(parse_years("2019-2015").is_err());
        assert!(parse_years("twenty").is_err());
    }
}
