/*!
 * Configuration shared by every program in this crate.
 *
 * Command line options are collected into an [AnalysisOptions], which every binary flattens into
 * its own parser. They are then checked and turned into an [AnalysisSettings], the single value
 * that drives the whole pipeline.
 */

use crate::{
    cluster::{ClusterParams, SelfMatch},
    filter::{FilterMode, PercentileFilter, ValueFilter},
    instrument::Instrument,
    FireSpotsError, FireSpotsResult,
};
use clap::Args;
use std::{
    fmt::{self, Display},
    path::PathBuf,
};

/// Default output file names, each is prefixed with the instrument name.
pub const DEFAULT_LOG_NAME: &str = "log.txt";
pub const DEFAULT_CSV_NAME: &str = "firepoints.csv";
pub const DEFAULT_KML_NAME: &str = "hotspots.kml";

/// The sub-directory of the output directory where analysis results go.
pub const RESULTS_DIR: &str = "results";

/*-------------------------------------------------------------------------------------------------
 *                                   Command line options
 *-----------------------------------------------------------------------------------------------*/

/// Options for loading, filtering, clustering and reporting.
#[derive(Debug, Clone, Args)]
pub struct AnalysisOptions {
    /// Directory with the FIRMS zip archives.
    #[clap(short, long, env = "FIRESPOTS_INPUT_DIR", default_value = "data")]
    pub input_dir: PathBuf,

    /// Directory where the results are written, it is created if needed.
    #[clap(short, long, env = "FIRESPOTS_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Keep only rows where the filter column compares to this value.
    ///
    /// No value filter is applied unless this is given.
    #[clap(long)]
    pub filter_value: Option<f64>,

    /// How the value filter compares, "equal", "below", or "above".
    #[clap(long, default_value = "equal")]
    pub filter_mode: FilterMode,

    /// The column the value filter looks at.
    #[clap(long, default_value = "year")]
    pub filter_column: String,

    /// Keep only rows above this percentile (0 to 100) of the percentile column.
    ///
    /// Applied after the value filter. No percentile filter is applied unless this is given.
    #[clap(short, long)]
    pub percentile: Option<f64>,

    /// The column the percentile filter looks at.
    #[clap(long, default_value = "frp")]
    pub percentile_column: String,

    /// The column used to pick the top points.
    #[clap(long, default_value = "frp")]
    pub rank_column: String,

    /// Number of top points to build clusters around.
    #[clap(short = 'n', long, default_value_t = 100)]
    pub top: usize,

    /// Neighbors must be closer than this many kilometers to the top point.
    #[clap(short, long, default_value_t = 10.0)]
    pub distance: f64,

    /// Neighbors must be closer than this many days to the top point.
    #[clap(short = 't', long, default_value_t = 30.0)]
    pub days: f64,

    /// List each top point among its own neighbors.
    #[clap(long)]
    pub include_self: bool,

    /// Don't print the clusters to standard output.
    #[clap(long)]
    pub no_stdout: bool,

    /// Don't write the clusters to a log file.
    #[clap(long)]
    pub no_log: bool,

    /// Don't write the clusters to a CSV file.
    #[clap(long)]
    pub no_csv: bool,

    /// Also write a KML map of the clusters.
    #[clap(short, long)]
    pub kml: bool,

    /// Also write each cluster to its own CSV file.
    #[clap(long)]
    pub split_groups: bool,

    /// Save the filtered data, with the derived time columns, to {output_dir}/{INSTRUMENT}.csv.
    #[clap(long)]
    pub save_data: bool,

    /// Name of the log file.
    #[clap(long, default_value = DEFAULT_LOG_NAME)]
    pub log_name: String,

    /// Name of the CSV file.
    #[clap(long, default_value = DEFAULT_CSV_NAME)]
    pub csv_name: String,

    /// Name of the KML file.
    #[clap(long, default_value = DEFAULT_KML_NAME)]
    pub kml_name: String,
}

impl AnalysisOptions {
    /// Validate the options and build the settings from them.
    pub fn check(self) -> FireSpotsResult<AnalysisSettings> {
        let AnalysisOptions {
            input_dir,
            output_dir,
            filter_value,
            filter_mode,
            filter_column,
            percentile,
            percentile_column,
            rank_column,
            top,
            distance,
            days,
            include_self,
            no_stdout,
            no_log,
            no_csv,
            kml,
            split_groups,
            save_data,
            log_name,
            csv_name,
            kml_name,
        } = self;

        let value_filter = filter_value.map(|v| ValueFilter::new(filter_mode, &filter_column, v));

        let percentile_filter = match percentile {
            Some(p) => Some(PercentileFilter::new(&percentile_column, p)?),
            None => None,
        };

        let self_match = if include_self {
            SelfMatch::Include
        } else {
            SelfMatch::Exclude
        };

        let settings = AnalysisSettings {
            input_dir,
            output_dir,
            value_filter,
            percentile_filter,
            cluster: ClusterParams {
                rank_column,
                top_n: top,
                distance_cutoff_km: distance,
                time_cutoff_days: days,
                self_match,
            },
            outputs: OutputSettings {
                to_stdout: !no_stdout,
                to_log: !no_log,
                to_csv: !no_csv,
                to_kml: kml,
                split_groups,
                save_data,
                log_name,
                csv_name,
                kml_name,
                group_tag: DEFAULT_GROUP_TAG.to_owned(),
            },
        };

        settings.validate()?;
        Ok(settings)
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                      Checked settings
 *-----------------------------------------------------------------------------------------------*/

const DEFAULT_GROUP_TAG: &str = "all";

/// Which outputs a run produces and what the files are called.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub to_stdout: bool,
    pub to_log: bool,
    pub to_csv: bool,
    pub to_kml: bool,
    /// Write one CSV file per cluster too.
    pub split_groups: bool,
    /// Save the filtered tables.
    pub save_data: bool,
    pub log_name: String,
    pub csv_name: String,
    pub kml_name: String,
    /// Goes in the name of the per-cluster CSV files, `{INSTRUMENT}_{tag}_firepoints_001.csv`.
    pub group_tag: String,
}

impl OutputSettings {
    /// Is there anywhere to send the clusters?
    pub fn any_cluster_output(&self) -> bool {
        self.to_stdout || self.to_log || self.to_csv || self.to_kml || self.split_groups
    }
}

/// Everything needed to run the analysis once.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub value_filter: Option<ValueFilter>,
    pub percentile_filter: Option<PercentileFilter>,
    pub cluster: ClusterParams,
    pub outputs: OutputSettings,
}

impl AnalysisSettings {
    /// Check for values that can't produce a meaningful analysis.
    pub fn validate(&self) -> FireSpotsResult<()> {
        let ClusterParams {
            distance_cutoff_km,
            time_cutoff_days,
            ..
        } = self.cluster;

        if !(distance_cutoff_km >= 0.0) {
            return Err(FireSpotsError::Config(format!(
                "distance cutoff must be a non-negative number of kilometers, not {}",
                distance_cutoff_km
            )));
        }

        if !(time_cutoff_days >= 0.0) {
            return Err(FireSpotsError::Config(format!(
                "time cutoff must be a non-negative number of days, not {}",
                time_cutoff_days
            )));
        }

        let outputs = &self.outputs;
        for (what, name) in [
            ("log", &outputs.log_name),
            ("csv", &outputs.csv_name),
            ("kml", &outputs.kml_name),
        ] {
            if name.trim().is_empty() || name.contains(std::path::is_separator) {
                return Err(FireSpotsError::Config(format!(
                    "invalid {} file name '{}'",
                    what, name
                )));
            }
        }

        Ok(())
    }

    /// The directory the cluster outputs go in.
    pub fn results_dir(&self) -> PathBuf {
        self.output_dir.join(RESULTS_DIR)
    }

    /// Where to put a result file for an instrument, e.g. `output/results/MODIS_log.txt`.
    pub fn result_path(&self, instrument: Instrument, name: &str) -> PathBuf {
        self.results_dir().join(format!("{}_{}", instrument, name))
    }

    /// Where the filtered table for an instrument is saved.
    pub fn saved_data_path(&self, instrument: Instrument) -> PathBuf {
        self.output_dir.join(format!("{}.csv", instrument))
    }

    /// A copy of these settings restricted to a single year of data.
    ///
    /// The value filter is replaced with `year == {year}` and the log and CSV names get the year
    /// in front, so a batch of years doesn't overwrite its own results.
    pub fn for_year(&self, year: i32) -> Self {
        let mut settings = self.clone();

        settings.value_filter = Some(ValueFilter::new(FilterMode::Equal, "year", year as f64));
        settings.outputs.log_name = format!("{}_{}", year, DEFAULT_LOG_NAME);
        settings.outputs.csv_name = format!("{}_{}", year, DEFAULT_CSV_NAME);
        settings.outputs.kml_name = format!("{}_{}", year, DEFAULT_KML_NAME);
        settings.outputs.group_tag = year.to_string();

        settings
    }

    /// Prefix of the per-cluster CSV files for an instrument.
    pub fn group_prefix(&self, instrument: Instrument) -> String {
        format!("{}_{}", instrument, self.outputs.group_tag)
    }
}

/// The settings the analysis scripts were tuned with, 2015 data only, top 100 by FRP, 10 km and
/// 30 days.
impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            input_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            value_filter: Some(ValueFilter::new(FilterMode::Equal, "year", 2015.0)),
            percentile_filter: None,
            cluster: ClusterParams::default(),
            outputs: OutputSettings {
                to_stdout: true,
                to_log: true,
                to_csv: true,
                to_kml: false,
                split_groups: false,
                save_data: false,
                log_name: DEFAULT_LOG_NAME.to_owned(),
                csv_name: DEFAULT_CSV_NAME.to_owned(),
                kml_name: DEFAULT_KML_NAME.to_owned(),
                group_tag: DEFAULT_GROUP_TAG.to_owned(),
            },
        }
    }
}

impl Display for AnalysisSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let on_off = |b: bool| if b { "on" } else { "off" };

        writeln!(f, "\n")?;
        writeln!(f, "     Input directory: {}", self.input_dir.display())?;
        writeln!(f, "    Output directory: {}", self.output_dir.display())?;
        match &self.value_filter {
            Some(filter) => writeln!(f, "        Value filter: {}", filter)?,
            None => writeln!(f, "        Value filter: none")?,
        }
        match &self.percentile_filter {
            Some(filter) => writeln!(
                f,
                "   Percentile filter: {} > percentile {}",
                filter.column, filter.percentile
            )?,
            None => writeln!(f, "   Percentile filter: none")?,
        }
        writeln!(
            f,
            "           Top points: {} by {}",
            self.cluster.top_n, self.cluster.rank_column
        )?;
        writeln!(f, "     Distance cutoff: {} km", self.cluster.distance_cutoff_km)?;
        writeln!(f, "         Time cutoff: {} days", self.cluster.time_cutoff_days)?;
        writeln!(f, "          Self match: {:?}", self.cluster.self_match)?;
        writeln!(f, "              Stdout: {}", on_off(self.outputs.to_stdout))?;
        writeln!(
            f,
            "                 Log: {} ({})",
            on_off(self.outputs.to_log),
            self.outputs.log_name
        )?;
        writeln!(
            f,
            "                 CSV: {} ({})",
            on_off(self.outputs.to_csv),
            self.outputs.csv_name
        )?;
        writeln!(
            f,
            "                 KML: {} ({})",
            on_off(self.outputs.to_kml),
            self.outputs.kml_name
        )?;
        writeln!(f, "  Per-group CSV files: {}", on_off(self.outputs.split_groups))?;
        writeln!(f, "  Save filtered data: {}", on_off(self.outputs.save_data))?;
        writeln!(f, "\n")?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestOptions {
        #[clap(flatten)]
        analysis: AnalysisOptions,
    }

    fn parse(args: &[&str]) -> FireSpotsResult<AnalysisSettings> {
        let argv = std::iter::once("test").chain(args.iter().copied());
        TestOptions::try_parse_from(argv)
            .map_err(|err| FireSpotsError::Config(err.to_string()))?
            .analysis
            .check()
    }

    #[test]
    fn test_command_line_defaults() {
        let settings = parse(&["-i", "data", "-o", "output"]).unwrap();

        assert_eq!(settings.value_filter, None);
        assert_eq!(settings.percentile_filter, None);
        assert_eq!(settings.cluster, ClusterParams::default());
        assert!(settings.outputs.to_stdout && settings.outputs.to_log && settings.outputs.to_csv);
        assert!(!settings.outputs.to_kml);
        assert_eq!(
            settings.result_path(Instrument::MODIS, &settings.outputs.log_name),
            PathBuf::from("output/results/MODIS_log.txt")
        );
    }

    #[test]
    fn test_command_line_filters() {
        let settings = parse(&[
            "-i",
            "data",
            "-o",
            "output",
            "--filter-value",
            "2017",
            "--filter-mode",
            "above",
            "-p",
            "90",
            "-n",
            "5",
            "-d",
            "2.5",
            "-t",
            "0.5",
            "--include-self",
            "--no-stdout",
        ])
        .unwrap();

        assert_eq!(
            settings.value_filter,
            Some(ValueFilter::new(FilterMode::Above, "year", 2017.0))
        );
        assert_eq!(settings.percentile_filter.unwrap().percentile, 90.0);
        assert_eq!(settings.cluster.top_n, 5);
        assert_eq!(settings.cluster.distance_cutoff_km, 2.5);
        assert_eq!(settings.cluster.time_cutoff_days, 0.5);
        assert_eq!(settings.cluster.self_match, SelfMatch::Include);
        assert!(!settings.outputs.to_stdout);
    }

    #[test]
    fn test_bad_options() {
        assert!(parse(&["-i", "data", "-o", "output", "-p", "101"]).is_err());
        assert!(parse(&["-i", "data", "-o", "output", "-d", "-1"]).is_err());
        assert!(parse(&["-i", "data", "-o", "output", "--filter-mode", "over"]).is_err());
        assert!(parse(&["-i", "data", "-o", "output", "--csv-name", "a/b.csv"]).is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = AnalysisSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.value_filter.as_ref().unwrap().to_string(), "year == 2015");
        assert_eq!(settings.cluster.top_n, 100);
        assert_eq!(settings.group_prefix(Instrument::VIIRS), "VIIRS_all");
        assert_eq!(
            settings.saved_data_path(Instrument::VIIRS),
            PathBuf::from("output/VIIRS.csv")
        );
        assert!(settings.to_string().contains("Distance cutoff: 10 km"));
    }

    #[test]
    fn test_for_year() {
        let base = AnalysisSettings {
            value_filter: None,
            ..AnalysisSettings::default()
        };
        let year = base.for_year(2018);

        assert_eq!(year.value_filter.as_ref().unwrap().to_string(), "year == 2018");
        assert_eq!(year.outputs.log_name, "2018_log.txt");
        assert_eq!(year.outputs.csv_name, "2018_firepoints.csv");
        assert_eq!(year.group_prefix(Instrument::MODIS), "MODIS_2018");
        assert_eq!(year.cluster, base.cluster);
    }
}
