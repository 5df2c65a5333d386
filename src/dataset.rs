/*!
 * Loading FIRMS active fire archives into one table per instrument.
 *
 * NASA distributes the archives as zip files with one or more CSV files inside. For each
 * instrument there are usually "archive" files (standard processing, older than a few months)
 * and near real time "nrt" files. All of them are concatenated, nothing is de-duplicated.
 */

use crate::{
    firepoint::FirePoint,
    instrument::Instrument,
    timefields::{TimeFields, DERIVED_COLUMNS},
    FireSpotsError, FireSpotsResult,
};
use log::{debug, info};
use rustc_hash::FxHashMap as HashMap;
use serde::Deserialize;
use std::{collections::BTreeMap, fs::File, io::Read, path::Path, str::FromStr};

/// The columns every input CSV must have.
const REQUIRED_COLUMNS: [&str; 6] = [
    "latitude",
    "longitude",
    "frp",
    "instrument",
    "acq_date",
    "acq_time",
];

/// The subset of a FIRMS record needed to build a [FirePoint].
#[derive(Debug, Deserialize)]
struct RawFireRecord {
    latitude: f64,
    longitude: f64,
    frp: f64,
    instrument: String,
    acq_date: String,
    acq_time: u32,
}

/// A numeric column of a [Dataset] that can be used for filtering or ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Frp,
    Latitude,
    Longitude,
    AcqTime,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    /// Any other column from the input files, parsed as a number when it's read.
    Raw { name: String, index: usize },
}

impl Column {
    pub fn name(&self) -> &str {
        use Column::*;

        match self {
            Frp => "frp",
            Latitude => "latitude",
            Longitude => "longitude",
            AcqTime => "acq_time",
            Year => "year",
            Month => "month",
            Day => "day",
            Hour => "hour",
            Minute => "minute",
            Raw { name, .. } => name,
        }
    }
}

/// One detection with every field from the input file plus the derived time fields.
#[derive(Debug, Clone)]
pub struct FireRecord {
    pub point: FirePoint,
    pub time: TimeFields,
    /// Raw fields, in the order of the owning dataset's headers. May be shorter than the headers
    /// if later files added columns.
    fields: Vec<String>,
}

impl FireRecord {
    /// Get a raw field by header position, missing fields are empty.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    /// Get the numeric value of a column.
    ///
    /// Empty raw fields are NaN, anything else that isn't a number is an error.
    pub fn value(&self, column: &Column) -> FireSpotsResult<f64> {
        use Column::*;

        let val = match column {
            Frp => self.point.frp,
            Latitude => self.point.latitude(),
            Longitude => self.point.longitude(),
            AcqTime => self.time.hour as f64 * 100.0 + self.time.minute as f64,
            Year => self.time.year as f64,
            Month => self.time.month as f64,
            Day => self.time.day as f64,
            Hour => self.time.hour as f64,
            Minute => self.time.minute as f64,
            Raw { name, index } => {
                let raw = self.field(*index).trim();
                if raw.is_empty() {
                    f64::NAN
                } else {
                    raw.parse().map_err(|_| {
                        FireSpotsError::Parse(format!(
                            "value '{}' in column '{}' is not a number",
                            raw, name
                        ))
                    })?
                }
            }
        };

        Ok(val)
    }
}

/// All the detections from a single instrument.
#[derive(Debug, Clone)]
pub struct Dataset {
    instrument: Instrument,
    headers: Vec<String>,
    header_index: HashMap<String, usize>,
    records: Vec<FireRecord>,
}

impl Dataset {
    /// Create an empty table.
    pub fn new(instrument: Instrument) -> Self {
        Dataset {
            instrument,
            headers: vec![],
            header_index: HashMap::default(),
            records: vec![],
        }
    }

    /// Build a table directly from points, with only the required columns.
    pub fn from_points(instrument: Instrument, points: Vec<FirePoint>) -> Self {
        let mut dataset = Self::new(instrument);
        let headers: Vec<String> = REQUIRED_COLUMNS.iter().map(|&h| h.to_owned()).collect();
        dataset.merge_headers(&headers);

        dataset.records = points
            .into_iter()
            .map(|point| {
                let time = TimeFields::derive(point.acquired);
                let fields = vec![
                    point.latitude().to_string(),
                    point.longitude().to_string(),
                    point.frp.to_string(),
                    point.instrument.to_string(),
                    point.acquired.format("%Y-%m-%d").to_string(),
                    format!("{}{:02}", time.hour, time.minute),
                ];
                FireRecord {
                    point,
                    time,
                    fields,
                }
            })
            .collect();

        dataset
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[FireRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a numeric column by name.
    ///
    /// Derived time columns and the typed FirePoint columns are matched first, then any other
    /// header from the input files.
    pub fn column(&self, name: &str) -> FireSpotsResult<Column> {
        use Column::*;

        let col = match name {
            "frp" => Frp,
            "latitude" => Latitude,
            "longitude" => Longitude,
            "acq_time" => AcqTime,
            "year" => Year,
            "month" => Month,
            "day" => Day,
            "hour" => Hour,
            "minute" => Minute,
            "month_name" | "datetime" | "acq_date" | "instrument" => {
                return Err(FireSpotsError::Config(format!(
                    "column '{}' is not numeric",
                    name
                )));
            }
            other => match self.header_index.get(other) {
                Some(&index) => Raw {
                    name: other.to_owned(),
                    index,
                },
                None => {
                    return Err(FireSpotsError::Config(format!(
                        "no column named '{}' in the {} data",
                        name, self.instrument
                    )));
                }
            },
        };

        Ok(col)
    }

    /// The value of a column for every record, in record order.
    pub fn column_values(&self, column: &Column) -> FireSpotsResult<Vec<f64>> {
        self.records.iter().map(|rec| rec.value(column)).collect()
    }

    /// Keep only the records where `keep` is true.
    pub fn select(self, keep: &[bool]) -> Self {
        debug_assert_eq!(keep.len(), self.records.len());

        let Dataset {
            instrument,
            headers,
            header_index,
            records,
        } = self;

        let records = records
            .into_iter()
            .zip(keep.iter())
            .filter_map(|(rec, &k)| if k { Some(rec) } else { None })
            .collect();

        Dataset {
            instrument,
            headers,
            header_index,
            records,
        }
    }

    /// Write the table, with the derived time columns appended, to a CSV file.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> FireSpotsResult<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;

        let header_row = self
            .headers
            .iter()
            .map(String::as_str)
            .chain(DERIVED_COLUMNS.iter().copied());
        writer.write_record(header_row)?;

        for rec in &self.records {
            let derived = rec.time.as_strings();
            let row = (0..self.headers.len())
                .map(|i| rec.field(i))
                .chain(derived.iter().map(String::as_str));
            writer.write_record(row)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Add any headers not seen before and return where each of `headers` lives in this table.
    fn merge_headers<S: AsRef<str>>(&mut self, headers: &[S]) -> Vec<usize> {
        headers
            .iter()
            .map(|h| {
                let h = h.as_ref();
                match self.header_index.get(h) {
                    Some(&idx) => idx,
                    None => {
                        let idx = self.headers.len();
                        self.headers.push(h.to_owned());
                        self.header_index.insert(h.to_owned(), idx);
                        idx
                    }
                }
            })
            .collect()
    }
}

/**
 * Load every zip archive in `input_dir` into one [Dataset] per instrument.
 *
 * Archives are read in file name order and rows are sorted into tables by their `instrument`
 * column. Any unreadable archive or malformed row ends the load with an error.
 */
pub fn load_datasets<P: AsRef<Path>>(input_dir: P) -> FireSpotsResult<BTreeMap<Instrument, Dataset>> {
    let input_dir = input_dir.as_ref();
    let mut datasets: BTreeMap<Instrument, Dataset> = BTreeMap::new();
    let mut num_archives = 0;

    for entry in walkdir::WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();

        let is_zip = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("zip"))
            .unwrap_or(false);

        if !path.is_file() || !is_zip {
            continue;
        }

        info!("loading {}", path.display());
        load_zip_archive(path, &mut datasets)?;
        num_archives += 1;
    }

    if num_archives == 0 {
        return Err(FireSpotsError::Config(format!(
            "no zip archives found in {}",
            input_dir.display()
        )));
    }

    for (instrument, dataset) in &datasets {
        info!("loaded {} {} detections", dataset.len(), instrument);
    }

    Ok(datasets)
}

/// Read every CSV file inside a zip archive.
pub fn load_zip_archive(
    path: &Path,
    datasets: &mut BTreeMap<Instrument, Dataset>,
) -> FireSpotsResult<()> {
    let file = File::open(path)?;
    let mut zip = zip::ZipArchive::new(file)?;

    for i in 0..zip.len() {
        let csv_file = zip.by_index(i)?;
        let name = csv_file.name().to_owned();

        if csv_file.is_dir() || !name.to_lowercase().ends_with(".csv") {
            debug!("skipping {} in {}", name, path.display());
            continue;
        }

        let source = format!("{}:{}", path.display(), name);
        let count = load_csv(csv_file, &source, datasets)?;
        debug!("read {} rows from {}", count, source);
    }

    Ok(())
}

/// Read a single FIRMS CSV, returns the number of rows read.
pub fn load_csv<R: Read>(
    rdr: R,
    source: &str,
    datasets: &mut BTreeMap<Instrument, Dataset>,
) -> FireSpotsResult<usize> {
    let mut csv_reader = csv::Reader::from_reader(rdr);
    let headers = csv_reader.headers()?.clone();

    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(FireSpotsError::Parse(format!(
                "{} is missing the '{}' column",
                source, required
            )));
        }
    }

    let header_names: Vec<&str> = headers.iter().collect();
    let mut mappings: HashMap<Instrument, Vec<usize>> = HashMap::default();
    let mut count = 0;

    for (row, res) in csv_reader.records().enumerate() {
        // Line numbers are 1-based and the header is line 1.
        let line = row + 2;
        let located = |msg: String| FireSpotsError::Parse(format!("{} line {}: {}", source, line, msg));

        let record = res?;
        let raw: RawFireRecord = record
            .deserialize(Some(&headers))
            .map_err(|err| located(err.to_string()))?;

        let instrument = Instrument::from_str(raw.instrument.trim())
            .map_err(|_| located(format!("unknown instrument '{}'", raw.instrument)))?;

        let point = FirePoint::new(
            instrument,
            &raw.acq_date,
            raw.acq_time,
            raw.latitude,
            raw.longitude,
            raw.frp,
        )
        .map_err(|err| located(err.to_string()))?;

        let dataset = datasets
            .entry(instrument)
            .or_insert_with(|| Dataset::new(instrument));
        let mapping = mappings
            .entry(instrument)
            .or_insert_with(|| dataset.merge_headers(&header_names));

        let mut fields = vec![String::new(); dataset.headers.len()];
        for (src, &dst) in mapping.iter().enumerate() {
            fields[dst] = record.get(src).unwrap_or("").to_owned();
        }

        dataset.records.push(FireRecord {
            point,
            time: TimeFields::derive(point.acquired),
            fields,
        });
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod test {
    use super::*;

    const MODIS_CSV: &str = "\
latitude,longitude,brightness,scan,track,acq_date,acq_time,satellite,instrument,confidence,version,bright_t31,frp,daynight,type
-8.5,-45.0,320.5,1.0,1.0,2015-08-01,130,Terra,MODIS,80,6.2,300.1,25.3,D,0
-8.51,-45.01,330.1,1.0,1.0,2015-08-02,1345,Aqua,MODIS,95,6.2,301.0,110.0,D,0
";

    const MODIS_NRT_CSV: &str = "\
latitude,longitude,brightness,scan,track,acq_date,acq_time,satellite,instrument,confidence,version,bright_t31,frp,daynight
-9.0,-46.0,310.0,1.0,1.0,2016-01-10,5,Terra,MODIS,50,6.1NRT,299.0,7.5,N
";

    fn load(csvs: &[&str]) -> FireSpotsResult<BTreeMap<Instrument, Dataset>> {
        let mut datasets = BTreeMap::new();
        for (i, csv) in csvs.iter().enumerate() {
            load_csv(csv.as_bytes(), &format!("test{}.csv", i), &mut datasets)?;
        }
        Ok(datasets)
    }

    #[test]
    fn test_load_csv() {
        let datasets = load(&[MODIS_CSV, MODIS_NRT_CSV]).unwrap();
        assert_eq!(datasets.len(), 1);

        let modis = &datasets[&Instrument::MODIS];
        assert_eq!(modis.len(), 3);
        assert_eq!(modis.headers().len(), 15);

        let first = &modis.records()[0];
        assert_eq!(first.point.frp, 25.3);
        assert_eq!(first.time.hour, 1);
        assert_eq!(first.time.minute, 30);

        let last = &modis.records()[2];
        assert_eq!(last.time.hour, 0);
        assert_eq!(last.time.minute, 5);
        assert_eq!(last.time.year, 2016);

        // The nrt file has no "type" column.
        let type_col = modis.column("type").unwrap();
        assert!(last.value(&type_col).unwrap().is_nan());
        assert_eq!(first.value(&type_col).unwrap(), 0.0);
    }

    #[test]
    fn test_column_lookup() {
        let datasets = load(&[MODIS_CSV]).unwrap();
        let modis = &datasets[&Instrument::MODIS];

        assert_eq!(modis.column("frp").unwrap(), Column::Frp);
        assert_eq!(modis.column("year").unwrap(), Column::Year);
        assert!(matches!(
            modis.column("brightness").unwrap(),
            Column::Raw { .. }
        ));
        assert!(matches!(
            modis.column("bright_ti4"),
            Err(FireSpotsError::Config(_))
        ));
        assert!(matches!(
            modis.column("month_name"),
            Err(FireSpotsError::Config(_))
        ));

        let brightness = modis.column("brightness").unwrap();
        assert_eq!(
            modis.column_values(&brightness).unwrap(),
            vec![320.5, 330.1]
        );

        // Not every raw column is numeric.
        let daynight = modis.column("daynight").unwrap();
        assert!(matches!(
            modis.column_values(&daynight),
            Err(FireSpotsError::Parse(_))
        ));
    }

    #[test]
    fn test_rows_split_by_instrument() {
        let mixed = "\
latitude,longitude,acq_date,acq_time,instrument,frp
1.0,2.0,2019-01-01,1200,VIIRS,3.5
1.0,2.0,2019-01-01,1200,MODIS,9.5
1.1,2.1,2019-01-02,1300,VIIRS,4.5
";
        let datasets = load(&[mixed]).unwrap();
        assert_eq!(datasets[&Instrument::MODIS].len(), 1);
        assert_eq!(datasets[&Instrument::VIIRS].len(), 2);
    }

    #[test]
    fn test_malformed_rows_fail() {
        let bad_date = "\
latitude,longitude,acq_date,acq_time,instrument,frp
1.0,2.0,2019-01-01,1200,VIIRS,3.5
1.0,2.0,01/02/2019,1200,VIIRS,3.5
";
        match load(&[bad_date]) {
            Err(FireSpotsError::Parse(msg)) => assert!(msg.contains("line 3"), "{}", msg),
            other => panic!("unexpected result: {:?}", other),
        }

        let bad_frp = "\
latitude,longitude,acq_date,acq_time,instrument,frp
1.0,2.0,2019-01-01,1200,VIIRS,hot
";
        assert!(matches!(load(&[bad_frp]), Err(FireSpotsError::Parse(_))));

        let bad_instrument = "\
latitude,longitude,acq_date,acq_time,instrument,frp
1.0,2.0,2019-01-01,1200,ABI,3.5
";
        assert!(matches!(
            load(&[bad_instrument]),
            Err(FireSpotsError::Parse(_))
        ));

        let missing_column = "\
latitude,longitude,acq_date,instrument,frp
1.0,2.0,2019-01-01,VIIRS,3.5
";
        assert!(matches!(
            load(&[missing_column]),
            Err(FireSpotsError::Parse(_))
        ));
    }

    #[test]
    fn test_select() {
        let datasets = load(&[MODIS_CSV, MODIS_NRT_CSV]).unwrap();
        let modis = datasets[&Instrument::MODIS].clone();

        let selected = modis.select(&[true, false, true]);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected.records()[1].point.frp, 7.5);
        assert_eq!(selected.headers().len(), 15);
    }

    #[test]
    fn test_from_points() {
        let points = vec![
            FirePoint::new(Instrument::VIIRS, "2018-03-04", 905, 1.0, 2.0, 3.0).unwrap(),
        ];
        let ds = Dataset::from_points(Instrument::VIIRS, points);

        assert_eq!(ds.len(), 1);
        let acq_time = ds.column("acq_time").unwrap();
        assert_eq!(ds.column_values(&acq_time).unwrap(), vec![905.0]);
        assert_eq!(ds.records()[0].field(5), "905");
    }
}
