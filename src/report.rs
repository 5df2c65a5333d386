/*!
 * Writing clusters out.
 *
 * Every destination is a [ClusterSink]. A [Reporter] owns the sinks that are turned on for a run
 * and feeds each cluster to all of them in a single pass, so the text dump, the log file and the
 * CSV file always list the same points in the same order.
 */

use crate::{
    cluster::{Cluster, ClusterList, ClusterParams},
    firepoint::FirePoint,
    instrument::Instrument,
    kml::{KmlFile, PlacemarkStyle},
    FireSpotsError, FireSpotsResult,
};
use chrono::Duration;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::{Path, PathBuf},
};

/// A destination for clusters.
pub trait ClusterSink {
    /// Write one cluster.
    fn write_cluster(&mut self, cluster: &Cluster, params: &ClusterParams) -> FireSpotsResult<()>;

    /// Called once after the last cluster, flush and close anything that's open.
    fn finish(&mut self) -> FireSpotsResult<()> {
        Ok(())
    }
}

/// Feeds clusters to every sink that was added to it.
#[derive(Default)]
pub struct Reporter {
    sinks: Vec<Box<dyn ClusterSink>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn ClusterSink>) {
        self.sinks.push(sink);
    }

    pub fn num_sinks(&self) -> usize {
        self.sinks.len()
    }

    /// Send every cluster, in group order, to each sink.
    pub fn report(&mut self, clusters: &ClusterList, params: &ClusterParams) -> FireSpotsResult<()> {
        for cluster in &clusters.clusters {
            for sink in self.sinks.iter_mut() {
                sink.write_cluster(cluster, params)?;
            }
        }
        Ok(())
    }

    /// Finish all the sinks, files are closed when the reporter is dropped.
    pub fn finish(mut self) -> FireSpotsResult<()> {
        for sink in self.sinks.iter_mut() {
            sink.finish()?;
        }
        Ok(())
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                      Human readable text
 *-----------------------------------------------------------------------------------------------*/

/// The cluster dump used for both standard output and the log file.
///
/// One block per cluster: the top point, the group id, the neighbor count and then one line per
/// neighbor, followed by a blank line.
pub struct TextSink<W: Write> {
    out: W,
}

impl TextSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        TextSink {
            out: std::io::stdout(),
        }
    }
}

impl TextSink<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> FireSpotsResult<Self> {
        let f = File::create(path.as_ref())?;
        Ok(TextSink {
            out: BufWriter::new(f),
        })
    }
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        TextSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ClusterSink for TextSink<W> {
    fn write_cluster(&mut self, cluster: &Cluster, params: &ClusterParams) -> FireSpotsResult<()> {
        writeln!(self.out, "Top point: {}", cluster.top)?;
        writeln!(self.out, "Group: {}", cluster.group_id)?;
        writeln!(
            self.out,
            "Points within distance={} km, time={} days: {}",
            params.distance_cutoff_km,
            params.time_cutoff_days,
            cluster.neighbors.len()
        )?;
        for pnt in &cluster.neighbors {
            writeln!(self.out, "{}", pnt)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn finish(&mut self) -> FireSpotsResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                           CSV files
 *-----------------------------------------------------------------------------------------------*/

/// One row of a cluster CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCsvRow {
    pub frp: f64,
    /// Acquisition date, YYYY-MM-DD.
    pub date: String,
    /// Acquisition time, HH:MM:SS.
    pub time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub instrument: Instrument,
    #[serde(serialize_with = "serialize_flag", deserialize_with = "deserialize_flag")]
    pub is_top_point: bool,
    pub group_id: u32,
}

impl ClusterCsvRow {
    pub fn new(pnt: &FirePoint, is_top_point: bool, group_id: u32) -> Self {
        ClusterCsvRow {
            frp: pnt.frp,
            date: pnt.acquired.format("%Y-%m-%d").to_string(),
            time: pnt.acquired.format("%H:%M:%S").to_string(),
            latitude: pnt.latitude(),
            longitude: pnt.longitude(),
            instrument: pnt.instrument,
            is_top_point,
            group_id,
        }
    }
}

fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "True" } else { "False" })
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let text = String::deserialize(deserializer)?;
    match text.as_str() {
        "True" => Ok(true),
        "False" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected True or False, found '{}'",
            other
        ))),
    }
}

/// All the clusters in a single CSV file, the top point of each group first.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> FireSpotsResult<Self> {
        Ok(CsvSink {
            writer: csv::Writer::from_path(path.as_ref())?,
        })
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        CsvSink {
            writer: csv::Writer::from_writer(out),
        }
    }

    pub fn into_inner(self) -> FireSpotsResult<W> {
        self.writer
            .into_inner()
            .map_err(|err| FireSpotsError::Io(err.into_error()))
    }
}

impl<W: Write> ClusterSink for CsvSink<W> {
    fn write_cluster(&mut self, cluster: &Cluster, _params: &ClusterParams) -> FireSpotsResult<()> {
        write_rows(&mut self.writer, cluster)
    }

    fn finish(&mut self) -> FireSpotsResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn write_rows<W: Write>(writer: &mut csv::Writer<W>, cluster: &Cluster) -> FireSpotsResult<()> {
    for (pnt, is_top) in cluster.rows() {
        writer.serialize(ClusterCsvRow::new(pnt, is_top, cluster.group_id))?;
    }
    Ok(())
}

/// One CSV file per cluster, `{prefix}_firepoints_{group:03}.csv` in a directory.
pub struct GroupCsvSink {
    dir: PathBuf,
    prefix: String,
}

impl GroupCsvSink {
    pub fn new<P: AsRef<Path>>(dir: P, prefix: &str) -> Self {
        GroupCsvSink {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_owned(),
        }
    }

    pub fn group_path(&self, group_id: u32) -> PathBuf {
        self.dir
            .join(format!("{}_firepoints_{:03}.csv", self.prefix, group_id))
    }
}

impl ClusterSink for GroupCsvSink {
    fn write_cluster(&mut self, cluster: &Cluster, _params: &ClusterParams) -> FireSpotsResult<()> {
        let mut writer = csv::Writer::from_path(self.group_path(cluster.group_id))?;
        write_rows(&mut writer, cluster)?;
        writer.flush()?;
        Ok(())
    }
}

/// Read the rows back out of a cluster CSV file.
pub fn read_cluster_csv<R: Read>(rdr: R) -> FireSpotsResult<Vec<ClusterCsvRow>> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = vec![];
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/*-------------------------------------------------------------------------------------------------
 *                                           KML map
 *-----------------------------------------------------------------------------------------------*/

/// How long a detection stays visible when the map is animated.
const KML_DISPLAY_HOURS: i64 = 24;

const TOP_STYLE: PlacemarkStyle = PlacemarkStyle {
    id: "top",
    icon_url: "http://maps.google.com/mapfiles/kml/shapes/firedept.png",
    icon_scale: 1.3,
    fill_color: "ff0000ff",
    outline: true,
};

const NEIGHBOR_STYLE: PlacemarkStyle = PlacemarkStyle {
    id: "neighbor",
    icon_url: "http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png",
    icon_scale: 0.8,
    fill_color: "880088ff",
    outline: false,
};

/// A map of the clusters, one folder per group.
pub struct KmlSink {
    kml: KmlFile,
}

impl KmlSink {
    pub fn create<P: AsRef<Path>>(path: P) -> FireSpotsResult<Self> {
        let mut kml = KmlFile::create(path)?;
        kml.style(&TOP_STYLE)?;
        kml.style(&NEIGHBOR_STYLE)?;

        Ok(KmlSink { kml })
    }
}

impl ClusterSink for KmlSink {
    fn write_cluster(&mut self, cluster: &Cluster, _params: &ClusterParams) -> FireSpotsResult<()> {
        let name = format!("Group {:03}", cluster.group_id);
        let description = format!(
            "Top point: {}<br/>Points: {}<br/>Total power: {:.1} MW<br/>Radius: {:.2} km",
            cluster.top,
            cluster.num_points(),
            cluster.total_power(),
            cluster.radius_km()
        );
        self.kml.start_folder(&name, &description)?;

        let visible_for = Duration::hours(KML_DISPLAY_HOURS);
        for (pnt, is_top) in cluster.rows() {
            let style = if is_top { &TOP_STYLE } else { &NEIGHBOR_STYLE };
            self.kml.fire_placemark(pnt, style.id, visible_for)?;
        }

        self.kml.finish_folder()
    }

    fn finish(&mut self) -> FireSpotsResult<()> {
        self.kml.finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dataset::Dataset;

    fn clusters() -> (ClusterList, ClusterParams) {
        let points = vec![
            FirePoint::new(Instrument::VIIRS, "2017-09-01", 1530, -10.0, -50.0, 12.0).unwrap(),
            FirePoint::new(Instrument::VIIRS, "2017-09-02", 415, -10.01, -50.0, 150.25).unwrap(),
            FirePoint::new(Instrument::VIIRS, "2017-09-03", 1642, -10.02, -50.01, 33.0).unwrap(),
            FirePoint::new(Instrument::VIIRS, "2017-12-25", 1642, -10.02, -50.01, 1.5).unwrap(),
        ];
        let ds = Dataset::from_points(Instrument::VIIRS, points);
        let params = ClusterParams {
            top_n: 2,
            distance_cutoff_km: 10.0,
            time_cutoff_days: 30.0,
            ..ClusterParams::default()
        };
        (ClusterList::find(&ds, &params).unwrap(), params)
    }

    #[test]
    fn test_text_block() {
        let (list, params) = clusters();

        let mut sink = TextSink::new(vec![]);
        for cluster in &list.clusters {
            sink.write_cluster(cluster, &params).unwrap();
        }
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Top point: FirePoint(frp=33.0, date=2017-09-03 16:42:00, coords=10 1' 12'' S 50 0' 36'' W, instrument=VIIRS)"
        );
        assert_eq!(lines[1], "Group: 1");
        assert_eq!(lines[2], "Points within distance=10 km, time=30 days: 2");
        assert!(lines[3].starts_with("FirePoint(frp=12.0"));
        assert!(lines[4].starts_with("FirePoint(frp=150.25"));
        assert_eq!(lines[5], "");
        assert!(lines[6].starts_with("Top point: FirePoint(frp=150.25"));
        assert_eq!(lines[7], "Group: 2");
    }

    #[test]
    fn test_csv_round_trip() {
        let (list, params) = clusters();

        let mut sink = CsvSink::new(vec![]);
        for cluster in &list.clusters {
            sink.write_cluster(cluster, &params).unwrap();
        }
        sink.finish().unwrap();
        let bytes = sink.into_inner().unwrap();

        let text = String::from_utf8(bytes.clone()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "frp,date,time,latitude,longitude,instrument,is_top_point,group_id"
        );
        assert_eq!(
            lines.next().unwrap(),
            "33.0,2017-09-03,16:42:00,-10.02,-50.01,VIIRS,True,1"
        );

        let rows = read_cluster_csv(&bytes[..]).unwrap();
        let expected: Vec<ClusterCsvRow> = list
            .clusters
            .iter()
            .flat_map(|c| c.rows().map(move |(p, top)| ClusterCsvRow::new(p, top, c.group_id)))
            .collect();
        assert_eq!(rows, expected);

        let flags: Vec<(bool, u32)> = rows.iter().map(|r| (r.is_top_point, r.group_id)).collect();
        assert_eq!(
            flags,
            vec![(true, 1), (false, 1), (false, 1), (true, 2), (false, 2), (false, 2)]
        );
    }

    #[test]
    fn test_bad_flag() {
        let text = "frp,date,time,latitude,longitude,instrument,is_top_point,group_id\n\
                    1.0,2017-09-03,16:42:00,-10.0,-50.0,VIIRS,yes,1\n";
        assert!(matches!(
            read_cluster_csv(text.as_bytes()),
            Err(FireSpotsError::Csv(_))
        ));
    }

    #[test]
    fn test_group_files_and_map() {
        let (list, params) = clusters();
        let dir = tempfile::tempdir().unwrap();

        let kml_path = dir.path().join("hotspots.kml");
        let mut reporter = Reporter::new();
        reporter.add_sink(Box::new(GroupCsvSink::new(dir.path(), "VIIRS_2017")));
        reporter.add_sink(Box::new(KmlSink::create(&kml_path).unwrap()));
        assert_eq!(reporter.num_sinks(), 2);

        reporter.report(&list, &params).unwrap();
        reporter.finish().unwrap();

        for group_id in 1..=2 {
            let path = dir
                .path()
                .join(format!("VIIRS_2017_firepoints_{:03}.csv", group_id));
            let rows = read_cluster_csv(File::open(path).unwrap()).unwrap();
            assert_eq!(rows.len(), 3);
            assert!(rows[0].is_top_point);
            assert!(rows.iter().all(|r| r.group_id == group_id));
        }

        let kml = std::fs::read_to_string(kml_path).unwrap();
        assert_eq!(kml.matches("<Folder>").count(), 2);
        assert_eq!(kml.matches("<styleUrl>#top</styleUrl>").count(), 2);
        assert_eq!(kml.matches("<styleUrl>#neighbor</styleUrl>").count(), 4);
        assert!(kml.contains("<begin>2017-09-03T16:42:00Z</begin>"));
        assert!(kml.trim_end().ends_with("</kml>"));
    }
}
