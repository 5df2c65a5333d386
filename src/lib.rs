//! Find hotspot clusters in NASA FIRMS active fire archives.
//!
//! The most powerful fire detections (by fire radiative power unless told otherwise) are each
//! paired with every other detection close to them in both space and time.

pub use cluster::{Cluster, ClusterList, ClusterParams, SelfMatch};
pub use dataset::{load_csv, load_datasets, load_zip_archive, Column, Dataset, FireRecord};
pub use error::{FireSpotsError, FireSpotsResult};
pub use filter::{percentile, FilterMode, PercentileFilter, ValueFilter};
pub use firepoint::{acquisition_datetime, FirePoint, UtcTime};
pub use geo::{great_circle_distance, Coord, EARTH_RADIUS_KM};
pub use instrument::Instrument;
pub use kml::{KmlFile, KmlWriter, PlacemarkStyle};
pub use pipeline::{filter_dataset, report_clusters, run};
pub use report::{
    read_cluster_csv, ClusterCsvRow, ClusterSink, CsvSink, GroupCsvSink, KmlSink, Reporter,
    TextSink,
};
pub use settings::{AnalysisOptions, AnalysisSettings, OutputSettings};
pub use timefields::{TimeFields, DERIVED_COLUMNS};

/**************************************************************************************************
 * Private Implementation
 *************************************************************************************************/
mod cluster;
mod dataset;
mod error;
mod filter;
mod firepoint;
mod geo;
mod instrument;
mod kml;
mod pipeline;
mod report;
mod settings;
mod timefields;
