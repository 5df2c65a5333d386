use crate::{
    cluster::Cluster,
    dataset::{Column, Dataset},
    instrument::Instrument,
    FireSpotsError, FireSpotsResult,
};
use log::debug;

/// Whether a top point may be listed as one of its own neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfMatch {
    /// The record a cluster was built around is never one of its neighbors.
    Exclude,
    /// The top point's own record is scanned like any other, so with any positive cutoffs it
    /// shows up in its own neighbor list.
    Include,
}

/// Everything that controls how clusters are built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterParams {
    /// Name of the column to rank by, usually "frp".
    pub rank_column: String,
    /// How many of the highest ranked points to build clusters around.
    pub top_n: usize,
    /// Neighbors must be strictly closer than this, kilometers.
    pub distance_cutoff_km: f64,
    /// Neighbors must be strictly closer in time than this, days.
    pub time_cutoff_days: f64,
    pub self_match: SelfMatch,
}

impl Default for ClusterParams {
    fn default() -> Self {
        ClusterParams {
            rank_column: "frp".to_owned(),
            top_n: 100,
            distance_cutoff_km: 10.0,
            time_cutoff_days: 30.0,
            self_match: SelfMatch::Exclude,
        }
    }
}

/**
 * The clusters found in a single instrument's data.
 */
#[derive(Debug, Clone)]
pub struct ClusterList {
    /// The instrument all the points came from.
    pub instrument: Instrument,
    /// Clusters in processing order, so group ids run 1, 2, 3...
    pub clusters: Vec<Cluster>,
}

impl ClusterList {
    /**
     * Find the hotspot clusters in a dataset.
     *
     * The records are sorted (stable) by the ranking column and the last `top_n` are the top
     * points, so among equal values the ones ingested later win. The top points are processed
     * from the lowest ranked to the highest, and for each one the whole dataset is scanned for
     * neighbors. That makes this O(top_n × records) distance calculations, which is fine for the
     * tens of thousands of rows in a year of FIRMS data for a region.
     *
     * #Arguments
     * dataset - the (already filtered) detections.
     * params - ranking column, number of top points, and the neighbor cutoffs.
     */
    pub fn find(dataset: &Dataset, params: &ClusterParams) -> FireSpotsResult<Self> {
        if params.distance_cutoff_km.is_nan() || params.time_cutoff_days.is_nan() {
            return Err(FireSpotsError::Config(
                "distance and time cutoffs must be numbers".to_owned(),
            ));
        }

        let rank_column = dataset.column(&params.rank_column)?;
        debug!(
            "ranking {} {} rows by {}",
            dataset.len(),
            dataset.instrument(),
            rank_column.name()
        );
        let top_indexes = top_n_indexes(dataset, &rank_column, params.top_n)?;

        let records = dataset.records();
        let mut clusters = Vec::with_capacity(top_indexes.len());

        for (group_id, &top_idx) in (1..).zip(top_indexes.iter()) {
            let top = records[top_idx].point;

            let neighbors = records
                .iter()
                .enumerate()
                .filter(|(idx, _)| params.self_match == SelfMatch::Include || *idx != top_idx)
                .map(|(_, rec)| rec.point)
                .filter(|candidate| {
                    top.is_neighbor_of(
                        candidate,
                        params.distance_cutoff_km,
                        params.time_cutoff_days,
                    )
                })
                .collect::<Vec<_>>();

            debug!(
                "group {:03}: {} neighbors around {}",
                group_id,
                neighbors.len(),
                top
            );

            clusters.push(Cluster {
                group_id,
                top,
                neighbors,
            });
        }

        Ok(ClusterList {
            instrument: dataset.instrument(),
            clusters,
        })
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Positions of the `n` highest ranked records, lowest ranked first.
///
/// NaN sorts above every number.
fn top_n_indexes(dataset: &Dataset, column: &Column, n: usize) -> FireSpotsResult<Vec<usize>> {
    let values = dataset.column_values(column)?;

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let start = order.len().saturating_sub(n);
    Ok(order.split_off(start))
}
