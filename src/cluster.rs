/*!
 * Types and functions for working with hotspot clusters.
 *
 * A cluster is one of the most powerful detections in a dataset (the top point) together with
 * every other detection that is close to it in both space and time.
 */

pub use cluster::Cluster;
pub use cluster_list::{ClusterList, ClusterParams, SelfMatch};

mod cluster;
mod cluster_list;
