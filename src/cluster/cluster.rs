use crate::firepoint::FirePoint;

/**
 * A top point and all of its spatiotemporal neighbors.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    /// Sequential id starting at 1, in the order the top points were processed.
    pub group_id: u32,
    /// The highly ranked detection this cluster was built around.
    pub top: FirePoint,
    /// Every detection close to the top point, in dataset order.
    pub neighbors: Vec<FirePoint>,
}

impl Cluster {
    /// Number of points including the top point.
    pub fn num_points(&self) -> usize {
        self.neighbors.len() + 1
    }

    /// Iterate over the members, the top point first, each paired with whether it is the top.
    pub fn rows(&self) -> impl Iterator<Item = (&FirePoint, bool)> {
        std::iter::once((&self.top, true)).chain(self.neighbors.iter().map(|pnt| (pnt, false)))
    }

    /// Total fire radiative power of all the members in megawatts.
    pub fn total_power(&self) -> f64 {
        self.rows().map(|(pnt, _)| pnt.frp).sum()
    }

    /// The distance from the top point to the farthest neighbor.
    pub fn radius_km(&self) -> f64 {
        self.neighbors
            .iter()
            .map(|pnt| self.top.distance_km(pnt))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::instrument::Instrument;

    #[test]
    fn test_rows_top_first() {
        let top = FirePoint::new(Instrument::VIIRS, "2017-09-01", 1500, 0.0, 0.0, 90.0).unwrap();
        let n1 = FirePoint::new(Instrument::VIIRS, "2017-09-01", 1500, 0.0, 0.01, 9.0).unwrap();
        let n2 = FirePoint::new(Instrument::VIIRS, "2017-09-02", 1500, 0.0, 0.02, 1.0).unwrap();

        let cluster = Cluster {
            group_id: 4,
            top,
            neighbors: vec![n1, n2],
        };

        let rows: Vec<_> = cluster.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(cluster.num_points(), 3);
        assert_eq!(rows[0], (&top, true));
        assert_eq!(rows[1], (&n1, false));
        assert_eq!(rows[2], (&n2, false));

        assert_eq!(cluster.total_power(), 100.0);
        assert_eq!(cluster.radius_km(), top.distance_km(&n2));
    }
}
