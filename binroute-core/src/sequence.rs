//! Greedy nearest-neighbour tour construction.

use crate::model::Located;

#[derive(Debug, Clone, Copy, Default)]
/// Builds an initial visiting order by always stepping to the closest unvisited stop.
pub struct RouteSequencer;

impl RouteSequencer {
    /// Order `stops`, starting from the first element.
    ///
    /// Returns an open path; closing it back to the start is the caller's job. Ties
    /// go to the stop that appears first among the remaining ones.
    #[must_use]
    pub fn sequence<T: Located + Clone>(&self, stops: &[T]) -> Vec<T> {
        let Some((start, rest)) = stops.split_first() else {
            return Vec::new();
        };

        let mut path = Vec::with_capacity(stops.len());
        path.push(start.clone());

        let mut unvisited = rest.to_vec();
        let mut current = start.location();

        while !unvisited.is_empty() {
            let mut nearest_idx = 0;
            let mut nearest_distance = f64::INFINITY;
            for (idx, candidate) in unvisited.iter().enumerate() {
                let distance = current.euclidean_to(&candidate.location());
                if distance < nearest_distance {
                    nearest_distance = distance;
                    nearest_idx = idx;
                }
            }

            // order-preserving removal keeps the tie-break stable
            let next = unvisited.remove(nearest_idx);
            current = next.location();
            path.push(next);
        }

        path
    }
}
