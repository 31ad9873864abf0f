/// Samples grouped by their (exactly equal) coordinate.
///
/// Bins are sorted by coordinate and each one records the slice of
/// `order` holding the indices of its samples.
#[derive(Debug, Clone)]
pub(crate) struct CoordinateBins {
    coordinates: Vec<f64>,
    maxima: Vec<f64>,
    starts: Vec<usize>,
    order: Vec<usize>,
}

impl CoordinateBins {
    pub(crate) fn build(samples: &[f64], coordinates: &[f64]) -> Self {
        let mut order: Vec<usize> = (0..samples.len()).collect();
        order.sort_by(|&a, &b| coordinates[a].total_cmp(&coordinates[b]));

        let mut bins = Self {
            coordinates: Vec::new(),
            maxima: Vec::new(),
            starts: Vec::new(),
            order,
        };
        for (pos, &i) in bins.order.iter().enumerate() {
            let c = coordinates[i];
            if let (Some(&last), Some(m)) = (bins.coordinates.last(), bins.maxima.last_mut()) {
                if last == c {
                    *m = m.max(samples[i]);
                    continue;
                }
            }
            bins.coordinates.push(c);
            bins.maxima.push(samples[i]);
            bins.starts.push(pos);
        }
        bins.starts.push(bins.order.len());
        bins
    }

    pub(crate) fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub(crate) fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// Loudest sample of every bin.
    pub(crate) fn maxima(&self) -> &[f64] {
        &self.maxima
    }

    /// Sample indices belonging to bins `first..=last`.
    pub(crate) fn members(&self, first: usize, last: usize) -> &[usize] {
        &self.order[self.starts[first]..self.starts[last + 1]]
    }

    /// Inclusive bin range whose coordinates lie within `radius` of bin `b`.
    pub(crate) fn neighborhood(&self, b: usize, radius: f64) -> (usize, usize) {
        let c = self.coordinates[b];
        let first = self.coordinates.partition_point(|&x| x < c - radius);
        let last = self.coordinates.partition_point(|&x| x <= c + radius) - 1;
        (first, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_unsorted_coordinates() {
        let samples = [1.0, 7.0, 3.0, 2.0, 9.0];
        let coords = [2.0, 0.0, 2.0, 0.0, 1.0];
        let bins = CoordinateBins::build(&samples, &coords);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.coordinates(), &[0.0, 1.0, 2.0]);
        assert_eq!(bins.maxima(), &[7.0, 9.0, 3.0]);

        let mut first: Vec<usize> = bins.members(0, 0).to_vec();
        first.sort();
        assert_eq!(first, vec![1, 3]);
        assert_eq!(bins.members(0, 2).len(), 5);
    }

    #[test]
    fn neighborhood_is_inclusive() {
        let samples = [0.0; 6];
        let coords = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let bins = CoordinateBins::build(&samples, &coords);
        assert_eq!(bins.neighborhood(2, 1.0), (1, 3));
        assert_eq!(bins.neighborhood(0, 2.5), (0, 2));
        assert_eq!(bins.neighborhood(5, 0.0), (5, 5));
    }
}
