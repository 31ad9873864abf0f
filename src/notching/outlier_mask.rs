/// Samples excluded by notching, aligned with the input sample set.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierMask {
    excluded: Vec<bool>,
    notched_coordinates: Vec<f64>,
}

impl OutlierMask {
    pub(crate) fn new(excluded: Vec<bool>, mut notched_coordinates: Vec<f64>) -> Self {
        notched_coordinates.sort_by(f64::total_cmp);
        notched_coordinates.dedup();
        Self {
            excluded,
            notched_coordinates,
        }
    }

    /// One flag per sample, `true` when the sample is excluded.
    pub fn as_slice(&self) -> &[bool] {
        &self.excluded
    }

    pub fn is_excluded(&self, index: usize) -> bool {
        self.excluded.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.iter().filter(|&&e| e).count()
    }

    pub fn kept_count(&self) -> usize {
        self.len() - self.excluded_count()
    }

    /// Coordinates flagged as contaminated, sorted and deduplicated.
    ///
    /// Samples near these coordinates may be excluded too, depending on the
    /// notch window width.
    pub fn notched_coordinates(&self) -> &[f64] {
        &self.notched_coordinates
    }

    /// The kept samples, in their original order.
    pub fn apply(&self, samples: &[f64]) -> Vec<f64> {
        samples
            .iter()
            .zip(&self.excluded)
            .filter(|&(_, &e)| !e)
            .map(|(&v, _)| v)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_keeps_order_of_unmasked_samples() {
        let mask = OutlierMask::new(vec![false, true, false, true], vec![2.0, 1.0, 2.0]);
        assert_eq!(mask.apply(&[1.0, 2.0, 3.0, 4.0]), vec![1.0, 3.0]);
        assert_eq!(mask.excluded_count(), 2);
        assert_eq!(mask.kept_count(), 2);
        assert_eq!(mask.notched_coordinates(), &[1.0, 2.0]);
        assert!(mask.is_excluded(1));
        assert!(!mask.is_excluded(10));
    }
}
