//! Shannon entropy over file-extension frequencies.

use crate::domain::FileExtensionHistogram;

/// Calculates the Shannon entropy of an extension histogram.
///
/// Returns the entropy in bits. An empty histogram yields `0.0`.
pub fn shannon_entropy(histogram: &FileExtensionHistogram) -> f64 {
    entropy_of_counts(histogram.iter().map(|(_, count)| count))
}

/// Calculates the Shannon entropy of a categorical distribution given as raw counts.
///
/// Zero counts contribute nothing; a zero total yields `0.0`.
pub fn entropy_of_counts<I>(counts: I) -> f64
where
    I: IntoIterator<Item = usize>,
    I::IntoIter: Clone,
{
    let counts = counts.into_iter();
    let total: usize = counts.clone().sum();
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    let mut entropy = 0.0;
    for count in counts {
        if count > 0 {
            let p = count as f64 / total;
            entropy -= p * p.log2();
        }
    }

    // -0.0 when a single category holds all the mass
    entropy.max(0.0)
}
