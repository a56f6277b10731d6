//! Title rating derived from review scores.

/// Convert the SQL `AVG(score)` of a title's reviews into its public rating.
///
/// The average is truncated toward zero. `None` (no reviews) stays `None`.
pub fn rating_from_average(average: Option<f64>) -> Option<i32> {
    average.map(|avg| avg.trunc() as i32)
}
