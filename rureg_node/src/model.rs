//! Univariate linear regression fitted by ordinary least squares.

use ::std::{ops::Add, sync::OnceLock};

use ::rayon::prelude::*;
use ::rureg_common::{
    anyhow::anyhow,
    error::{Result, RuregError},
};

/// Predictions are rounded to this many decimal places.
const DECIMALS: i32 = 6;

/// Sum statistics of a shard of the training pairs.
/// Shards are combined with `+` in any order.
///
/// The sums are taken over `x - origin_x` and `y - origin_y`, so large but
/// close values do not cancel out in `nΣx² − (Σx)²`. `min_x` and `max_x` are
/// the raw extremes of the shard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialSum {
    pub count: usize,
    pub sum_x: f64,
    pub sum_y: f64,
    pub sum_xy: f64,
    pub sum_x_square: f64,
    pub min_x: f64,
    pub max_x: f64,
}

impl Default for PartialSum {
    fn default() -> Self {
        Self {
            count: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            sum_xy: 0.0,
            sum_x_square: 0.0,
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
        }
    }
}

impl PartialSum {
    /// Accumulate the statistics of one shard sequentially, around the origin `(0, 0)`.
    pub fn of(x: &[f64], y: &[f64]) -> Self {
        Self::around(x, y, 0.0, 0.0)
    }

    /// Accumulate the statistics of one shard around `(origin_x, origin_y)`.
    pub fn around(x: &[f64], y: &[f64], origin_x: f64, origin_y: f64) -> Self {
        x.iter().zip(y).fold(Self::default(), |acc, (&x, &y)| {
            acc + Self::pair(x, x - origin_x, y - origin_y)
        })
    }

    fn pair(raw_x: f64, x: f64, y: f64) -> Self {
        Self {
            count: 1,
            sum_x: x,
            sum_y: y,
            sum_xy: x * y,
            sum_x_square: x * x,
            min_x: raw_x,
            max_x: raw_x,
        }
    }
}

impl Add for PartialSum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            count: self.count + rhs.count,
            sum_x: self.sum_x + rhs.sum_x,
            sum_y: self.sum_y + rhs.sum_y,
            sum_xy: self.sum_xy + rhs.sum_xy,
            sum_x_square: self.sum_x_square + rhs.sum_x_square,
            min_x: self.min_x.min(rhs.min_x),
            max_x: self.max_x.max(rhs.max_x),
        }
    }
}

/// A trained model. It has no mutable state, so it can be read from any
/// number of connections once published through a [ModelCell].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    slope: f64,
    intercept: f64,
}

impl LinearModel {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Closed form least squares solution from sums taken around the origin `(0, 0)`.
    pub fn from_sums(sums: &PartialSum) -> Result<Self> {
        Self::from_sums_around(sums, 0.0, 0.0)
    }

    /// Closed form least squares solution from sums taken around `(origin_x, origin_y)`.
    pub fn from_sums_around(sums: &PartialSum, origin_x: f64, origin_y: f64) -> Result<Self> {
        if sums.count == 0 {
            return Err(RuregError::degenerate_training_data(anyhow!(
                "no training pairs"
            )));
        }
        if sums.min_x == sums.max_x {
            return Err(RuregError::degenerate_training_data(anyhow!(
                "all {} x values are identical, the slope is undefined",
                sums.count
            )));
        }
        let n = sums.count as f64;
        let denominator = n * sums.sum_x_square - sums.sum_x * sums.sum_x;
        if denominator <= 0.0 {
            return Err(RuregError::degenerate_training_data(anyhow!(
                "x values between {} and {} are too close to fit a slope",
                sums.min_x,
                sums.max_x
            )));
        }
        let slope = (n * sums.sum_xy - sums.sum_x * sums.sum_y) / denominator;
        let intercept = origin_y + sums.sum_y / n - slope * (origin_x + sums.sum_x / n);
        if !slope.is_finite() || !intercept.is_finite() {
            return Err(RuregError::degenerate_training_data(anyhow!(
                "fitted parameters are not finite: slope {}, intercept {}",
                slope,
                intercept
            )));
        }
        Ok(Self::new(slope, intercept))
    }

    /// `round(slope * x + intercept)` to [DECIMALS] places, one output per input.
    pub fn predict(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .map(|&x| round(self.slope * x + self.intercept))
            .collect()
    }
}

/// Values too large to scale have no digits below [DECIMALS] and are returned as is.
fn round(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS);
    let scaled = value * scale;
    if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value
    }
}

/// Fit `y = slope * x + intercept`.
/// The pairs are split into one shard per rayon worker, each shard is summed
/// independently around the first pair and the partial sums are added together.
pub fn fit(x: &[f64], y: &[f64]) -> Result<LinearModel> {
    if x.len() != y.len() {
        return Err(RuregError::fail_to_load_dataset(anyhow!(
            "x has {} values but y has {}",
            x.len(),
            y.len()
        )));
    }
    let (origin_x, origin_y) = x.first().copied().zip(y.first().copied()).unwrap_or_default();
    let shard_size = x.len().div_ceil(rayon::current_num_threads()).max(1);
    let sums = x
        .par_chunks(shard_size)
        .zip(y.par_chunks(shard_size))
        .map(|(xs, ys)| PartialSum::around(xs, ys, origin_x, origin_y))
        .reduce(PartialSum::default, |left, right| left + right);
    LinearModel::from_sums_around(&sums, origin_x, origin_y)
}

/// One-shot publication point of the trained model.
/// Readers see either nothing or the complete [LinearModel], never a model in training.
#[derive(Debug, Default)]
pub struct ModelCell {
    model: OnceLock<LinearModel>,
}

impl ModelCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the trained model. A model is never replaced once published.
    pub fn publish(&self, model: LinearModel) -> Result<()> {
        self.model.set(model).map_err(|rejected| {
            RuregError::model_already_trained(anyhow!(
                "model already published, refusing slope {} intercept {}",
                rejected.slope,
                rejected.intercept
            ))
        })
    }

    pub fn get(&self) -> Option<&LinearModel> {
        self.model.get()
    }

    pub fn is_trained(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn predict(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.model
            .get()
            .map(|model| model.predict(x))
            .ok_or_else(|| {
                RuregError::model_not_trained(anyhow!(
                    "the model must be trained at least once before predicting"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rureg_common::{codec::Frame, error::ErrorType};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {} but got {}",
            expected,
            actual
        );
    }

    #[test]
    fn fit_perfect_line() -> Result<()> {
        let x: Vec<f64> = (0..1000).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|x| 2.0 * x + 3.0).collect();
        let model = fit(&x, &y)?;
        assert_close(model.slope(), 2.0);
        assert_close(model.intercept(), 3.0);
        Ok(())
    }

    #[test]
    fn fit_two_points() -> Result<()> {
        let model = fit(&[1.0, 2.0], &[5.0, 7.0])?;
        assert_close(model.slope(), 2.0);
        assert_close(model.intercept(), 3.0);
        Ok(())
    }

    #[test]
    fn fit_negative_slope() -> Result<()> {
        let x = [-3.0, -1.0, 0.0, 4.0, 10.0];
        let y: Vec<f64> = x.iter().map(|x| -0.5 * x + 1.25).collect();
        let model = fit(&x, &y)?;
        assert_close(model.slope(), -0.5);
        assert_close(model.intercept(), 1.25);
        Ok(())
    }

    #[test]
    fn identical_x_is_degenerate() {
        let error = fit(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(error.get_error_type(), ErrorType::DegenerateTrainingData);

        let x = vec![0.1; 10];
        let y: Vec<f64> = (0..10).map(f64::from).collect();
        let error = fit(&x, &y).unwrap_err();
        assert_eq!(error.get_error_type(), ErrorType::DegenerateTrainingData);
    }

    #[test]
    fn fit_large_distinct_x() -> Result<()> {
        let x = [1e6, 1e6 + 1.0, 1e6 + 2.0];
        let y: Vec<f64> = x.iter().map(|x| 2.0 * x + 3.0).collect();
        let model = fit(&x, &y)?;
        assert_close(model.slope(), 2.0);
        assert_close(model.intercept(), 3.0);

        let x: Vec<f64> = (0..100).map(|i| 1e9 + f64::from(i)).collect();
        let y: Vec<f64> = x.iter().map(|x| 2.0 * x + 3.0).collect();
        let model = fit(&x, &y)?;
        assert_close(model.slope(), 2.0);
        assert!((model.intercept() - 3.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn identical_large_x_is_degenerate() {
        let error = fit(&[1e9, 1e9, 1e9], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(error.get_error_type(), ErrorType::DegenerateTrainingData);
        assert!(error.message().starts_with("all 3 x values are identical"));
    }

    #[test]
    fn single_pair_is_degenerate() {
        let error = fit(&[1.0], &[2.0]).unwrap_err();
        assert_eq!(error.get_error_type(), ErrorType::DegenerateTrainingData);
    }

    #[test]
    fn empty_dataset_is_degenerate() {
        let error = fit(&[], &[]).unwrap_err();
        assert_eq!(error.get_error_type(), ErrorType::DegenerateTrainingData);
    }

    #[test]
    fn length_mismatch() {
        let error = fit(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(error.get_error_type(), ErrorType::FailToLoadDataset);
    }

    #[test]
    fn shards_combine_in_any_order() {
        let x: Vec<f64> = (0..97).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|x| x * x - 4.0).collect();
        let whole = PartialSum::of(&x, &y);
        let left = PartialSum::of(&x[..40], &y[..40]);
        let middle = PartialSum::of(&x[40..71], &y[40..71]);
        let right = PartialSum::of(&x[71..], &y[71..]);
        assert_eq!(left + middle + right, whole);
        assert_eq!(right + (left + middle), whole);
        assert_eq!(whole.count, 97);
    }

    #[test]
    fn parallel_fit_matches_sequential_sums() -> Result<()> {
        let x: Vec<f64> = (0..10_000).map(|i| (i % 113) as f64).collect();
        let y: Vec<f64> = x.iter().map(|x| 0.75 * x - 12.0).collect();
        let parallel = fit(&x, &y)?;
        let sequential = LinearModel::from_sums(&PartialSum::of(&x, &y))?;
        assert_close(parallel.slope(), sequential.slope());
        assert_close(parallel.intercept(), sequential.intercept());
        Ok(())
    }

    #[test]
    fn predict_rounds_the_whole_expression() {
        let model = LinearModel::new(2.0, 3.0);
        assert_eq!(model.predict(&[1.0, 2.0, 3.0]), vec![5.0, 7.0, 9.0]);

        let model = LinearModel::new(1.0 / 3.0, 0.1);
        assert_eq!(model.predict(&[1.0]), vec![0.433333]);
        assert_eq!(model.predict(&[]), Vec::<f64>::new());
    }

    #[test]
    fn predict_huge_values_stays_finite() -> Result<()> {
        let model = LinearModel::new(2.0, 3.0);
        let predictions = model.predict(&[1e303, -1e303]);
        assert_eq!(predictions, vec![2e303, -2e303]);

        let cell = ModelCell::new();
        cell.publish(model)?;
        let frame = Frame::from(cell.predict(&[1e303]));
        assert_eq!(frame, Frame::Ok(vec![2e303]));
        assert!(frame.encode().is_ok());
        Ok(())
    }

    #[test]
    fn predict_before_publish() {
        let cell = ModelCell::new();
        assert!(!cell.is_trained());
        let error = cell.predict(&[1.0, 2.0]).unwrap_err();
        assert_eq!(error.get_error_type(), ErrorType::ModelNotTrained);
    }

    #[test]
    fn predict_after_publish() -> Result<()> {
        let cell = ModelCell::new();
        cell.publish(LinearModel::new(2.0, 3.0))?;
        assert!(cell.is_trained());
        assert_eq!(cell.predict(&[1.0, 2.0, 3.0])?, vec![5.0, 7.0, 9.0]);
        assert_eq!(cell.predict(&[1.0, 2.0, 3.0])?, vec![5.0, 7.0, 9.0]);
        Ok(())
    }

    #[test]
    fn model_is_published_once() -> Result<()> {
        let cell = ModelCell::new();
        cell.publish(LinearModel::new(2.0, 3.0))?;
        let error = cell.publish(LinearModel::new(5.0, 0.0)).unwrap_err();
        assert_eq!(error.get_error_type(), ErrorType::ModelAlreadyTrained);
        assert_eq!(cell.get(), Some(&LinearModel::new(2.0, 3.0)));
        Ok(())
    }

    #[test]
    fn concurrent_readers_see_a_consistent_model() {
        let cell = ModelCell::new();
        std::thread::scope(|scope| {
            let readers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..1000)
                            .filter_map(|_| cell.predict(&[10.0]).ok())
                            .all(|prediction| prediction == vec![23.0])
                    })
                })
                .collect();
            cell.publish(LinearModel::new(2.0, 3.0))
                .expect("first publish succeeds");
            for reader in readers {
                assert!(reader.join().expect("reader does not panic"));
            }
        });
    }
}
