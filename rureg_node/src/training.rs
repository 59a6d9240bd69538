//! Background training of the node's model.

use ::std::sync::Arc;

use ::rureg_common::{
    anyhow::anyhow,
    error::{Result, RuregError},
    tracing::info,
};
use ::tokio::task;

use crate::{
    dataset::{fetch_dataset, Dataset},
    model::{fit, LinearModel, ModelCell},
};

/// Fit `dataset` off the async runtime and publish the result into `model`.
/// Connections keep being served while the reduction runs.
pub async fn train(model: Arc<ModelCell>, dataset: Dataset) -> Result<LinearModel> {
    info!("Start training on {} pairs", dataset.len());
    let trained = task::spawn_blocking(move || fit(dataset.x(), dataset.y()))
        .await
        .map_err(|e| RuregError::fail_to_start_server(anyhow!("training task failed: {}", e)))??;
    model.publish(trained)?;
    info!(
        "Training completed: slope {}, intercept {}",
        trained.slope(),
        trained.intercept()
    );
    Ok(trained)
}

/// Fetch the dataset at `url`, then [train] on it.
pub async fn train_from_url(model: Arc<ModelCell>, url: &str) -> Result<LinearModel> {
    let dataset = fetch_dataset(url).await?;
    train(model, dataset).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rureg_common::error::ErrorType;

    #[tokio::test]
    async fn train_publishes_the_model() -> Result<()> {
        let model = Arc::new(ModelCell::new());
        let dataset = Dataset::new(vec![1.0, 2.0, 3.0], vec![5.0, 7.0, 9.0])?;
        let trained = train(Arc::clone(&model), dataset).await?;
        assert_eq!(model.get(), Some(&trained));
        assert_eq!(model.predict(&[10.0])?, vec![23.0]);
        Ok(())
    }

    #[tokio::test]
    async fn degenerate_data_leaves_the_model_untrained() -> Result<()> {
        let model = Arc::new(ModelCell::new());
        let dataset = Dataset::new(vec![4.0, 4.0], vec![1.0, 2.0])?;
        let error = train(Arc::clone(&model), dataset).await.unwrap_err();
        assert_eq!(error.get_error_type(), ErrorType::DegenerateTrainingData);
        assert!(!model.is_trained());
        Ok(())
    }
}
