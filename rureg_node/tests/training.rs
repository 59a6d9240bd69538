use ::std::sync::Arc;

use ::httpmock::prelude::*;
use ::rureg_common::error::{ErrorType, Result};
use ::rureg_node::{dataset::fetch_dataset, model::ModelCell, training::train_from_url};

#[tokio::test]
async fn fetch_csv_dataset() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/train.csv");
            then.status(200)
                .header("content-type", "text/csv")
                .body("x,y\n1,5\n2,7\n3,9\n");
        })
        .await;

    let dataset = fetch_dataset(&server.url("/train.csv")).await?;

    mock.assert_async().await;
    assert_eq!(dataset.x(), &[1.0, 2.0, 3.0]);
    assert_eq!(dataset.y(), &[5.0, 7.0, 9.0]);
    Ok(())
}

#[tokio::test]
async fn dataset_not_found() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/train.csv");
            then.status(404);
        })
        .await;

    let error = fetch_dataset(&server.url("/train.csv")).await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(error.get_error_type(), ErrorType::FailToLoadDataset);
}

#[tokio::test]
async fn train_from_remote_dataset() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/train.csv");
            then.status(200).body("x,y\n0,3\n1,5\n2,7\n3,9\n4,11\n");
        })
        .await;
    let model = Arc::new(ModelCell::new());

    train_from_url(Arc::clone(&model), &server.url("/train.csv")).await?;

    assert_eq!(model.predict(&[1.0, 2.0, 3.0])?, vec![5.0, 7.0, 9.0]);
    Ok(())
}

#[tokio::test]
async fn degenerate_remote_dataset_keeps_node_untrained() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/train.csv");
            then.status(200).body("x,y\n2,3\n2,5\n2,7\n");
        })
        .await;
    let model = Arc::new(ModelCell::new());

    let error = train_from_url(Arc::clone(&model), &server.url("/train.csv"))
        .await
        .unwrap_err();

    assert_eq!(error.get_error_type(), ErrorType::DegenerateTrainingData);
    let error = model.predict(&[1.0]).unwrap_err();
    assert_eq!(error.get_error_type(), ErrorType::ModelNotTrained);
}

#[tokio::test]
async fn train_on_large_distinct_x() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/train.csv");
            then.status(200)
                .body("x,y\n1000000,2000003\n1000001,2000005\n1000002,2000007\n");
        })
        .await;
    let model = Arc::new(ModelCell::new());

    train_from_url(Arc::clone(&model), &server.url("/train.csv")).await?;

    assert_eq!(model.predict(&[1000003.0, 0.0])?, vec![2000009.0, 3.0]);
    Ok(())
}
