use std::{env, path::PathBuf};

use anyhow::{bail, Context};
use log::info;

use machine_learning::{
    config::TrainingConfig,
    dataset::{Dataset, IndexedDataset, RowStore, Split, ABALONE_COLUMNS},
    training::{Session, Trainer},
};

fn load_config() -> anyhow::Result<TrainingConfig> {
    let mut config = match env::var("ABALONE_CONFIG") {
        Ok(path) => TrainingConfig::from_file(&path)
            .with_context(|| format!("failed to read configuration from {path}"))?,
        Err(_) => TrainingConfig::default(),
    };

    if let Ok(path) = env::var("ABALONE_DATA") {
        config.data_path = PathBuf::from(path);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = load_config()?;
    info!("{config:?}");

    let store = RowStore::load(
        &config.data_path,
        &ABALONE_COLUMNS,
        config.encoding,
        config.fit_scope(),
    )
    .with_context(|| format!("failed to load {}", config.data_path.display()))?;

    let dataset = IndexedDataset::abalone(&store)?;
    let split = Split::new(dataset.len(), config.train_fraction, config.test_fraction)?;
    let (train, test) = split.subsets(&dataset)?;
    info!(
        "split dataset: {} training rows, {} test rows, {} unused",
        train.len(),
        test.len(),
        split.gap(dataset.len())
    );

    let mut session = Session::from_config(&config, &train, &test)?;
    Trainer::from_config(&config)
        .run(&mut session)
        .context("training failed")?;

    if test.is_empty() {
        bail!("the test partition is empty, nothing to predict");
    }

    let (features, label) = test.get(0)?;
    let prediction = session.predictor().predict(features.view())?;
    println!(
        "features: {features}, predicted: {prediction:.4}, actual: {}",
        label[0]
    );

    Ok(())
}
