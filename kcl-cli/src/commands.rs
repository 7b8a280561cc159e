//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use kcl_eval::{
    AnswerGenerator, BaselineMode, EvaluationReport, Evaluator, GenerationSettings, RagAnswerer,
    run_baseline,
};
use kcl_model::CompletionModel;
use kcl_model::openai::{OpenAIClient, OpenAIConfig};
use kcl_rag::openai::OpenAIEmbeddingProvider;
use kcl_rag::{Dataset, Embedder, IndexBuildOutcome, IndexBuilder, RagConfig, Retriever};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::warn;

use crate::settings::{EVAL_OUTPUT_FILE, Settings};

fn embedder(settings: &Settings, config: &RagConfig) -> Result<Embedder> {
    let mut provider = OpenAIEmbeddingProvider::new(settings.api_key()?)?
        .with_model(config.embedding_model.clone());
    if let Some(base_url) = &settings.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(Embedder::new(Arc::new(provider)))
}

fn completion_model(settings: &Settings) -> Result<Arc<dyn CompletionModel>> {
    let api_key = settings.api_key()?;
    let config = match &settings.base_url {
        Some(base_url) => OpenAIConfig::compatible(api_key, base_url.clone()),
        None => OpenAIConfig::new(api_key),
    };
    Ok(Arc::new(OpenAIClient::new(config)?))
}

fn create_out_dir(settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(&settings.out_dir)
        .with_context(|| format!("creating output directory {}", settings.out_dir.display()))
}

fn print_report(label: &str, report: &EvaluationReport, output: &Path) {
    println!(
        "{label} accuracy: {:.4} ({}/{}, {} failed)",
        report.accuracy, report.correct, report.total, report.failed
    );
    println!("saved: {}", output.display());
}

/// Build the question index from the training table.
pub async fn index(settings: &Settings, config: &RagConfig) -> Result<()> {
    let builder = IndexBuilder::new(embedder(settings, config)?, settings.index_paths())
        .with_neighbors(config.build_neighbors);

    match builder.build_from_files(&settings.train_candidates()).await? {
        IndexBuildOutcome::Built { documents, dim } => {
            let out_dir = settings.out_dir.display();
            println!("indexed {documents} documents (dim {dim}) into {out_dir}");
        }
        IndexBuildOutcome::NoTrainingData { reason } => println!("nothing indexed: {reason}"),
    }
    Ok(())
}

/// Run the retrieval pipeline over the test table and write `dev_eval.csv`.
pub async fn evaluate(
    settings: &Settings,
    config: &RagConfig,
    subset: Option<usize>,
) -> Result<()> {
    let retriever = Arc::new(Retriever::new(embedder(settings, config)?, settings.index_paths()));
    let generator =
        AnswerGenerator::new(completion_model(settings)?, GenerationSettings::from(config));

    if config.top_k > 0 {
        // Surface a missing index once instead of as a failure on every row.
        retriever.load().await?;
    }

    let test_path = settings.test_path();
    let dataset = Dataset::load(&test_path)?;
    create_out_dir(settings)?;
    let output = settings.out_dir.join(EVAL_OUTPUT_FILE);

    let answerer = Arc::new(RagAnswerer::new(retriever, generator, config));
    let report = Evaluator::new(answerer, config.concurrency)
        .evaluate_dataset(dataset, subset, &output)
        .await?;

    print_report("RAG", &report, &output);
    Ok(())
}

/// Score a naive baseline on the test table.
pub fn baseline(settings: &Settings, mode: BaselineMode, seed: Option<u64>) -> Result<()> {
    let training = match mode {
        BaselineMode::Majority => {
            let candidates = settings.train_candidates();
            match candidates.iter().find(|p| p.exists()) {
                Some(path) => Dataset::load(path)?.records().to_vec(),
                None => {
                    warn!(
                        data_dir = %settings.data_dir.display(),
                        "no training data for the majority baseline"
                    );
                    Vec::new()
                }
            }
        }
        BaselineMode::Random => Vec::new(),
    };

    let dataset = Dataset::load(settings.test_path())?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = run_baseline(mode, &training, dataset.records(), &mut rng);

    create_out_dir(settings)?;
    let output = settings.out_dir.join(mode.output_file_name());
    dataset.write_with_column(&output, kcl_eval::PREDICTION_COLUMN, &report.raw_outputs())?;

    print_report(&format!("{mode} baseline"), &report, &output);
    Ok(())
}

/// Print the nearest training documents for `text`.
pub async fn query(
    settings: &Settings,
    config: &RagConfig,
    text: &str,
    top_k: usize,
) -> Result<()> {
    let retriever = Retriever::new(embedder(settings, config)?, settings.index_paths());
    let hits = retriever.query(text, top_k).await?;
    if hits.is_empty() {
        warn!(top_k, "no documents retrieved");
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!("[{}] distance {:.4}", rank + 1, hit.distance);
        println!("{}\n", hit.text);
    }
    Ok(())
}
