//! Lectern CLI - digest a long document into chunk analyses, interval
//! summaries, a meta-summary, and one integrated report.

use clap::Parser;
use colored::Colorize;
use lectern_cli::{loader, reporter, Cli, CliError, Config};
use lectern_llm::OpenAiModel;
use lectern_pipeline::{ArtifactStore, Pipeline, PipelineError};
use lectern_report::{ReportIntegrator, TocExtractor};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> lectern_cli::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    if cli.no_color || !config.settings.color {
        colored::control::set_override(false);
    }

    let pipeline_config = cli.pipeline_config(&config);
    // Reject bad parameters before any oracle work starts.
    pipeline_config.validate().map_err(CliError::Config)?;
    let depth = pipeline_config.depth;

    // Provider: flags and environment override the config file; the key
    // has no default.
    let endpoint = cli
        .endpoint
        .clone()
        .unwrap_or_else(|| config.provider.endpoint.clone());
    let model_name = cli
        .model
        .clone()
        .unwrap_or_else(|| config.provider.model.clone());
    let api_key = cli.api_key.clone().ok_or_else(|| {
        CliError::Config("No API key; set LECTERN_API_KEY or pass --api-key".to_string())
    })?;
    let model = Arc::new(
        OpenAiModel::new(endpoint, api_key, model_name)
            .with_timeout(pipeline_config.oracle_timeout()),
    );

    // 1. Load the document.
    let loaded = loader::load(&cli.file)?;
    let stem = loaded.document.stem().to_string();
    eprintln!(
        "{}",
        format!(
            "Loaded {} ({} chars), depth: {}",
            loaded.document.file_name,
            loaded.text.chars().count(),
            depth
        )
        .cyan()
    );

    let output_root = cli
        .output
        .clone()
        .unwrap_or_else(|| config.settings.output_dir.clone())
        .join(&stem);
    let artifacts = ArtifactStore::new(&output_root);
    artifacts.ensure_layout()?;

    // 2. Extract the table of contents before chunking begins.
    eprintln!("{}", "Extracting table of contents...".cyan());
    let toc = TocExtractor::new(Arc::clone(&model))
        .with_timeout(pipeline_config.oracle_timeout())
        .extract(&loaded.text)
        .await?;
    artifacts.write_toc(&toc, &stem)?;
    eprintln!(
        "{}",
        format!("Table of contents extracted ({} entries)", toc.entries.len()).green()
    );

    // 3. Run the pipeline with a progress reporter and a ctrl-c hook that
    // lets in-flight oracle calls finish and persist.
    let pipeline = Pipeline::new(Arc::clone(&model), pipeline_config, artifacts.clone(), &stem)?;

    let shutdown = pipeline.shutdown_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!(
                "{}",
                "Shutdown requested; letting dispatched calls finish...".yellow()
            );
            shutdown.trigger();
        }
    });

    let progress = reporter::spawn(
        pipeline.progress(),
        Duration::from_secs(config.settings.progress_secs.max(1)),
    );
    let result = pipeline.run(&loaded.text, Some(&toc)).await;
    progress.abort();

    let output = match result {
        Ok(output) => output,
        Err(e @ (PipelineError::Oracle(_) | PipelineError::Timeout)) => {
            eprintln!(
                "{}",
                format!(
                    "Meta-summary generation failed; intermediate artifacts remain under {}",
                    output_root.display()
                )
                .yellow()
            );
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let failed = output.snapshot.total_failed();
    if failed > 0 {
        eprintln!(
            "{}",
            format!(
                "Pipeline finished with {} failed units; gaps are marked in the report",
                failed
            )
            .yellow()
        );
    } else {
        eprintln!("{}", "Pipeline finished".green());
    }

    // 4. Integrate the final report from the persisted artifacts.
    eprintln!("{}", "Integrating final report...".cyan());
    let report_path = ReportIntegrator::new(model, artifacts, depth, &stem)
        .integrate()
        .await?;

    eprintln!(
        "{}",
        format!("Report written to {}", report_path.display())
            .green()
            .bold()
    );
    println!("{}", report_path.display());

    Ok(())
}
