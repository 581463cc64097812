// Command-line diagnosis
//
// Purpose: run one CF consultation against the knowledge base
// Usage:   diagnose [--json] [--list] G19=0.8 G20=1.0 ...
//
// Codes are case-sensitive and passed through as typed.
//
// KB_PATH and CF_OUTPUT select the knowledge base file and report format,
// RUST_LOG overrides the log filter.

use anyhow::{bail, Context};
use nutrient_cf_rust::config::DEFAULT_LOG_FILTER;
use nutrient_cf_rust::{
    DiagnosisEngine, EngineConfig, JsonFormatter, MarkdownFormatter, OutputFormat, RawConfidence,
    ReportGenerator,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the report on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = EngineConfig::from_env().context("Invalid configuration")?;
    let mut list_symptoms = false;
    let mut observations: Vec<(String, RawConfidence)> = Vec::new();

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => config.output = OutputFormat::Json,
            "--markdown" => config.output = OutputFormat::Markdown,
            "--list" => list_symptoms = true,
            _ => observations.push(parse_observation(&arg)?),
        }
    }

    tracing::info!("Configuration:");
    tracing::info!("  KB_PATH: {}", config.kb_path.display());
    tracing::info!("  CF_OUTPUT: {:?}", config.output);

    let store = config.open_store();
    let engine = DiagnosisEngine::from_store(&store).with_context(|| {
        format!(
            "Failed to load knowledge base from {}",
            config.kb_path.display()
        )
    })?;

    if list_symptoms {
        for group in engine.knowledge_base().symptoms_by_category() {
            println!("{}:", group.category);
            for symptom in group.symptoms {
                println!("  {}  {}", symptom.code, symptom.name);
            }
        }
        return Ok(());
    }

    let diagnosis = engine
        .calculate_cf_with_details(observations)
        .context("Inference failed")?;
    let report = ReportGenerator::generate(engine.knowledge_base(), &diagnosis);

    match config.output {
        OutputFormat::Markdown => print!("{}", MarkdownFormatter::format(&report)),
        OutputFormat::Json => println!(
            "{}",
            JsonFormatter::format(&report).context("Failed to serialize report")?
        ),
    }

    Ok(())
}

/// `CODE=value`; the value stays raw text so normalization can report it
fn parse_observation(arg: &str) -> anyhow::Result<(String, RawConfidence)> {
    let Some((code, value)) = arg.split_once('=') else {
        bail!("Expected CODE=value, got '{}'", arg);
    };
    let code = code.trim();
    if code.is_empty() {
        bail!("Missing symptom code in '{}'", arg);
    }
    Ok((code.to_string(), RawConfidence::from(value.trim())))
}
