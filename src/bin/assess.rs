//! Minimal CLI runner: reads an `AssessmentRequest` JSON file, wires the
//! deterministic demo collaborators plus a [`assessor::inference::LocalInferenceModel`],
//! runs one assessment, and writes the resulting `AssessmentResult` as pretty
//! JSON to stdout or `--out <path>`.

use std::{env, fs, sync::Arc};

use assessor::config::{AssessmentConfig, EquivalentsConfig, ModelConfig};
use assessor::contracts::{TracingLogger, TracingMetrics};
use assessor::doubles::{
    StubEquivalentsModel, StubMoleculeValidator, StubNlpParser, StubPropertyPredictor, StubSmartsMatcher,
    StubStructureAnalyzer, TemplateExplanationGenerator,
};
use assessor::inference::LocalInferenceModel;
use assessor::{AssessmentRequest, Assessor};

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn parse_bool(s: &str) -> bool {
    matches!(s, "1" | "true" | "True" | "TRUE" | "yes" | "y")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "assess=info".into()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();

    let input_path = parse_flag(&args, "--in")
        .ok_or_else(|| anyhow::anyhow!("missing required flag --in <request.json>"))?;
    let out_path = parse_flag(&args, "--out");
    let strict = parse_flag(&args, "--strict").map(|s| parse_bool(&s)).unwrap_or(false);

    let request_bytes = fs::read(&input_path)
        .map_err(|e| anyhow::anyhow!("read {}: {e}", input_path))?;
    let request: AssessmentRequest =
        serde_json::from_slice(&request_bytes).map_err(|e| anyhow::anyhow!("parse request JSON: {e}"))?;

    let mut model_config = ModelConfig::default();
    model_config.strict_aggregation = strict;

    let assessor = Assessor::new(
        Arc::new(StubNlpParser),
        Arc::new(StubStructureAnalyzer),
        Arc::new(LocalInferenceModel::new(
            Arc::new(StubMoleculeValidator),
            Arc::new(StubSmartsMatcher),
            Arc::new(StubPropertyPredictor),
            model_config.clone(),
        )),
        Arc::new(StubEquivalentsModel),
        Arc::new(TracingLogger),
        Arc::new(TracingMetrics),
        AssessmentConfig::default(),
        model_config,
        EquivalentsConfig::default(),
    )
    .with_explainer(Arc::new(TemplateExplanationGenerator));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(assessor.assess(request))?;

    let rendered = serde_json::to_string_pretty(&result)?;
    match out_path {
        Some(path) => {
            fs::write(&path, rendered)?;
            eprintln!("wrote result to {path}");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
