//! CLI route table: compute, show and config against a temporary workspace.

use mrd::cli::{Commands, OutputFormat, RunContext};
use mrd::config::MrdConfig;
use mrd::error::MrdError;
use std::path::Path;
use tempfile::TempDir;

const JOB: &str = r#"{
    "num_sites": 2,
    "imt1": "PGA",
    "imt2": "SA(1.0)",
    "imtls": {
        "PGA": [0.01, 0.02, 0.05, 0.1, 0.2, 0.5],
        "SA(1.0)": [0.01, 0.02, 0.05, 0.1, 0.2, 0.5]
    },
    "groups": [
        { "grp_id": 0, "gidx": [0, 1], "gsims": ["GsimA", "GsimB"], "contexts": [
            { "sid": 0, "rate": 0.01, "gmv": [
                { "mean": [-2.5, -3.0], "sigma": [0.6, 0.7] },
                { "mean": [-2.2, -2.8], "sigma": [0.5, 0.6] }
            ] },
            { "sid": 1, "rate": 0.02, "gmv": [
                { "mean": [-3.0, -3.4], "sigma": [0.6, 0.7] },
                { "mean": [-2.9, -3.1], "sigma": [0.5, 0.6] }
            ] },
            { "sid": 1, "rate": 0.005, "gmv": [
                { "mean": [-1.5, -2.0], "sigma": [0.6, 0.7] },
                { "mean": [-1.4, -1.9], "sigma": [0.5, 0.6] }
            ] }
        ] }
    ],
    "weights": {
        "rlzs_by_g": { "0": [0], "1": [1] },
        "weights": { "0": 0.6, "1": 0.4 }
    }
}"#;

fn context(workspace: &Path) -> RunContext {
    RunContext::with_config(workspace.to_path_buf(), MrdConfig::default())
}

fn compute(ctx: &RunContext, job: &Path, concurrent_tasks: usize) -> Result<String, MrdError> {
    ctx.execute(&Commands::Compute {
        job: job.to_path_buf(),
        imt1: None,
        imt2: None,
        cross_correlation: None,
        concurrent_tasks: Some(concurrent_tasks),
        store: None,
    })
}

#[test]
fn compute_then_show() {
    let workspace = TempDir::new().unwrap();
    let job = workspace.path().join("job.json");
    std::fs::write(&job, JOB).unwrap();
    let ctx = context(workspace.path());

    let summary = compute(&ctx, &job, 2).unwrap();
    assert!(summary.contains("(5, 5, 2)"));
    assert!(workspace.path().join(".mrd/store").exists());

    let json = ctx
        .execute(&Commands::Show {
            store: None,
            name: "mrd".to_string(),
            format: OutputFormat::Json,
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["shape"], serde_json::json!([5, 5, 2]));
    let totals = value["site_totals"].as_array().unwrap();
    assert_eq!(totals.len(), 2);
    assert!(totals.iter().all(|t| t.as_f64().unwrap() > 0.0));

    let text = ctx
        .execute(&Commands::Show {
            store: None,
            name: "mrd".to_string(),
            format: OutputFormat::Text,
        })
        .unwrap();
    assert!(text.contains("Total rate"));
}

#[test]
fn compute_rejects_too_many_sites() {
    let workspace = TempDir::new().unwrap();
    let job = workspace.path().join("job.json");
    std::fs::write(&job, JOB.replace("\"num_sites\": 2", "\"num_sites\": 12")).unwrap();

    let err = compute(&context(workspace.path()), &job, 2).unwrap_err();
    assert!(matches!(err, MrdError::TooManySites { sites: 12, .. }));
    assert!(mrd::cli::map_error(&err).contains("max_sites"));
}

#[test]
fn show_unknown_dataset() {
    let workspace = TempDir::new().unwrap();
    let job = workspace.path().join("job.json");
    std::fs::write(&job, JOB).unwrap();
    let ctx = context(workspace.path());
    compute(&ctx, &job, 1).unwrap();

    let err = ctx
        .execute(&Commands::Show {
            store: None,
            name: "hcurves".to_string(),
            format: OutputFormat::Text,
        })
        .unwrap_err();
    assert!(err.to_string().contains("hcurves"));
}
