use course_lens::core::{CatalogSource, Pipeline};
use course_lens::{
    CliConfig, JsonCatalogLoader, LensError, LocalStorage, ScanEngine, ScanPipeline, TomlConfig,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const CATALOG: &str = r#"[
  {"course_code_original": "CS 156", "name": "Learning Systems", "units": "9 units (3-0-6)", "terms": "third term"},
  {"course_code_original": "EC 121 a", "name": "Topics in Economics I"},
  {"course_code_original": "EC 121 b", "name": "Topics in Economics II"},
  {"course_code_original": "Ma 1 a", "name": "Calculus of One and Several Variables"},
  {"course_code_original": "Ma 3", "name": "Introduction to Probability and Statistics"},
  {"originalCode": "APh 23", "name": "Demonstration Lectures in Optics"},
  {"originalCode": "EE 24", "name": "Electrical Engineering Laboratory"}
]"#;

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

fn cli_config(dir: &TempDir, inputs: Vec<String>, formats: &str) -> CliConfig {
    CliConfig {
        catalog: dir.path().join("catalog.json").to_string_lossy().to_string(),
        inputs,
        output_path: dir.path().join("out").to_string_lossy().to_string(),
        formats: formats.split(',').map(str::to_string).collect(),
        concurrency: 2,
        max_range_span: 20,
        no_compound_expansion: false,
        html: false,
        hide_units: false,
        hide_terms: false,
        hide_prerequisites: false,
        show_description: false,
        show_instructors: false,
        verbose: false,
        monitor: false,
        json_logs: false,
    }
}

#[tokio::test]
async fn test_end_to_end_scan_writes_reports() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let catalog_path = write(dir.path(), "catalog.json", CATALOG);
    let syllabus = write(
        dir.path(),
        "syllabus.html",
        "<html><head><style>p { }</style><script>var c = 'CS 156';</script></head>\
         <body><p>Prerequisites: <b>Ma 1 a</b> and CS 156.</p>\
         <p>Core: Ma 1-3, APh/EE 23/24, EC 121 ab.</p></body></html>",
    );
    let notes = write(dir.path(), "notes.txt", "Nothing relevant, just Room 101.\n");

    let config = cli_config(&dir, vec![syllabus.clone(), notes.clone()], "json,csv,text");
    let storage = LocalStorage::default();
    let catalog = JsonCatalogLoader::new(storage.clone(), catalog_path)
        .load_catalog()
        .await?;
    assert_eq!(catalog.len(), 7);

    let pipeline = ScanPipeline::new(storage, config, Arc::new(catalog));
    let engine = ScanEngine::new_with_monitoring(pipeline, false);
    let output = engine.run().await?;

    let out_dir = dir.path().join("out");
    assert_eq!(Path::new(&output), out_dir.as_path());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("course_matches.json"))?)?;
    let documents = json["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["source"], syllabus.as_str());
    assert_eq!(documents[1]["matches"].as_array().unwrap().len(), 0);

    let codes: Vec<&str> = documents[0]["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["course"]["original_code"].as_str().unwrap())
        .collect();
    assert_eq!(
        codes,
        vec!["Ma 1 a", "CS 156", "Ma 1 a", "APh 23", "EE 24", "EC 121 ab"]
    );
    assert_eq!(json["stats"]["ranges"], 1);
    assert_eq!(json["stats"]["synthetic"], 1);

    // 文件內的位置必須指回原文
    let html = std::fs::read_to_string(&syllabus)?;
    for m in documents[0]["matches"].as_array().unwrap() {
        let offset = m["document_offset"].as_u64().unwrap() as usize;
        let length = m["document_length"].as_u64().unwrap() as usize;
        assert_eq!(&html[offset..offset + length], m["text"].as_str().unwrap());
    }

    let csv = std::fs::read_to_string(out_dir.join("course_matches.csv"))?;
    assert_eq!(csv.lines().count(), 7);
    assert!(csv.lines().any(|l| l.contains("9 units (3-0-6)")));

    let text = std::fs::read_to_string(out_dir.join("course_matches.txt"))?;
    assert!(text.contains("Ma 1-3 (range)"));
    assert!(text.contains("    Ma 3: Introduction to Probability and Statistics"));

    Ok(())
}

#[tokio::test]
async fn test_missing_input_fails_with_io_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "catalog.json", CATALOG);
    let missing = dir.path().join("missing.txt").to_string_lossy().to_string();

    let config = cli_config(&dir, vec![missing], "json");
    let pipeline = ScanPipeline::new(LocalStorage::default(), config, Arc::default());
    let result = ScanEngine::new(pipeline).run().await;

    match result {
        Err(e @ LensError::IoError(_)) => {
            assert_eq!(e.severity(), course_lens::utils::error::ErrorSeverity::Critical)
        }
        other => panic!("expected IO error, got {:?}", other),
    }
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_empty_catalog_recognizes_nothing() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let catalog_path = write(dir.path(), "catalog.json", r#"{"not": "a list"}"#);
    let input = write(dir.path(), "notes.txt", "CS 156 and EC 121 ab");

    let storage = LocalStorage::default();
    let catalog = JsonCatalogLoader::new(storage.clone(), catalog_path)
        .load_catalog()
        .await?;
    assert!(catalog.is_empty());

    let pipeline = ScanPipeline::new(storage, cli_config(&dir, vec![input], "json"), Arc::new(catalog));
    let documents = pipeline.extract().await?;
    let report = pipeline.transform(documents).await?;
    assert_eq!(report.stats.validated, 0);
    assert!(report.stats.candidates >= 2);
    Ok(())
}

#[tokio::test]
async fn test_toml_config_drives_pipeline() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let catalog_path = write(dir.path(), "catalog.json", CATALOG);
    let input = write(dir.path(), "page.txt", "<p>APh/EE 23/24</p>");
    let out = dir.path().join("toml-out");

    let toml = format!(
        r#"
[scan]
name = "integration"

[catalog]
path = "{catalog}"

[input]
paths = ["{input}"]
html = true

[options]
expand_compounds = false

[output]
path = "{out}"
formats = ["text"]
"#,
        catalog = catalog_path,
        input = input,
        out = out.to_string_lossy()
    );
    let config = TomlConfig::from_toml_str(&toml)?;

    let storage = LocalStorage::default();
    let catalog = JsonCatalogLoader::new(storage.clone(), catalog_path)
        .load_catalog()
        .await?;
    let pipeline = ScanPipeline::new(storage, config, Arc::new(catalog));
    let documents = pipeline.extract().await?;
    let report = pipeline.transform(documents).await?;

    // 不展開時 "APh/EE 23/24" 整段查不到
    assert_eq!(report.documents[0].text_units, 1);
    assert_eq!(report.stats.validated, 0);

    pipeline.load(report).await?;
    assert!(out.join("course_matches.txt").exists());
    assert!(!out.join("course_matches.json").exists());
    Ok(())
}
