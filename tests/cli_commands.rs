use clap::Parser;
use predexport::{
    PredictionBatch,
    adapters::JsonlBatchSource,
    cli::commands::export::{ExportArgs, execute, export_from},
};
use tempfile::tempdir;

fn parse_args<I, T>(args: I) -> ExportArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    ExportArgs::parse_from(args)
}

#[test]
fn export_command_writes_multiclass_file_from_jsonl() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("val.jsonl");
    std::fs::write(
        &input,
        concat!(
            r#"{"id": [1, 2], "y": [[2], [0]], "yhat": [[0.1, 0.2, 0.7], [0.8, 0.1, 0.1]], "loss": 0.3}"#,
            "\n",
            r#"{"id": [3], "y": [[1]], "yhat": [[0.3, 0.4, 0.3]], "loss": 0.6}"#,
            "\n",
        ),
    )
    .unwrap();

    let args = parse_args([
        "predexport-export",
        "--input",
        input.to_str().unwrap(),
        "--output-dir",
        tmp.path().to_str().unwrap(),
        "--reduction",
        "multiclass",
    ]);

    execute(args).expect("export should succeed");

    let contents =
        std::fs::read_to_string(tmp.path().join("model_predictions_multiclass.csv")).unwrap();
    assert_eq!(
        contents,
        "id,y,yhat,loss\n1,2,2,0.3\n2,0,0,0.3\n3,1,1,0.6\n"
    );
}

#[test]
fn export_command_defaults_to_identity() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("val.jsonl");
    let batches = vec![PredictionBatch::new(
        ["a", "b"],
        vec![1.5, 2.0],
        vec![1.25, 2.5],
        0.75,
    )];
    JsonlBatchSource::new(&input).save(&batches).unwrap();

    let args = parse_args([
        "predexport-export",
        "-i",
        input.to_str().unwrap(),
        "-o",
        tmp.path().to_str().unwrap(),
    ]);
    execute(args).expect("export should succeed");

    let contents = std::fs::read_to_string(tmp.path().join("model_predictions.csv")).unwrap();
    assert_eq!(contents, "id,y,yhat,loss\na,1.5,1.25,0.75\nb,2.0,2.5,0.75\n");
}

#[test]
fn export_command_squeezes_id_columns_and_widens_mixed_predictions() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("val.jsonl");
    std::fs::write(
        &input,
        concat!(
            r#"{"id": [[7], [8]], "y": [0, 1], "yhat": [0.9, 0.2], "loss": 0.5}"#,
            "\n",
            r#"{"id": [[9]], "y": [1], "yhat": [1], "loss": 0.4}"#,
            "\n",
        ),
    )
    .unwrap();

    let args = parse_args([
        "predexport-export",
        "--input",
        input.to_str().unwrap(),
        "--output-dir",
        tmp.path().to_str().unwrap(),
    ]);
    execute(args).expect("export should succeed");

    let contents = std::fs::read_to_string(tmp.path().join("model_predictions.csv")).unwrap();
    assert_eq!(
        contents,
        "id,y,yhat,loss\n7,0,0.9,0.5\n8,1,0.2,0.5\n9,1,1.0,0.4\n"
    );
}

#[test]
fn export_command_rejects_id_matrix() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("val.jsonl");
    std::fs::write(
        &input,
        "{\"id\": [[1, 2], [3, 4]], \"y\": [0, 1], \"yhat\": [1, 1], \"loss\": 0.5}\n",
    )
    .unwrap();

    let args = parse_args([
        "predexport-export",
        "--input",
        input.to_str().unwrap(),
        "--output-dir",
        tmp.path().to_str().unwrap(),
    ]);

    let err = execute(args).expect_err("a 2x2 id grid cannot be squeezed");
    assert!(format!("{err:#}").contains("'id'"), "unexpected error: {err:#}");
    assert!(!tmp.path().join("model_predictions.csv").exists());
}

#[test]
fn export_command_reports_missing_field() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("broken.jsonl");
    std::fs::write(&input, "{\"id\": [1], \"y\": [0], \"loss\": 0.1}\n").unwrap();

    let args = parse_args([
        "predexport-export",
        "--input",
        input.to_str().unwrap(),
        "--output-dir",
        tmp.path().to_str().unwrap(),
    ]);

    let err = execute(args).expect_err("missing yhat should fail");
    let chain = format!("{err:#}");
    assert!(chain.contains("line 1"), "unexpected error: {chain}");
    assert!(chain.contains("yhat"), "unexpected error: {chain}");
    assert!(!tmp.path().join("model_predictions.csv").exists());
}

#[test]
fn unknown_reduction_is_rejected_by_parser() {
    let result = ExportArgs::try_parse_from([
        "predexport-export",
        "--input",
        "in.jsonl",
        "--output-dir",
        ".",
        "--reduction",
        "softmax",
    ]);
    assert!(result.is_err());
}

#[test]
fn export_from_accepts_in_memory_source() {
    let tmp = tempdir().unwrap();
    let batches = vec![PredictionBatch::new([4], vec![0_i64], vec![1_i64], 0.5)];
    let args = parse_args([
        "predexport-export",
        "--input",
        "unused.jsonl",
        "--output-dir",
        tmp.path().to_str().unwrap(),
        "--file-name",
        "memory.csv",
    ]);

    let summary = export_from(&batches, &args).unwrap();

    assert_eq!(summary.path, tmp.path().join("memory.csv"));
    assert_eq!(summary.rows, 1);
}
