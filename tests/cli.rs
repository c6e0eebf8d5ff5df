//! End-to-end tests for the prazo-diag binary.

mod common;

use assert_cmd::Command;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::contains;

use common::TestWorkspace;

const SAMPLE: &str = "\
Tarefa,Cliente,Executor,Due Date,Completion Date
Envio DCTF,Acme,Ana,2024-01-10,2024-01-15
Folha de pagamento,Beta,Bruno,2024-01-05,
Balancete mensal,Acme,Ana,2024-02-01,2024-02-01
";

fn bin() -> Command {
    Command::cargo_bin("prazo-diag").expect("binary exists")
}

#[test]
fn diagnose_emits_annotated_csv_to_stdout() {
    let ws = TestWorkspace::new();
    let input = ws.write("tarefas.csv", SAMPLE);
    bin()
        .args(["diagnose", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("\"status_prazo\""))
        .stdout(contains("\"Em Atraso\""))
        .stdout(contains("\"Pendente\""))
        .stdout(contains("\"Fiscal\""))
        .stdout(contains("\"Depto. Pessoal\""))
        .stdout(contains("\"2024-01\""));
}

#[test]
fn diagnose_writes_output_file() {
    let ws = TestWorkspace::new();
    let input = ws.write("tarefas.csv", SAMPLE);
    let output = ws.path().join("anotada.csv");
    bin()
        .args([
            "diagnose",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();
    let written = std::fs::read_to_string(&output).expect("read output");
    assert!(written.contains("\"dias_de_atraso\""));
    assert!(written.contains("\"5\""));
    assert!(written.contains("\"Contábil\""));
}

#[test]
fn diagnose_reads_csv_from_stdin() {
    bin()
        .args(["diagnose", "-i", "-"])
        .write_stdin(SAMPLE)
        .assert()
        .success()
        .stdout(contains("\"tipo_tarefa\""));
}

#[test]
fn diagnose_renders_preview_table() {
    let ws = TestWorkspace::new();
    let input = ws.write("tarefas.csv", SAMPLE);
    bin()
        .args([
            "diagnose",
            "-i",
            input.to_str().unwrap(),
            "--table",
            "--limit",
            "2",
        ])
        .assert()
        .success()
        .stdout(contains("status_prazo"))
        .stdout(contains("Em Atraso"))
        // Third row is cut by --limit 2.
        .stdout(contains("Balancete mensal").not());
}

#[test]
fn diagnose_succeeds_on_unmappable_input() {
    let ws = TestWorkspace::new();
    let input = ws.write("estranha.csv", "alpha,beta\n1,2\n");
    bin()
        .args(["diagnose", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("\"No Prazo\""))
        .stdout(contains("\"Indefinido\""));
}

#[test]
fn map_reports_partial_mapping_as_json() {
    let ws = TestWorkspace::new();
    let input = ws.write("tarefas.csv", "Tarefa,Cliente\nEnvio DCTF,Acme\n");
    let assert = bin()
        .args(["map", "-i", input.to_str().unwrap(), "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf-8 stdout");
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("json report");
    assert_eq!(report["original_columns"], serde_json::json!(["Tarefa", "Cliente"]));
    assert_eq!(report["resolved"].as_array().map(|r| r.len()), Some(2));
    assert_eq!(report["partial"], serde_json::json!(true));
}

#[test]
fn map_renders_table_with_missing_fields_marked() {
    let ws = TestWorkspace::new();
    let input = ws.write("tarefas.csv", "Tarefa,Cliente\nEnvio DCTF,Acme\n");
    bin()
        .args(["map", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("nome_tarefa"))
        .stdout(contains("(não encontrada)"));
}

#[test]
fn semicolon_delimiter_override_is_honoured() {
    let ws = TestWorkspace::new();
    let input = ws.write(
        "tarefas.csv",
        "Tarefa;Due Date;Completion Date\nEnvio SPED;2024-01-10;2024-01-20\n",
    );
    bin()
        .args([
            "diagnose",
            "-i",
            input.to_str().unwrap(),
            "--delimiter",
            ";",
            "--output-delimiter",
            ",",
        ])
        .assert()
        .success()
        .stdout(contains("\"10\""));
}

#[test]
fn missing_input_fails_with_context() {
    bin()
        .args(["diagnose", "-i", "nao_existe.csv"])
        .assert()
        .failure()
        .stderr(contains("nao_existe.csv"));
}
