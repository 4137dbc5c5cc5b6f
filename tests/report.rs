mod common;

use common::{coin_flip, small};
use grindopt::application::{report_file_name, write_workbook};
use grindopt::{GrindAnalysisService, RunSettings, SolverFactory};
use num_traits::ToPrimitive;
use std::io::Read;
use std::path::Path;

fn archive_entry(path: &Path, name: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut xml = String::new();
    entry.read_to_string(&mut xml).unwrap();
    xml
}

fn attribute<'a>(tag: &'a str, name: &str) -> &'a str {
    let start = tag.find(&format!("{}=\"", name)).unwrap() + name.len() + 2;
    let len = tag[start..].find('"').unwrap();
    &tag[start..start + len]
}

fn cell_value(sheet: &str, reference: &str) -> f64 {
    let cell = &sheet[sheet.find(&format!("r=\"{}\"", reference)).unwrap()..];
    let start = cell.find("<v>").unwrap() + 3;
    let end = cell.find("</v>").unwrap();
    cell[start..end].parse().unwrap()
}

#[test]
fn workbook_is_named_after_the_run_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let service = GrindAnalysisService::new(SolverFactory::default_solver());
    let table = service.expectation_table(&small(2, 3)).unwrap();

    let path = write_workbook(&table, dir.path()).unwrap();
    assert_eq!(path, dir.path().join("2-deficit-3-rolls.xlsx"));

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"), "xlsx files are zip archives");
}

#[test]
fn existing_report_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let stale = dir.path().join(report_file_name(1, 1));
    std::fs::write(&stale, b"stale").unwrap();

    let service = GrindAnalysisService::new(SolverFactory::default_solver());
    let table = service.expectation_table(&coin_flip()).unwrap();
    let path = write_workbook(&table, dir.path()).unwrap();

    assert_eq!(path, stale);
    assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
}

#[test]
fn missing_output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("out").join("runs");
    let service = GrindAnalysisService::new(SolverFactory::default_solver());
    let table = service.expectation_table(&coin_flip()).unwrap();

    let path = write_workbook(&table, &nested).unwrap();
    assert!(path.exists());
}

#[test]
fn run_prints_every_cell_and_the_answer() {
    let dir = tempfile::tempdir().unwrap();
    let settings = RunSettings {
        parameters: coin_flip(),
        out_dir: dir.path().to_path_buf(),
        show_equations: true,
        ..RunSettings::default()
    };
    let service = GrindAnalysisService::new(SolverFactory::default_solver());
    let mut console = Vec::new();
    let outcome = service.run(&settings, &mut console).unwrap();
    let console = String::from_utf8(console).unwrap();

    assert!(console.contains("SOLVING SYSTEM OF 4 VARIABLES WITH 1 ROLLS AND 1 DEFICITS"));
    assert!(console.contains("v(1,1) = 10 + 1/2*v(1,0) + 1/2*v(0,0)"));
    assert!(console.contains("CHECK: sat"));
    assert!(console.contains("MODEL: [v(0,0) = 0, v(0,1) = 1, v(1,0) = 20, v(1,1) = 20]"));
    assert!(console.contains("0 DEFICIT AND 1 ROLLS EXPECTED: 1.00000 (1)"));
    assert!(console.contains("EXPECTED TIME TO GET ACHIEVEMENT: 20.00000 (20)"));
    assert!(console.contains("COMPUTE TIME TAKEN:"));
    assert_eq!(console.matches("ROLLS EXPECTED:").count(), 4);
    assert!(outcome.report_path.exists());
}

#[test]
fn workbook_holds_the_grid_and_both_highlight_rules() {
    let dir = tempfile::tempdir().unwrap();
    let service = GrindAnalysisService::new(SolverFactory::default_solver());
    let table = service.expectation_table(&small(2, 3)).unwrap();
    let root = table.root.to_f64().unwrap();
    let path = write_workbook(&table, dir.path()).unwrap();

    // Deficit runs down the rows, rolls remaining across the columns
    let sheet = archive_entry(&path, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<dimension ref="A1:D3"/>"#));
    assert_eq!(sheet.matches("<c r=").count(), 12);
    assert_eq!(cell_value(&sheet, "A1"), 0.0);
    assert_eq!(cell_value(&sheet, "A2"), root);
    assert_eq!(cell_value(&sheet, "A3"), root);
    assert_eq!(cell_value(&sheet, "D3"), root);
    assert_eq!(cell_value(&sheet, "B1"), table.get(0, 1).unwrap().to_f64().unwrap());

    let rules: Vec<&str> = sheet
        .split("<cfRule ")
        .skip(1)
        .map(|rule| &rule[..rule.find("</cfRule>").unwrap()])
        .collect();
    assert_eq!(rules.len(), 2);
    for rule in &rules {
        assert_eq!(attribute(rule, "type"), "cellIs");
        let start = rule.find("<formula>").unwrap() + "<formula>".len();
        let end = rule.find("</formula>").unwrap();
        assert_eq!(rule[start..end].parse::<f64>().unwrap(), root);
    }
    let dxf_for = |operator: &str| {
        let rule = rules
            .iter()
            .find(|rule| attribute(rule, "operator") == operator)
            .unwrap();
        attribute(rule, "dxfId").parse::<usize>().unwrap()
    };
    let (equal, not_equal) = (dxf_for("equal"), dxf_for("notEqual"));

    let styles = archive_entry(&path, "xl/styles.xml");
    let dxfs: Vec<&str> = styles[styles.find("<dxfs").unwrap()..]
        .split("<dxf>")
        .skip(1)
        .collect();
    assert!(dxfs[equal].contains("FFC7CE") && dxfs[equal].contains("9C0006"));
    assert!(dxfs[not_equal].contains("C6EFCE") && dxfs[not_equal].contains("006100"));
}
