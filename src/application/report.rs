// Report rendering: solved assignment -> expectation grid -> .xlsx workbook

use crate::domain::{EquationSet, Solution, StateId};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive};
use rust_xlsxwriter::{
    Color, ConditionalFormatCell, ConditionalFormatCellRule, Format, Workbook, XlsxError,
};
use std::path::{Path, PathBuf};

const EXCEL_MAX_ROWS: usize = 1_048_576;
const EXCEL_MAX_COLS: usize = 16_384;

/// Most decimal places the console report will render
pub const MAX_PRECISION: u16 = 64;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("no assignment to report: {0}")]
    NoAssignment(String),

    #[error("a {rows}x{cols} grid does not fit in a worksheet")]
    TooLarge { rows: usize, cols: usize },

    #[error("{state} = {value} cannot be written as a spreadsheet number")]
    NotRepresentable { state: StateId, value: BigRational },

    #[error("failed to create output directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Exact expectation per state; rows are deficit, columns rolls remaining
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectationTable {
    pub total_deficit: u32,
    pub total_rolls: u32,
    pub cells: Vec<Vec<BigRational>>,
    pub root: BigRational,
}

impl ExpectationTable {
    pub fn from_solution(set: &EquationSet, solution: &Solution) -> Result<Self, ReportError> {
        if !solution.is_satisfiable() {
            return Err(ReportError::NoAssignment(solution.message.clone()));
        }
        if solution.values.len() != set.num_states() {
            return Err(ReportError::NoAssignment(format!(
                "expected {} values, solver returned {}",
                set.num_states(),
                solution.values.len()
            )));
        }

        let cells: Vec<Vec<BigRational>> = solution
            .values
            .chunks(set.cols())
            .map(|row| row.to_vec())
            .collect();
        let root = solution.values[set.index(set.anchor)].clone();

        Ok(Self {
            total_deficit: set.total_deficit,
            total_rolls: set.total_rolls,
            cells,
            root,
        })
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn get(&self, deficit: u32, rolls: u32) -> Option<&BigRational> {
        self.cells.get(deficit as usize)?.get(rolls as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &BigRational)> + '_ {
        self.cells.iter().enumerate().flat_map(|(deficit, row)| {
            row.iter()
                .enumerate()
                .map(move |(rolls, value)| (StateId::new(deficit as u32, rolls as u32), value))
        })
    }
}

/// `{deficit}-deficit-{rolls}-rolls.xlsx`
pub fn report_file_name(total_deficit: u32, total_rolls: u32) -> String {
    format!("{}-deficit-{}-rolls.xlsx", total_deficit, total_rolls)
}

fn to_cell_number(state: StateId, value: &BigRational) -> Result<f64, ReportError> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ReportError::NotRepresentable {
            state,
            value: value.clone(),
        })
}

/// Write the grid to `out_dir`, replacing any existing report for the same
/// parameters. Cells equal to the root value are highlighted red, all
/// others green.
pub fn write_workbook(table: &ExpectationTable, out_dir: &Path) -> Result<PathBuf, ReportError> {
    let (rows, cols) = (table.rows(), table.cols());
    if rows == 0 || cols == 0 || rows > EXCEL_MAX_ROWS || cols > EXCEL_MAX_COLS {
        return Err(ReportError::TooLarge { rows, cols });
    }

    std::fs::create_dir_all(out_dir).map_err(|source| ReportError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let path = out_dir.join(report_file_name(table.total_deficit, table.total_rolls));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (state, value) in table.iter() {
        let number = to_cell_number(state, value)?;
        worksheet.write_number(state.deficit, state.rolls as u16, number)?;
    }

    let root = to_cell_number(
        StateId::new(table.total_deficit, table.total_rolls),
        &table.root,
    )?;
    let (last_row, last_col) = ((rows - 1) as u32, (cols - 1) as u16);

    let reset_format = Format::new()
        .set_background_color(Color::RGB(0xFFC7CE))
        .set_font_color(Color::RGB(0x9C0006));
    let rolling_format = Format::new()
        .set_background_color(Color::RGB(0xC6EFCE))
        .set_font_color(Color::RGB(0x006100));

    let equals_root = ConditionalFormatCell::new()
        .set_rule(ConditionalFormatCellRule::EqualTo(root))
        .set_format(reset_format);
    let differs_from_root = ConditionalFormatCell::new()
        .set_rule(ConditionalFormatCellRule::NotEqualTo(root))
        .set_format(rolling_format);

    worksheet.add_conditional_format(0, 0, last_row, last_col, &equals_root)?;
    worksheet.add_conditional_format(0, 0, last_row, last_col, &differs_from_root)?;

    workbook.save(&path)?;
    tracing::info!(path = %path.display(), rows, cols, "report written");
    Ok(path)
}

/// Round to `precision` decimal places, half away from zero
pub fn format_decimal(value: &BigRational, precision: usize) -> String {
    let scale = BigRational::from_integer(num_traits::pow(BigInt::from(10), precision));
    let scaled = (value * scale).round().to_integer();
    let sign = if scaled.is_negative() { "-" } else { "" };
    let digits = scaled.abs().to_string();
    if precision == 0 {
        return format!("{}{}", sign, digits);
    }

    let digits = format!("{:0>width$}", digits, width = precision + 1);
    let (whole, fraction) = digits.split_at(digits.len() - precision);
    format!("{}{}.{}", sign, whole, fraction)
}
