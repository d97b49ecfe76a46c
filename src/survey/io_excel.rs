// Reading survey exports from Excel workbooks.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::survey::*;

pub fn read_excel_survey(
    path: &str,
    worksheet_name_o: Option<&str>,
    mapping: &ColumnMapping,
) -> SurveyResult<Vec<SurveyRecord>> {
    let wrange = get_range(path, worksheet_name_o)?;
    let rows: Vec<Vec<String>> = wrange
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    debug!("read_excel_survey: {} rows in {:?}", rows.len(), path);
    let records = parser::records_from_rows(&rows, mapping).context(MappingColumnsSnafu {})?;
    Ok(records)
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> SurveyResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                name: worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: using the only worksheet {:?}", worksheet_name);
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu { path }.fail(),
        }
    }
}

/// Cells are read as text, the same way they would appear in a CSV export.
fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
