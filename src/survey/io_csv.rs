// Reading survey exports in the CSV format.

use crate::survey::*;

pub fn read_csv_survey(path: &str, mapping: &ColumnMapping) -> SurveyResult<Vec<SurveyRecord>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    // Exports from spreadsheets often start with a byte order mark.
    let text = contents.strip_prefix('\u{feff}').unwrap_or(&contents);
    debug!("read_csv_survey: {} bytes from {:?}", text.len(), path);
    let records = parser::parse_records_with(text, mapping).context(MappingColumnsSnafu {})?;
    Ok(records)
}
