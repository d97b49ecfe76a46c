use clap::Parser;

/// Tabulates the answers of a brand perception survey, per city and between cities.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the survey. The relative paths it contains are
    /// resolved against its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference summary in JSON format. If provided, surveytab will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the survey will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The survey export to read. Setting this option overrides the file
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. By default, it is guessed from the extension of the input.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (positional or header) How the columns of the input are matched to the questions.
    /// 'positional' uses the fixed positions of the standard export, 'header' looks up the
    /// columns by name in the first row.
    #[clap(long, value_parser)]
    pub mapping: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. It is only required
    /// when the workbook has several worksheets.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
