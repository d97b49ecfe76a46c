use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_stats::narrative::{describe_comparison, CityHighlights};
use survey_stats::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub use crate::survey::config_reader::*;
use crate::survey::io_common::{round_percent, simplify_file_name};

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet {name} in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("The Excel file {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display(
        "The Excel file {path} has several worksheets, the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Error opening configuration file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot map the columns of the survey"))]
    MappingColumns { source: ParseErrors },
    #[snafu(display("Unknown field {key}"))]
    UnknownField { key: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Cannot read the working directory"))]
    WorkingDir { source: std::io::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// Donut charts are used for questions with few answers, bar charts otherwise.
const MAX_DONUT_ENTRIES: usize = 4;

fn distribution_to_json(question: &Question, dist: &Distribution) -> JSValue {
    let entries: Vec<JSValue> = dist
        .entries
        .iter()
        .map(|e| json!({"name": e.name, "value": e.value, "percent": round_percent(e.percent)}))
        .collect();
    let chart = if dist.entries.len() <= MAX_DONUT_ENTRIES {
        "donut"
    } else {
        "bar"
    };
    json!({
        "field": question.field.key(),
        "label": question.label,
        "question": question.question,
        "validTotal": dist.valid_total,
        "chart": chart,
        "entries": entries
    })
}

fn group_questions_to_json(
    tab: &mut Tabulator,
    group: &Group,
    catalog: &QuestionCatalog,
) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for q in catalog.questions.iter() {
        let dist = tab.distribution(group, q.field);
        if dist.is_empty() {
            debug!(
                "group_questions_to_json: {}: no answer for {}, skipping",
                group.label(),
                q.field
            );
            continue;
        }
        l.push(distribution_to_json(q, dist));
    }
    l
}

fn entry_to_json(entry: &Option<DistributionEntry>) -> JSValue {
    match entry {
        Some(e) => json!({"name": e.name, "percent": round_percent(e.percent)}),
        None => JSValue::Null,
    }
}

fn highlights_to_json(tab: &mut Tabulator, group: &Group) -> JSValue {
    let association = tab.distribution(group, Field::BrandAssociation).clone();
    let price = tab.distribution(group, Field::PricePerception).clone();
    let trust = tab.distribution(group, Field::ExpertTrust).clone();
    let h = CityHighlights::new(group.label(), &association, &price, &trust);
    json!({
        "association": entry_to_json(&h.association),
        "associationIsStrength": h.association_is_strength,
        "price": entry_to_json(&h.price),
        "trust": entry_to_json(&h.trust),
        "texts": [h.association_text(), h.price_text(), h.trust_text()],
        "recommendations": h.recommendations()
    })
}

fn city_to_json(tab: &mut Tabulator, group: &Group, catalog: &QuestionCatalog) -> JSValue {
    let questions = group_questions_to_json(tab, group, catalog);
    json!({
        "city": group.label(),
        "respondents": tab.respondents(group),
        "questions": questions,
        "highlights": highlights_to_json(tab, group)
    })
}

fn comparison_to_json(question: &Question, cmp: &Comparison) -> Option<JSValue> {
    let narrative = describe_comparison(cmp)?;
    let max = cmp.max_difference.as_ref()?;
    let comparison_entry = |e: &ComparisonEntry| {
        let mut m: JSMap<String, JSValue> = JSMap::new();
        m.insert("name".to_string(), json!(e.name));
        m.insert(cmp.group_a.clone(), json!(round_percent(e.percent_a)));
        m.insert(cmp.group_b.clone(), json!(round_percent(e.percent_b)));
        m.insert("diff".to_string(), json!(round_percent(e.diff)));
        JSValue::Object(m)
    };
    let entries: Vec<JSValue> = cmp.entries.iter().map(comparison_entry).collect();
    Some(json!({
        "field": question.field.key(),
        "label": question.label,
        "question": question.question,
        "entries": entries,
        "maxDifference": comparison_entry(max),
        "leader": narrative.leader,
        "keyDifference": narrative.key_difference,
        "insight": narrative.insight,
        "recommendation": narrative.recommendation
    }))
}

fn build_summary_js(config: &SurveyConfig, tab: &mut Tabulator) -> SurveyResult<JSValue> {
    let (group_a, group_b) = config.groups()?;
    let city_catalog = config.city_catalog()?;
    let comparison_catalog = config.comparison_catalog()?;

    let cities: Vec<JSValue> = [&group_a, &group_b]
        .iter()
        .map(|g| city_to_json(tab, g, &city_catalog))
        .collect();

    let overall = json!({
        "respondents": tab.respondents(&Group::All),
        "unrecognizedCity": tab.unrecognized_city_count(),
        "questions": group_questions_to_json(tab, &Group::All, &city_catalog)
    });

    let mut comparisons: Vec<JSValue> = Vec::new();
    for q in comparison_catalog.questions.iter() {
        let cmp = tab.comparison(&group_a, &group_b, q.field);
        match comparison_to_json(q, &cmp) {
            Some(js) => comparisons.push(js),
            None => debug!("build_summary_js: no answer to compare for {}", q.field),
        }
    }

    Ok(json!({
        "config": {
            "survey": config.output_settings.survey_name,
            "source": config.data_source.file_path,
            "provider": config.data_source.provider
        },
        "cities": cities,
        "overall": overall,
        "comparison": {
            "groups": [group_a.label(), group_b.label()],
            "questions": comparisons
        }
    }))
}

fn read_survey_data(root_path: &Path, source: &DataSource) -> SurveyResult<Vec<SurveyRecord>> {
    let p: PathBuf = root_path.join(&source.file_path);
    let p2 = p.as_path().display().to_string();
    let mapping = source.column_mapping()?;
    info!("Attempting to read survey file {:?}", p2);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_survey(&p2, &mapping),
        "xlsx" => {
            io_excel::read_excel_survey(&p2, source.excel_worksheet_name.as_deref(), &mapping)
        }
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn write_summary(path: &str, contents: &str) -> SurveyResult<()> {
    if path == "stdout" {
        println!("{}", contents);
        Ok(())
    } else {
        fs::write(path, contents).context(WritingOutputSnafu { path })
    }
}

/// Runs the full tabulation described by the configuration.
///
/// Arguments:
/// * `config` the survey configuration
/// * `root_path` the directory against which the relative paths of the configuration are resolved
/// * `check_summary_path` a reference summary. If provided, the run fails when the computed
/// summary differs from it.
pub fn run_survey(
    config: &SurveyConfig,
    root_path: &Path,
    check_summary_path: Option<String>,
) -> SurveyResult<JSValue> {
    info!("config: {:?}", config);
    let records = read_survey_data(root_path, &config.data_source)?;
    info!(
        "Read {} records from {}",
        records.len(),
        simplify_file_name(&config.data_source.file_path)
    );

    let mut tab = Tabulator::new(records);
    let unrecognized = tab.unrecognized_city_count();
    if unrecognized > 0 {
        warn!(
            "{} records have no recognized city: they only appear in the overall tables",
            unrecognized
        );
    }

    let result_js = build_summary_js(config, &mut tab)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    if let Some(out_path) = &config.output_settings.output_path {
        let p = if out_path == "stdout" {
            out_path.clone()
        } else {
            root_path.join(out_path).display().to_string()
        };
        info!("Writing summary to {}", p);
        write_summary(&p, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(result_js)
}

pub fn read_summary(path: String) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
