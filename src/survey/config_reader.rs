use crate::survey::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "surveyName")]
    pub survey_name: String,
    /// (file path or 'stdout') Where the summary is written.
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    /// 'csv' or 'xlsx'
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    /// 'positional' (default) or 'header'
    #[serde(rename = "columnMapping")]
    pub column_mapping: Option<String>,
    /// For the header mapping: field key -> name of the column in the header.
    /// If not provided, the field keys themselves are the column names.
    pub columns: Option<BTreeMap<String, String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSettings {
    pub field: String,
    pub label: String,
    pub question: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSource")]
    pub data_source: DataSource,
    /// The two cities to compare. Defaults to Quito and Guayaquil.
    pub groups: Option<Vec<String>>,
    #[serde(rename = "cityQuestions")]
    pub city_questions: Option<Vec<QuestionSettings>>,
    #[serde(rename = "comparisonQuestions")]
    pub comparison_questions: Option<Vec<QuestionSettings>>,
}

impl DataSource {
    pub fn column_mapping(&self) -> SurveyResult<ColumnMapping> {
        let mode = self.column_mapping.as_deref();
        match (mode, &self.columns) {
            (None, None) | (Some("positional"), _) => Ok(ColumnMapping::Positional),
            (None, Some(columns)) | (Some("header"), Some(columns)) => {
                let mut res: Vec<(Field, String)> = Vec::new();
                for (key, name) in columns.iter() {
                    res.push((read_field(key)?, name.clone()));
                }
                Ok(ColumnMapping::Header(res))
            }
            (Some("header"), None) => Ok(ColumnMapping::Header(
                Field::ALL
                    .iter()
                    .map(|f| (*f, f.key().to_string()))
                    .collect(),
            )),
            (Some(x), _) => whatever!("unknown column mapping: {}", x),
        }
    }
}

impl SurveyConfig {
    /// The configuration used when only an input file is given.
    pub fn from_input(path: &str) -> SurveyConfig {
        let provider = if path.to_lowercase().ends_with(".xlsx") {
            "xlsx"
        } else {
            "csv"
        };
        SurveyConfig {
            output_settings: OutputSettings {
                survey_name: simplify_file_name(path),
                output_path: None,
            },
            data_source: DataSource {
                provider: provider.to_string(),
                file_path: path.to_string(),
                excel_worksheet_name: None,
                column_mapping: None,
                columns: None,
            },
            groups: None,
            city_questions: None,
            comparison_questions: None,
        }
    }

    pub fn groups(&self) -> SurveyResult<(Group, Group)> {
        match self.groups.as_deref() {
            None => Ok((Group::City(City::Quito), Group::City(City::Guayaquil))),
            Some([a, b]) => {
                let group_a = Group::City(City::normalize(a));
                let group_b = Group::City(City::normalize(b));
                if group_a == group_b {
                    whatever!("the groups {:?} and {:?} are the same city", a, b)
                }
                // The group names are keys of the comparison entries.
                for g in [&group_a, &group_b] {
                    if RESERVED_GROUP_NAMES.contains(&g.label()) {
                        whatever!("{:?} cannot be used as a group name", g.label())
                    }
                }
                Ok((group_a, group_b))
            }
            Some(x) => whatever!("exactly two groups must be compared, got {:?}", x),
        }
    }

    pub fn city_catalog(&self) -> SurveyResult<QuestionCatalog> {
        match &self.city_questions {
            Some(qs) => read_catalog(qs),
            None => Ok(QuestionCatalog::city_dashboard()),
        }
    }

    pub fn comparison_catalog(&self) -> SurveyResult<QuestionCatalog> {
        match &self.comparison_questions {
            Some(qs) => read_catalog(qs),
            None => Ok(QuestionCatalog::comparative_analysis()),
        }
    }
}

const RESERVED_GROUP_NAMES: [&str; 2] = ["name", "diff"];

pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

fn read_field(key: &str) -> SurveyResult<Field> {
    Field::from_key(key).context(UnknownFieldSnafu { key })
}

fn read_catalog(questions: &[QuestionSettings]) -> SurveyResult<QuestionCatalog> {
    let mut res: Vec<Question> = Vec::new();
    for qs in questions.iter() {
        let field = read_field(&qs.field)?;
        let question = qs.question.clone().unwrap_or_else(|| qs.label.clone());
        res.push(Question {
            field,
            label: qs.label.clone(),
            question,
        });
    }
    Ok(QuestionCatalog { questions: res })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(js: &str) -> SurveyConfig {
        serde_json::from_str(js).unwrap()
    }

    #[test]
    fn minimal_config() {
        let c = config(
            r#"{"outputSettings": {"surveyName": "test"},
                "dataSource": {"provider": "csv", "filePath": "data.csv"}}"#,
        );
        assert_eq!(c.data_source.column_mapping().unwrap(), ColumnMapping::Positional);
        assert_eq!(
            c.groups().unwrap(),
            (Group::City(City::Quito), Group::City(City::Guayaquil))
        );
        assert_eq!(c.city_catalog().unwrap(), QuestionCatalog::city_dashboard());
        assert_eq!(
            c.comparison_catalog().unwrap(),
            QuestionCatalog::comparative_analysis()
        );
    }

    #[test]
    fn header_columns() {
        let c = config(
            r#"{"outputSettings": {"surveyName": "test"},
                "dataSource": {"provider": "csv", "filePath": "data.csv",
                               "columns": {"ciudad": "Ciudad", "percepcion_precios": "Precios"}}}"#,
        );
        assert_eq!(
            c.data_source.column_mapping().unwrap(),
            ColumnMapping::Header(vec![
                (Field::City, "Ciudad".to_string()),
                (Field::PricePerception, "Precios".to_string()),
            ])
        );
    }

    #[test]
    fn header_mapping_defaults_to_field_keys() {
        let mut c = SurveyConfig::from_input("data.csv");
        c.data_source.column_mapping = Some("header".to_string());
        match c.data_source.column_mapping().unwrap() {
            ColumnMapping::Header(cols) => {
                assert_eq!(cols.len(), Field::ALL.len());
                assert!(cols.contains(&(Field::City, "ciudad".to_string())));
            }
            x => panic!("unexpected mapping {:?}", x),
        }
    }

    #[test]
    fn invalid_settings() {
        let mut c = SurveyConfig::from_input("data.csv");
        c.data_source.column_mapping = Some("by_magic".to_string());
        assert!(c.data_source.column_mapping().is_err());

        let mut c = SurveyConfig::from_input("data.csv");
        c.groups = Some(vec!["Quito".to_string()]);
        assert!(c.groups().is_err());

        let mut c = SurveyConfig::from_input("data.csv");
        c.city_questions = Some(vec![QuestionSettings {
            field: "edad".to_string(),
            label: "Edad".to_string(),
            question: None,
        }]);
        assert!(matches!(
            c.city_catalog(),
            Err(SurveyError::UnknownField { .. })
        ));
    }

    #[test]
    fn groups_must_be_distinct_cities() {
        let mut c = SurveyConfig::from_input("data.csv");
        c.groups = Some(vec!["Quito".to_string(), "UIO".to_string()]);
        assert!(matches!(c.groups(), Err(SurveyError::Whatever { .. })));

        c.groups = Some(vec!["Quito".to_string(), "name".to_string()]);
        assert!(c.groups().is_err());
        c.groups = Some(vec!["diff".to_string(), "Guayaquil".to_string()]);
        assert!(c.groups().is_err());

        c.groups = Some(vec!["GYE".to_string(), "Cuenca".to_string()]);
        assert_eq!(
            c.groups().unwrap(),
            (
                Group::City(City::Guayaquil),
                Group::City(City::Other("Cuenca".to_string()))
            )
        );
    }

    #[test]
    fn provider_follows_extension() {
        assert_eq!(SurveyConfig::from_input("a/b.XLSX").data_source.provider, "xlsx");
        assert_eq!(SurveyConfig::from_input("a/b.csv").data_source.provider, "csv");
        assert_eq!(
            SurveyConfig::from_input("a/b.csv").output_settings.survey_name,
            "b.csv"
        );
    }
}
