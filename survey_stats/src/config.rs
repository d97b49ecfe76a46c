// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The fixed set of questions recorded for each respondent.
///
/// Every field has a stable key (the column name used by the survey export)
/// and a default position in the export, used by the positional mapping.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Field {
    City,
    BuysDermocosmetics,
    BoughtAtStore,
    BrandAssociation,
    BrandDescription,
    CommunicationQuality,
    AddressesRealProblems,
    PricePerception,
    InfluenceStronglyDisagree,
    InfluenceDisagree,
    InfluenceNeutral,
    InfluenceAgree,
    InfluenceStronglyAgree,
    ExpertTrust,
    AdvisoryAdequacy,
    ImprovementComment,
}

/// Where the value of a field is found in a row of the export.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnPosition {
    Index(usize),
    /// The last token of the row, whatever the length of the row.
    Last,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::BuysDermocosmetics,
        Field::BoughtAtStore,
        Field::BrandAssociation,
        Field::BrandDescription,
        Field::CommunicationQuality,
        Field::AddressesRealProblems,
        Field::PricePerception,
        Field::InfluenceStronglyDisagree,
        Field::InfluenceDisagree,
        Field::InfluenceNeutral,
        Field::InfluenceAgree,
        Field::InfluenceStronglyAgree,
        Field::ExpertTrust,
        Field::AdvisoryAdequacy,
        Field::ImprovementComment,
        Field::City,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Field::City => "ciudad",
            Field::BuysDermocosmetics => "compras_dermocosmetica",
            Field::BoughtAtStore => "compra_en_fybeca",
            Field::BrandAssociation => "asociacion_fybeca",
            Field::BrandDescription => "descripcion_fybeca",
            Field::CommunicationQuality => "comunicacion_calidad",
            Field::AddressesRealProblems => "aborda_problemas_reales",
            Field::PricePerception => "percepcion_precios",
            Field::InfluenceStronglyDisagree => "influencia_totalmente_desacuerdo",
            Field::InfluenceDisagree => "influencia_desacuerdo",
            Field::InfluenceNeutral => "influencia_neutro",
            Field::InfluenceAgree => "influencia_acuerdo",
            Field::InfluenceStronglyAgree => "influencia_totalmente_acuerdo",
            Field::ExpertTrust => "confianza_experta",
            Field::AdvisoryAdequacy => "asesoria_adecuada",
            Field::ImprovementComment => "mejora_para_elegir",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().find(|f| f.key() == key).cloned()
    }

    /// The position of this field in the standard export.
    ///
    /// Columns 6-11 (content preferences) and 20-25 (trust factors) are not
    /// part of the schema.
    pub fn default_position(&self) -> ColumnPosition {
        match self {
            Field::BuysDermocosmetics => ColumnPosition::Index(0),
            Field::BoughtAtStore => ColumnPosition::Index(1),
            Field::BrandAssociation => ColumnPosition::Index(2),
            Field::BrandDescription => ColumnPosition::Index(3),
            Field::CommunicationQuality => ColumnPosition::Index(4),
            Field::AddressesRealProblems => ColumnPosition::Index(5),
            Field::PricePerception => ColumnPosition::Index(12),
            Field::InfluenceStronglyDisagree => ColumnPosition::Index(13),
            Field::InfluenceDisagree => ColumnPosition::Index(14),
            Field::InfluenceNeutral => ColumnPosition::Index(15),
            Field::InfluenceAgree => ColumnPosition::Index(16),
            Field::InfluenceStronglyAgree => ColumnPosition::Index(17),
            Field::ExpertTrust => ColumnPosition::Index(18),
            Field::AdvisoryAdequacy => ColumnPosition::Index(19),
            Field::ImprovementComment => ColumnPosition::Index(26),
            Field::City => ColumnPosition::Last,
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The city of a respondent, after normalization.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum City {
    Quito,
    Guayaquil,
    /// Any value that could not be recognized. It is kept as written (trimmed).
    Other(String),
}

impl City {
    /// Recognizes the city from free text.
    ///
    /// The comparison is case-insensitive and accepts the airport codes
    /// (`UIO`, `GYE`) that respondents commonly use.
    pub fn normalize(raw: &str) -> City {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();
        if lower.contains("quito") || lower.contains("uio") {
            City::Quito
        } else if lower.contains("guayaquil") || lower.contains("gye") {
            City::Guayaquil
        } else {
            City::Other(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            City::Quito => "Quito",
            City::Guayaquil => "Guayaquil",
            City::Other(s) => s.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, City::Other(_))
    }
}

impl Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The answers of one respondent.
///
/// Stored values are trimmed, never empty and never wrapped in double quotes.
/// A missing answer is `None`.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SurveyRecord {
    pub city: Option<City>,
    pub buys_dermocosmetics: Option<String>,
    pub bought_at_store: Option<String>,
    pub brand_association: Option<String>,
    pub brand_description: Option<String>,
    pub communication_quality: Option<String>,
    pub addresses_real_problems: Option<String>,
    pub price_perception: Option<String>,
    pub influence_strongly_disagree: Option<String>,
    pub influence_disagree: Option<String>,
    pub influence_neutral: Option<String>,
    pub influence_agree: Option<String>,
    pub influence_strongly_agree: Option<String>,
    pub expert_trust: Option<String>,
    pub advisory_adequacy: Option<String>,
    pub improvement_comment: Option<String>,
}

impl SurveyRecord {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::City => self.city.as_ref().map(|c| c.as_str()),
            Field::BuysDermocosmetics => self.buys_dermocosmetics.as_deref(),
            Field::BoughtAtStore => self.bought_at_store.as_deref(),
            Field::BrandAssociation => self.brand_association.as_deref(),
            Field::BrandDescription => self.brand_description.as_deref(),
            Field::CommunicationQuality => self.communication_quality.as_deref(),
            Field::AddressesRealProblems => self.addresses_real_problems.as_deref(),
            Field::PricePerception => self.price_perception.as_deref(),
            Field::InfluenceStronglyDisagree => self.influence_strongly_disagree.as_deref(),
            Field::InfluenceDisagree => self.influence_disagree.as_deref(),
            Field::InfluenceNeutral => self.influence_neutral.as_deref(),
            Field::InfluenceAgree => self.influence_agree.as_deref(),
            Field::InfluenceStronglyAgree => self.influence_strongly_agree.as_deref(),
            Field::ExpertTrust => self.expert_trust.as_deref(),
            Field::AdvisoryAdequacy => self.advisory_adequacy.as_deref(),
            Field::ImprovementComment => self.improvement_comment.as_deref(),
        }
    }

    pub(crate) fn answer_mut(&mut self, field: Field) -> Option<&mut Option<String>> {
        let slot = match field {
            Field::City => return None,
            Field::BuysDermocosmetics => &mut self.buys_dermocosmetics,
            Field::BoughtAtStore => &mut self.bought_at_store,
            Field::BrandAssociation => &mut self.brand_association,
            Field::BrandDescription => &mut self.brand_description,
            Field::CommunicationQuality => &mut self.communication_quality,
            Field::AddressesRealProblems => &mut self.addresses_real_problems,
            Field::PricePerception => &mut self.price_perception,
            Field::InfluenceStronglyDisagree => &mut self.influence_strongly_disagree,
            Field::InfluenceDisagree => &mut self.influence_disagree,
            Field::InfluenceNeutral => &mut self.influence_neutral,
            Field::InfluenceAgree => &mut self.influence_agree,
            Field::InfluenceStronglyAgree => &mut self.influence_strongly_agree,
            Field::ExpertTrust => &mut self.expert_trust,
            Field::AdvisoryAdequacy => &mut self.advisory_adequacy,
            Field::ImprovementComment => &mut self.improvement_comment,
        };
        Some(slot)
    }
}

/// How the tokens of a row are assigned to fields.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ColumnMapping {
    /// Fixed column indices of the standard export, see `Field::default_position`.
    Positional,
    /// Columns located by their name in the header line.
    /// Fields that are not listed are left empty.
    Header(Vec<(Field, String)>),
}

/// One question of a dashboard: which field to aggregate and how to present it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    pub field: Field,
    /// Short title, used as the chart label.
    pub label: String,
    /// The full text of the question, as asked to the respondents.
    pub question: String,
}

impl Question {
    pub fn new(field: Field, label: &str, question: &str) -> Question {
        Question {
            field,
            label: label.to_string(),
            question: question.to_string(),
        }
    }
}

/// The ordered list of questions to aggregate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionCatalog {
    pub questions: Vec<Question>,
}

impl QuestionCatalog {
    /// The questions detailed on each city dashboard.
    pub fn city_dashboard() -> QuestionCatalog {
        let q = |field: Field, question: &str| Question::new(field, question, question);
        QuestionCatalog {
            questions: vec![
                q(
                    Field::BuysDermocosmetics,
                    "¿Realiza compras de dermocosmética?",
                ),
                q(
                    Field::BoughtAtStore,
                    "¿Has comprado productos de dermocosmética en Fybeca alguna vez?",
                ),
                q(
                    Field::BrandAssociation,
                    "Cuando piensas en Fybeca, ¿qué tan asociada la percibes con productos de dermocosmética?",
                ),
                q(
                    Field::BrandDescription,
                    "¿Cuál de las siguientes palabras describe mejor a Fybeca en dermocosmética?",
                ),
                q(
                    Field::CommunicationQuality,
                    "La comunicación de Fybeca sobre dermocosmética es:",
                ),
                q(
                    Field::AddressesRealProblems,
                    "¿Sientes que la comunicación de Fybeca aborda problemas reales de la piel?",
                ),
                q(
                    Field::PricePerception,
                    "¿Cómo percibes los precios de Fybeca en dermocosmética?",
                ),
                q(
                    Field::ExpertTrust,
                    "¿Qué tanto confías en Fybeca como experta en el cuidado de la piel?",
                ),
                q(
                    Field::AdvisoryAdequacy,
                    "¿Crees que en Fybeca puedes recibir asesoría adecuada?",
                ),
            ],
        }
    }

    /// The questions compared between the two cities.
    pub fn comparative_analysis() -> QuestionCatalog {
        QuestionCatalog {
            questions: vec![
                Question::new(
                    Field::BrandAssociation,
                    "Asociación con la marca",
                    "Cuando piensas en Fybeca, ¿qué tan asociada la percibes con productos de dermocosmética?",
                ),
                Question::new(
                    Field::PricePerception,
                    "Percepción de Precios",
                    "¿Cómo percibes los precios de Fybeca en dermocosmética?",
                ),
                Question::new(
                    Field::ExpertTrust,
                    "Confianza como Experta",
                    "¿Qué tanto confías en Fybeca como experta en el cuidado de la piel?",
                ),
                Question::new(
                    Field::CommunicationQuality,
                    "Calidad de Comunicación",
                    "La comunicación de Fybeca sobre dermocosmética es:",
                ),
                Question::new(
                    Field::BrandDescription,
                    "Descripción de la Marca",
                    "¿Cuál de las siguientes palabras describe mejor a Fybeca en dermocosmética?",
                ),
                Question::new(
                    Field::AddressesRealProblems,
                    "¿Aborda problemas reales?",
                    "¿Sientes que la comunicación de Fybeca aborda problemas reales de la piel?",
                ),
                Question::new(
                    Field::AdvisoryAdequacy,
                    "¿Asesoría Adecuada?",
                    "¿Crees que en Fybeca puedes recibir asesoría adecuada?",
                ),
            ],
        }
    }

    pub fn fields(&self) -> Vec<Field> {
        self.questions.iter().map(|q| q.field).collect()
    }
}

// ******** Output data structures *********

/// The share of one answer within a set of respondents.
#[derive(PartialEq, Debug, Clone)]
pub struct DistributionEntry {
    pub name: String,
    /// Number of respondents who gave this answer.
    pub value: u64,
    /// Between 0 and 100.
    pub percent: f64,
}

/// The answers to one field over a subset of respondents, most frequent first.
#[derive(PartialEq, Debug, Clone)]
pub struct Distribution {
    pub field: Field,
    /// The number of respondents with a usable answer. Missing answers and
    /// placeholders are not counted.
    pub valid_total: u64,
    pub entries: Vec<DistributionEntry>,
}

impl Distribution {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self) -> Option<&DistributionEntry> {
        self.entries.first()
    }

    pub fn percent_of(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.percent)
    }
}

/// The share of one answer in the two compared groups.
#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonEntry {
    pub name: String,
    pub percent_a: f64,
    pub percent_b: f64,
    /// Absolute difference between the two percentages.
    pub diff: f64,
}

impl ComparisonEntry {
    pub fn leader(&self) -> Leader {
        if self.percent_a > self.percent_b {
            Leader::GroupA
        } else {
            Leader::GroupB
        }
    }
}

/// The group with the higher percentage on a compared answer.
/// Equal percentages are attributed to the second group.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Leader {
    GroupA,
    GroupB,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Comparison {
    pub field: Field,
    pub group_a: String,
    pub group_b: String,
    /// Sorted by decreasing combined percentage of the two groups.
    pub entries: Vec<ComparisonEntry>,
    /// The answer on which the two groups differ the most.
    /// On ties, the first one in the order of `entries`. Since the answers of
    /// `group_a` come first among entries with equal combined shares, swapping
    /// the groups may select another answer.
    pub max_difference: Option<ComparisonEntry>,
}

impl Comparison {
    /// The name of the leading group on the largest difference, with the name of the other group.
    pub fn leading_groups(&self) -> Option<(&str, &str)> {
        self.max_difference.as_ref().map(|e| match e.leader() {
            Leader::GroupA => (self.group_a.as_str(), self.group_b.as_str()),
            Leader::GroupB => (self.group_b.as_str(), self.group_a.as_str()),
        })
    }
}

/// Errors that prevent the rows from being mapped to records.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ParseErrors {
    /// The input does not even contain a header line.
    MissingHeader,
    /// A column requested by the header mapping is not in the header.
    MissingColumn(String),
}

impl Error for ParseErrors {}

impl Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrors::MissingHeader => write!(f, "the survey export has no header line"),
            ParseErrors::MissingColumn(name) => {
                write!(f, "column {:?} was not found in the header", name)
            }
        }
    }
}
