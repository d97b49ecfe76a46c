/*!
Tabulation of survey exports: parsing of the raw export into records, and
per-question distributions and comparisons between groups of respondents.

```
use survey_stats::parser::parse_records;
use survey_stats::*;

let text = "q1,q2,q3,q4,q5\nSí,No,Alta,Confiable,Quito\nSí,Sí,Baja,Confiable,GYE\n";
let records = parse_records(text);

let quito = filter_city(&records, &City::Quito);
let dist = compute_distribution(quito, Field::BrandAssociation);
assert_eq!(dist.valid_total, 1);
assert_eq!(dist.entries[0].name, "Alta");
assert_eq!(dist.entries[0].percent, 100.0);
```
*/
mod config;

pub mod builder;
pub mod manual;
pub mod narrative;
pub mod parser;

use log::{debug, info};

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

pub use crate::config::*;

/// Answers that stand for "no answer" in the exports.
const SENTINELS: [&str; 2] = ["nan", "null"];

/// A set of respondents to aggregate over.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Group {
    /// All the respondents, including those with an unrecognized city.
    All,
    City(City),
}

impl Group {
    pub fn matches(&self, record: &SurveyRecord) -> bool {
        match self {
            Group::All => true,
            Group::City(c) => record.city.as_ref() == Some(c),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Group::All => "General",
            Group::City(c) => c.as_str(),
        }
    }
}

/// The records of the respondents from the given city.
///
/// Records without a city or with an unrecognized one never match a known city.
pub fn filter_city<'a>(records: &'a [SurveyRecord], city: &City) -> Vec<&'a SurveyRecord> {
    records
        .iter()
        .filter(|r| r.city.as_ref() == Some(city))
        .collect()
}

/// Counts the answers to a field over a subset of respondents.
///
/// Missing answers, empty answers and the `nan` / `null` placeholders are
/// ignored and do not count in the total. The entries are sorted by
/// decreasing count; answers with the same count keep the order in which
/// they were first seen.
pub fn compute_distribution<'a, I>(subset: I, field: Field) -> Distribution
where
    I: IntoIterator<Item = &'a SurveyRecord>,
{
    // Counts in order of first appearance.
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for record in subset {
        let label = match valid_answer(record.get(field)) {
            Some(label) => label,
            None => continue,
        };
        if let Some(&idx) = positions.get(&label) {
            counts[idx].1 += 1;
        } else {
            positions.insert(label.clone(), counts.len());
            counts.push((label, 1));
        }
    }

    let valid_total: u64 = counts.iter().map(|(_, c)| *c).sum();
    let mut entries: Vec<DistributionEntry> = counts
        .into_iter()
        .map(|(name, value)| DistributionEntry {
            name,
            value,
            percent: percentage(value, valid_total),
        })
        .collect();
    // Stable sort: ties stay in order of appearance.
    entries.sort_by(|a, b| b.value.cmp(&a.value));
    debug!(
        "compute_distribution: field: {} valid_total: {} entries: {:?}",
        field, valid_total, entries
    );

    Distribution {
        field,
        valid_total,
        entries,
    }
}

/// Compares the answers to a field between two subsets of respondents.
///
/// Arguments:
/// * `subset_a`, `subset_b` the two groups of respondents
/// * `field` the question to compare
/// * `group_a`, `group_b` the names of the two groups, used in the result
pub fn compute_comparison<'a, 'b, I, J>(
    subset_a: I,
    subset_b: J,
    field: Field,
    group_a: &str,
    group_b: &str,
) -> Comparison
where
    I: IntoIterator<Item = &'a SurveyRecord>,
    J: IntoIterator<Item = &'b SurveyRecord>,
{
    let dist_a = compute_distribution(subset_a, field);
    let dist_b = compute_distribution(subset_b, field);
    compare_distributions(&dist_a, &dist_b, group_a, group_b)
}

/// Builds the comparison out of two distributions of the same field.
///
/// An answer that only appears in one group counts as 0% in the other one.
/// The entries are sorted by decreasing combined percentage. Entries with the
/// same combined percentage keep the order in which they were first seen, the
/// answers of `dist_a` first, so the tie-break of the maximum difference
/// depends on which group is passed first.
pub fn compare_distributions(
    dist_a: &Distribution,
    dist_b: &Distribution,
    group_a: &str,
    group_b: &str,
) -> Comparison {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut entries: Vec<ComparisonEntry> = Vec::new();
    for e in dist_a.entries.iter().chain(dist_b.entries.iter()) {
        if !seen.insert(e.name.as_str()) {
            continue;
        }
        let percent_a = dist_a.percent_of(&e.name).unwrap_or(0.0);
        let percent_b = dist_b.percent_of(&e.name).unwrap_or(0.0);
        entries.push(ComparisonEntry {
            name: e.name.clone(),
            percent_a,
            percent_b,
            diff: (percent_a - percent_b).abs(),
        });
    }
    entries.sort_by(|x, y| {
        (y.percent_a + y.percent_b)
            .partial_cmp(&(x.percent_a + x.percent_b))
            .unwrap_or(Ordering::Equal)
    });

    let max_difference = find_max_difference(&entries).cloned();
    debug!(
        "compare_distributions: field: {} {} vs {}: max difference: {:?}",
        dist_a.field, group_a, group_b, max_difference
    );

    Comparison {
        field: dist_a.field,
        group_a: group_a.to_string(),
        group_b: group_b.to_string(),
        entries,
        max_difference,
    }
}

/// The entry with the largest difference. On ties, the first one is kept.
fn find_max_difference(entries: &[ComparisonEntry]) -> Option<&ComparisonEntry> {
    let mut res: Option<&ComparisonEntry> = None;
    for e in entries.iter() {
        match res {
            Some(best) if best.diff >= e.diff => {}
            _ => res = Some(e),
        }
    }
    res
}

fn valid_answer(raw: Option<&str>) -> Option<String> {
    let v = raw?.trim();
    if v.is_empty() || SENTINELS.iter().any(|s| v.eq_ignore_ascii_case(s)) {
        return None;
    }
    let v = v.strip_prefix('"').unwrap_or(v);
    let v = v.strip_suffix('"').unwrap_or(v);
    Some(v.to_string())
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64) / (total as f64) * 100.0
    }
}

/// Holds the records of one load and memoizes the distributions per group and field.
///
/// The memoization is only there to avoid recomputing the same table
/// several times when building a report.
pub struct Tabulator {
    records: Vec<SurveyRecord>,
    cache: HashMap<(Group, Field), Distribution>,
}

impl Tabulator {
    pub fn new(records: Vec<SurveyRecord>) -> Tabulator {
        info!("Tabulator: processing {:?} records", records.len());
        Tabulator {
            records,
            cache: HashMap::new(),
        }
    }

    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    pub fn subset(&self, group: &Group) -> Vec<&SurveyRecord> {
        self.records.iter().filter(|r| group.matches(r)).collect()
    }

    /// The number of respondents in the group, whether they answered or not.
    pub fn respondents(&self, group: &Group) -> usize {
        self.records.iter().filter(|r| group.matches(r)).count()
    }

    /// The records that do not belong to any known city.
    pub fn unrecognized_city_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !matches!(&r.city, Some(c) if c.is_recognized()))
            .count()
    }

    pub fn distribution(&mut self, group: &Group, field: Field) -> &Distribution {
        let records = &self.records;
        self.cache
            .entry((group.clone(), field))
            .or_insert_with(|| {
                compute_distribution(records.iter().filter(|r| group.matches(r)), field)
            })
    }

    pub fn comparison(&mut self, group_a: &Group, group_b: &Group, field: Field) -> Comparison {
        let dist_a = self.distribution(group_a, field).clone();
        let dist_b = self.distribution(group_b, field);
        compare_distributions(&dist_a, dist_b, group_a.label(), group_b.label())
    }

    pub fn cached_tables(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::builder::RecordBuilder;
    use super::parser::parse_records;
    use super::*;

    fn rec(city: &str, price: &str) -> SurveyRecord {
        RecordBuilder::new()
            .answer(Field::City, city)
            .answer(Field::PricePerception, price)
            .build()
    }

    fn sample() -> Vec<SurveyRecord> {
        vec![
            rec("Quito", "Más bajos"),
            rec("Quito", "Iguales"),
            rec("Quito", "Más bajos"),
            rec("Quito", "nan"),
            rec("Guayaquil", "Más altos"),
            rec("Guayaquil", "Más bajos"),
            rec("Guayaquil", "NULL"),
            rec("Guayaquil", ""),
            rec("Cuenca", "Más altos"),
        ]
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }

    #[test]
    fn distribution_counts_valid_answers_only() {
        let records = sample();
        let quito = filter_city(&records, &City::Quito);
        assert_eq!(quito.len(), 4);
        let dist = compute_distribution(quito, Field::PricePerception);
        assert_eq!(dist.valid_total, 3);
        assert_eq!(dist.entries.len(), 2);
        assert_eq!(dist.entries[0].name, "Más bajos");
        assert_eq!(dist.entries[0].value, 2);
        assert_close(dist.entries[0].percent, 200.0 / 3.0);
        assert_eq!(dist.entries[1].name, "Iguales");
        let sum: f64 = dist.entries.iter().map(|e| e.percent).sum();
        assert_close(sum, 100.0);
    }

    #[test]
    fn distribution_ties_keep_first_seen_order() {
        let records = vec![
            rec("Quito", "B"),
            rec("Quito", "A"),
            rec("Quito", "C"),
            rec("Quito", "A"),
            rec("Quito", "C"),
        ];
        let dist = compute_distribution(&records, Field::PricePerception);
        let names: Vec<&str> = dist.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "B"]);
    }

    #[test]
    fn distribution_is_case_sensitive_on_answers() {
        let records = vec![rec("Quito", "Alta"), rec("Quito", "alta")];
        let dist = compute_distribution(&records, Field::PricePerception);
        assert_eq!(dist.entries.len(), 2);
        assert_close(dist.entries[0].percent, 50.0);
    }

    #[test]
    fn distribution_strips_leftover_quotes() {
        let mut r = SurveyRecord::default();
        r.price_perception = Some("\"Alta\"".to_string());
        let dist = compute_distribution(&[r, rec("Quito", "Alta")], Field::PricePerception);
        assert_eq!(dist.entries.len(), 1);
        assert_eq!(dist.entries[0].value, 2);
    }

    #[test]
    fn empty_subsets_give_empty_distributions() {
        let nobody: Vec<SurveyRecord> = Vec::new();
        let dist = compute_distribution(&nobody, Field::ExpertTrust);
        assert_eq!(dist.valid_total, 0);
        assert!(dist.is_empty());

        let records = vec![rec("Quito", "nan"), rec("Quito", " ")];
        let dist = compute_distribution(&records, Field::PricePerception);
        assert_eq!(dist.valid_total, 0);
        assert!(dist.entries.iter().all(|e| e.percent == 0.0));
        assert!(dist.is_empty());
    }

    #[test]
    fn single_record_without_answer() {
        let records = parse_records("h1,h2,h3,h4,h5\n\"Sí\",\"Alta\",,\"Neutro\",\"Quito\"");
        let dist = compute_distribution(&records, Field::BrandAssociation);
        assert_eq!(dist.valid_total, 0);
        assert!(dist.is_empty());
    }

    #[test]
    fn percentage_guards_division_by_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    #[test]
    fn comparison_merges_labels() {
        let records = sample();
        let cmp = compute_comparison(
            filter_city(&records, &City::Quito),
            filter_city(&records, &City::Guayaquil),
            Field::PricePerception,
            "Quito",
            "Guayaquil",
        );
        assert_eq!(cmp.entries.len(), 3);
        // Sorted by combined percentage: 66.7 + 50, 0 + 50, 33.3 + 0
        assert_eq!(cmp.entries[0].name, "Más bajos");
        assert_eq!(cmp.entries[1].name, "Más altos");
        assert_eq!(cmp.entries[2].name, "Iguales");
        let altos = &cmp.entries[1];
        assert_close(altos.percent_a, 0.0);
        assert_close(altos.percent_b, 50.0);
        assert_close(altos.diff, 50.0);

        let max = cmp.max_difference.clone().unwrap();
        assert_eq!(max.name, "Más altos");
        assert_eq!(max.leader(), Leader::GroupB);
        assert_eq!(cmp.leading_groups(), Some(("Guayaquil", "Quito")));
    }

    #[test]
    fn comparison_is_symmetric() {
        let records = sample();
        let quito = filter_city(&records, &City::Quito);
        let gye = filter_city(&records, &City::Guayaquil);
        let ab = compute_comparison(
            quito.clone(),
            gye.clone(),
            Field::PricePerception,
            "Quito",
            "Guayaquil",
        );
        let ba = compute_comparison(gye, quito, Field::PricePerception, "Guayaquil", "Quito");
        assert_eq!(ab.entries.len(), ba.entries.len());
        for e in ab.entries.iter() {
            let other = ba.entries.iter().find(|x| x.name == e.name).unwrap();
            assert_eq!(e.percent_a, other.percent_b);
            assert_eq!(e.percent_b, other.percent_a);
            assert_eq!(e.diff, other.diff);
        }
    }

    #[test]
    fn max_difference_ties_pick_the_first_entry() {
        let a = vec![rec("Quito", "X"), rec("Quito", "Y")];
        let b = vec![rec("Quito", "Z"), rec("Quito", "W")];
        let cmp = compute_comparison(&a, &b, Field::PricePerception, "A", "B");
        // All the entries have a difference of 50 and a combined share of 50.
        assert_eq!(cmp.max_difference.unwrap().name, "X");
    }

    #[test]
    fn max_difference_ties_follow_the_order_of_the_groups() {
        let a = vec![rec("Quito", "X"), rec("Quito", "Y")];
        let b = vec![rec("Quito", "Y"), rec("Quito", "Z")];
        let cmp = compute_comparison(&a, &b, Field::PricePerception, "A", "B");
        assert_eq!(cmp.max_difference.as_ref().unwrap().name, "X");
        assert_eq!(cmp.leading_groups(), Some(("A", "B")));

        let swapped = compute_comparison(&b, &a, Field::PricePerception, "B", "A");
        assert_eq!(swapped.max_difference.as_ref().unwrap().name, "Z");
        assert_eq!(swapped.leading_groups(), Some(("B", "A")));
    }

    #[test]
    fn comparison_of_empty_groups() {
        let nobody: Vec<SurveyRecord> = Vec::new();
        let cmp = compute_comparison(&nobody, &nobody, Field::PricePerception, "A", "B");
        assert!(cmp.entries.is_empty());
        assert_eq!(cmp.max_difference, None);
        assert_eq!(cmp.leading_groups(), None);
    }

    #[test]
    fn equal_shares_lead_to_the_second_group() {
        let a = vec![rec("Quito", "X")];
        let b = vec![rec("Guayaquil", "X")];
        let cmp = compute_comparison(&a, &b, Field::PricePerception, "A", "B");
        let max = cmp.max_difference.unwrap();
        assert_eq!(max.diff, 0.0);
        assert_eq!(max.leader(), Leader::GroupB);
    }

    #[test]
    fn unrecognized_cities_only_count_in_the_overall_group() {
        let mut tab = Tabulator::new(sample());
        assert_eq!(tab.respondents(&Group::All), 9);
        assert_eq!(tab.respondents(&Group::City(City::Quito)), 4);
        assert_eq!(tab.respondents(&Group::City(City::Guayaquil)), 4);
        assert_eq!(tab.unrecognized_city_count(), 1);

        let all = tab.distribution(&Group::All, Field::PricePerception).clone();
        assert_eq!(all.valid_total, 6);
        assert_eq!(all.entries[0].name, "Más bajos");
        assert_eq!(all.entries[1].name, "Más altos");
        assert_eq!(all.entries[1].value, 2);
    }

    #[test]
    fn tabulator_memoizes_tables() {
        init_logger();
        let mut tab = Tabulator::new(sample());
        let quito = Group::City(City::Quito);
        let gye = Group::City(City::Guayaquil);
        let first = tab.distribution(&quito, Field::PricePerception).clone();
        assert_eq!(tab.cached_tables(), 1);
        let second = tab.distribution(&quito, Field::PricePerception).clone();
        assert_eq!(first, second);
        assert_eq!(tab.cached_tables(), 1);

        let cmp = tab.comparison(&quito, &gye, Field::PricePerception);
        assert_eq!(tab.cached_tables(), 2);
        assert_eq!(cmp.group_a, "Quito");
        assert_eq!(cmp.group_b, "Guayaquil");
        assert_eq!(
            cmp,
            compute_comparison(
                tab.subset(&quito),
                tab.subset(&gye),
                Field::PricePerception,
                "Quito",
                "Guayaquil"
            )
        );
    }
}
