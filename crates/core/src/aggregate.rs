//! Portfolio aggregation over a filtered project set.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::beneficiary::{BeneficiaryCategory, ReachTotals};
use crate::snapshot::Project;

/// Summary metrics for a set of projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub project_count: usize,
    /// Direct and indirect reach per category. Every category is present.
    pub beneficiaries: BTreeMap<BeneficiaryCategory, ReachTotals>,
    /// Distinct provinces, sorted.
    pub provinces: Vec<String>,
    #[serde(serialize_with = "serialize_sorted")]
    pub sectors: HashSet<String>,
    #[serde(serialize_with = "serialize_sorted")]
    pub clusters: HashSet<String>,
}

fn serialize_sorted<S: serde::Serializer>(set: &HashSet<String>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(sorted(set))
}

impl PortfolioSummary {
    /// Combined reach across all categories.
    pub fn total_reach(&self) -> ReachTotals {
        self.beneficiaries
            .values()
            .fold(ReachTotals::default(), |mut acc, r| {
                acc.add(*r);
                acc
            })
    }

    /// Largest direct or indirect value across categories.
    pub fn peak_reach(&self) -> u64 {
        self.beneficiaries
            .values()
            .map(ReachTotals::peak)
            .max()
            .unwrap_or(0)
    }

    /// Sectors in sorted order, for stable display.
    pub fn sorted_sectors(&self) -> Vec<String> {
        sorted(&self.sectors)
    }

    /// Clusters in sorted order, for stable display.
    pub fn sorted_clusters(&self) -> Vec<String> {
        sorted(&self.clusters)
    }

    /// Combine two summaries computed over disjoint project sets.
    pub fn merge(mut self, other: PortfolioSummary) -> PortfolioSummary {
        self.project_count += other.project_count;
        for (category, reach) in other.beneficiaries {
            self.beneficiaries.entry(category).or_default().add(reach);
        }
        let mut provinces: Vec<String> = self.provinces;
        provinces.extend(other.provinces);
        self.provinces = sorted_unique(provinces);
        self.sectors.extend(other.sectors);
        self.clusters.extend(other.clusters);
        self
    }
}

fn sorted(set: &HashSet<String>) -> Vec<String> {
    let mut v: Vec<String> = set.iter().cloned().collect();
    v.sort();
    v
}

fn sorted_unique(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v.dedup();
    v
}

/// Reduce projects into a [`PortfolioSummary`].
///
/// Beneficiary counts are summed as stored; per-project inclusion flags
/// are not applied here.
pub fn aggregate(projects: &[&Project]) -> PortfolioSummary {
    let mut beneficiaries: BTreeMap<BeneficiaryCategory, ReachTotals> = BeneficiaryCategory::ALL
        .into_iter()
        .map(|c| (c, ReachTotals::default()))
        .collect();
    let mut provinces = Vec::new();
    let mut sectors = HashSet::new();
    let mut clusters = HashSet::new();

    for project in projects {
        for category in BeneficiaryCategory::ALL {
            beneficiaries
                .entry(category)
                .or_default()
                .add(project.beneficiaries.reach(category));
        }
        provinces.extend(project.provinces.iter().cloned());
        if !project.sector.is_empty() {
            sectors.insert(project.sector.clone());
        }
        clusters.extend(project.clusters.iter().cloned());
    }

    PortfolioSummary {
        project_count: projects.len(),
        beneficiaries,
        provinces: sorted_unique(provinces),
        sectors,
        clusters,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter_projects, ReportFilters};

    fn project(id: &str, sector: &str, provinces: &[&str], households: u64) -> Project {
        let mut p = Project::new(id, id, id);
        p.sector = sector.into();
        p.provinces = provinces.iter().map(|s| s.to_string()).collect();
        p.beneficiaries = p
            .beneficiaries
            .with_reach(BeneficiaryCategory::Households, households, households * 2);
        p
    }

    #[test]
    fn empty_input_yields_zeroed_categories() {
        let s = aggregate(&[]);
        assert_eq!(s.project_count, 0);
        assert_eq!(s.beneficiaries.len(), 8);
        assert_eq!(s.peak_reach(), 0);
        assert!(s.provinces.is_empty());
    }

    #[test]
    fn sums_direct_and_indirect_independently() {
        let a = project("a", "Health", &["Kabul"], 10);
        let b = project("b", "Health", &["Kabul"], 5);
        let s = aggregate(&[&a, &b]);
        assert_eq!(
            s.beneficiaries[&BeneficiaryCategory::Households],
            ReachTotals {
                direct: 15,
                indirect: 30
            }
        );
        assert_eq!(
            s.total_reach(),
            ReachTotals {
                direct: 15,
                indirect: 30
            }
        );
    }

    #[test]
    fn inclusion_flags_are_ignored() {
        // Households default to excluded from project totals.
        let a = project("a", "Health", &[], 10);
        assert_eq!(a.beneficiaries.totals().direct, 0);
        assert_eq!(aggregate(&[&a]).total_reach().direct, 10);
    }

    #[test]
    fn provinces_are_distinct_and_sorted() {
        let a = project("a", "Health", &["Kabul", "Balkh"], 0);
        let b = project("b", "Health", &["Balkh", "Herat", "balkh"], 0);
        let s = aggregate(&[&a, &b]);
        assert_eq!(s.provinces, vec!["Balkh", "Herat", "Kabul", "balkh"]);
    }

    #[test]
    fn merge_of_partition_equals_whole() {
        let a = project("a", "Health", &["Kabul"], 3);
        let b = project("b", "Education", &["Balkh"], 4);
        let c = project("c", "WASH", &["Kabul"], 5);

        let whole = aggregate(&[&a, &b, &c]);
        let parts = aggregate(&[&a]).merge(aggregate(&[&b, &c]));
        assert_eq!(whole, parts);
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let mut a = project("a", "Health", &[], 0);
        a.beneficiaries = a.beneficiaries.with_reach(BeneficiaryCategory::Idps, u64::MAX, 0);
        let mut b = project("b", "Health", &[], 0);
        b.beneficiaries = b.beneficiaries.with_reach(BeneficiaryCategory::Idps, 1, 0);

        let s = aggregate(&[&a, &b]);
        assert_eq!(s.beneficiaries[&BeneficiaryCategory::Idps].direct, u64::MAX);
        assert_eq!(s.total_reach().direct, u64::MAX);
        assert_eq!(s.peak_reach(), u64::MAX);

        let merged = aggregate(&[&a]).merge(aggregate(&[&b]));
        assert_eq!(merged, s);
    }

    #[test]
    fn example_scenario_year_2023() {
        let mut p1 = project("P1", "Health", &["Kabul"], 0);
        p1.beneficiaries = p1.beneficiaries.with_reach(BeneficiaryCategory::Households, 10, 0);
        p1.start_date = Some("2023-01-01".into());
        p1.end_date = Some("2023-12-31".into());
        let mut p2 = project("P2", "Education", &["Balkh"], 0);
        p2.beneficiaries = p2.beneficiaries.with_reach(BeneficiaryCategory::Households, 5, 0);
        p2.start_date = Some("2024-01-01".into());
        p2.end_date = Some("2024-12-31".into());
        let projects = vec![p1, p2];

        let filters = ReportFilters {
            years: vec![2023],
            ..Default::default()
        };
        let matching = filter_projects(&projects, &filters);
        let s = aggregate(&matching);

        assert_eq!(s.project_count, 1);
        assert_eq!(s.beneficiaries[&BeneficiaryCategory::Households].direct, 10);
        assert_eq!(s.provinces, vec!["Kabul"]);
        assert_eq!(s.sectors, HashSet::from(["Health".to_string()]));
    }
}
