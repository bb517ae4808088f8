//! Beneficiary reach breakdowns.
//!
//! Every project carries a count of direct and indirect beneficiaries for a
//! fixed set of eight categories. Stored payloads may omit categories; they
//! are normalized on deserialization so all eight keys are always present.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// A beneficiary category key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryCategory {
    ChildrenGirls,
    ChildrenBoys,
    AdultsWomen,
    AdultsMen,
    Households,
    Idps,
    Returnees,
    PersonsWithDisabilities,
}

impl BeneficiaryCategory {
    /// All categories in display order.
    pub const ALL: [BeneficiaryCategory; 8] = [
        Self::ChildrenGirls,
        Self::ChildrenBoys,
        Self::AdultsWomen,
        Self::AdultsMen,
        Self::Households,
        Self::Idps,
        Self::Returnees,
        Self::PersonsWithDisabilities,
    ];

    /// Storage key used in JSON payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChildrenGirls => "children_girls",
            Self::ChildrenBoys => "children_boys",
            Self::AdultsWomen => "adults_women",
            Self::AdultsMen => "adults_men",
            Self::Households => "households",
            Self::Idps => "idps",
            Self::Returnees => "returnees",
            Self::PersonsWithDisabilities => "persons_with_disabilities",
        }
    }

    /// Human-readable label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChildrenGirls => "Girls (under 18)",
            Self::ChildrenBoys => "Boys (under 18)",
            Self::AdultsWomen => "Women",
            Self::AdultsMen => "Men",
            Self::Households => "Households",
            Self::Idps => "IDPs",
            Self::Returnees => "Returnees",
            Self::PersonsWithDisabilities => "Persons with disabilities",
        }
    }

    /// Parse a storage key.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown beneficiary category '{s}'")))
    }

    /// Whether the category counts toward per-project totals by default.
    ///
    /// Households overlap with the individual categories, so they are
    /// excluded unless a project opts in.
    pub fn included_by_default(&self) -> bool {
        !matches!(self, Self::Households)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

/// Direct and indirect reach for a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BeneficiaryCount {
    pub direct: u64,
    pub indirect: u64,
    pub include_in_totals: bool,
}

impl BeneficiaryCount {
    /// Zero counts with the category's default inclusion flag.
    pub fn empty(category: BeneficiaryCategory) -> Self {
        Self {
            direct: 0,
            indirect: 0,
            include_in_totals: category.included_by_default(),
        }
    }
}

/// A stored count where any field may be missing.
#[derive(Debug, Default, Deserialize)]
pub struct PartialCount {
    pub direct: Option<u64>,
    pub indirect: Option<u64>,
    pub include_in_totals: Option<bool>,
}

/// Summed direct and indirect reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachTotals {
    pub direct: u64,
    pub indirect: u64,
}

impl ReachTotals {
    /// Accumulate `other`, saturating at `u64::MAX`.
    pub fn add(&mut self, other: ReachTotals) {
        self.direct = self.direct.saturating_add(other.direct);
        self.indirect = self.indirect.saturating_add(other.indirect);
    }

    /// Larger of the two values.
    pub fn peak(&self) -> u64 {
        self.direct.max(self.indirect)
    }
}

// ---------------------------------------------------------------------------
// Breakdown
// ---------------------------------------------------------------------------

/// Per-category beneficiary counts for one project.
///
/// Always holds all eight categories. Serializes as a JSON object keyed by
/// [`BeneficiaryCategory::as_str`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, PartialCount>")]
pub struct BeneficiaryBreakdown {
    counts: [BeneficiaryCount; 8],
}

impl Default for BeneficiaryBreakdown {
    fn default() -> Self {
        Self {
            counts: BeneficiaryCategory::ALL.map(BeneficiaryCount::empty),
        }
    }
}

impl BeneficiaryBreakdown {
    pub fn get(&self, category: BeneficiaryCategory) -> &BeneficiaryCount {
        &self.counts[category.index()]
    }

    pub fn set(&mut self, category: BeneficiaryCategory, count: BeneficiaryCount) {
        self.counts[category.index()] = count;
    }

    /// Builder-style setter for direct and indirect counts.
    pub fn with_reach(mut self, category: BeneficiaryCategory, direct: u64, indirect: u64) -> Self {
        let slot = &mut self.counts[category.index()];
        slot.direct = direct;
        slot.indirect = indirect;
        self
    }

    /// Iterate categories in display order.
    pub fn iter(&self) -> impl Iterator<Item = (BeneficiaryCategory, &BeneficiaryCount)> {
        BeneficiaryCategory::ALL.into_iter().zip(self.counts.iter())
    }

    /// Reach for a category, ignoring the inclusion flag.
    pub fn reach(&self, category: BeneficiaryCategory) -> ReachTotals {
        let count = self.get(category);
        ReachTotals {
            direct: count.direct,
            indirect: count.indirect,
        }
    }

    /// Project totals over the categories flagged `include_in_totals`.
    pub fn totals(&self) -> ReachTotals {
        self.iter()
            .filter(|(_, c)| c.include_in_totals)
            .fold(ReachTotals::default(), |mut acc, (_, c)| {
                acc.add(ReachTotals {
                    direct: c.direct,
                    indirect: c.indirect,
                });
                acc
            })
    }
}

impl From<BTreeMap<String, PartialCount>> for BeneficiaryBreakdown {
    fn from(raw: BTreeMap<String, PartialCount>) -> Self {
        let mut breakdown = Self::default();
        for (key, partial) in raw {
            // Unknown keys are ignored so older payloads keep loading.
            let Ok(category) = BeneficiaryCategory::from_str_value(&key) else {
                continue;
            };
            breakdown.set(
                category,
                BeneficiaryCount {
                    direct: partial.direct.unwrap_or(0),
                    indirect: partial.indirect.unwrap_or(0),
                    include_in_totals: partial
                        .include_in_totals
                        .unwrap_or_else(|| category.included_by_default()),
                },
            );
        }
        breakdown
    }
}

impl Serialize for BeneficiaryBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (category, count) in self.iter() {
            map.serialize_entry(category.as_str(), count)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_breakdown_has_all_categories_zeroed() {
        let b = BeneficiaryBreakdown::default();
        assert_eq!(b.iter().count(), 8);
        assert!(b.iter().all(|(_, c)| c.direct == 0 && c.indirect == 0));
    }

    #[test]
    fn households_excluded_by_default() {
        let b = BeneficiaryBreakdown::default();
        assert!(!b.get(BeneficiaryCategory::Households).include_in_totals);
        assert!(b.get(BeneficiaryCategory::AdultsWomen).include_in_totals);
    }

    #[test]
    fn partial_payload_normalizes_missing_keys() {
        let json = serde_json::json!({
            "households": { "direct": 10 },
            "adults_men": { "direct": 3, "indirect": 4, "include_in_totals": false },
        });
        let b: BeneficiaryBreakdown = serde_json::from_value(json).unwrap();

        let hh = b.get(BeneficiaryCategory::Households);
        assert_eq!(hh.direct, 10);
        assert_eq!(hh.indirect, 0);
        assert!(!hh.include_in_totals);

        let men = b.get(BeneficiaryCategory::AdultsMen);
        assert_eq!((men.direct, men.indirect), (3, 4));
        assert!(!men.include_in_totals);

        assert_eq!(
            b.get(BeneficiaryCategory::Idps),
            &BeneficiaryCount::empty(BeneficiaryCategory::Idps)
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let json = serde_json::json!({ "elders": { "direct": 99 } });
        let b: BeneficiaryBreakdown = serde_json::from_value(json).unwrap();
        assert_eq!(b, BeneficiaryBreakdown::default());
    }

    #[test]
    fn negative_counts_are_rejected() {
        let json = serde_json::json!({ "idps": { "direct": -1 } });
        assert!(serde_json::from_value::<BeneficiaryBreakdown>(json).is_err());
    }

    #[test]
    fn serializes_every_key_in_display_order() {
        let json = serde_json::to_value(BeneficiaryBreakdown::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 8);
        assert_eq!(obj["households"]["include_in_totals"], false);
    }

    #[test]
    fn totals_honor_inclusion_flags() {
        let b = BeneficiaryBreakdown::default()
            .with_reach(BeneficiaryCategory::AdultsWomen, 5, 7)
            .with_reach(BeneficiaryCategory::Households, 100, 100);
        assert_eq!(
            b.totals(),
            ReachTotals {
                direct: 5,
                indirect: 7
            }
        );
    }

    #[test]
    fn totals_include_opted_in_households() {
        let mut b =
            BeneficiaryBreakdown::default().with_reach(BeneficiaryCategory::Households, 4, 0);
        let mut hh = *b.get(BeneficiaryCategory::Households);
        hh.include_in_totals = true;
        b.set(BeneficiaryCategory::Households, hh);
        assert_eq!(b.totals().direct, 4);
    }

    #[test]
    fn reach_totals_saturate_at_max() {
        let mut total = ReachTotals {
            direct: u64::MAX,
            indirect: 5,
        };
        total.add(ReachTotals {
            direct: 1,
            indirect: u64::MAX,
        });
        assert_eq!(total.direct, u64::MAX);
        assert_eq!(total.indirect, u64::MAX);
    }

    #[test]
    fn project_totals_saturate_on_huge_counts() {
        let b = BeneficiaryBreakdown::default()
            .with_reach(BeneficiaryCategory::Idps, u64::MAX, 0)
            .with_reach(BeneficiaryCategory::Returnees, 1, 2);
        assert_eq!(
            b.totals(),
            ReachTotals {
                direct: u64::MAX,
                indirect: 2
            }
        );
    }

    #[test]
    fn category_round_trips_through_storage_key() {
        for c in BeneficiaryCategory::ALL {
            assert_eq!(BeneficiaryCategory::from_str_value(c.as_str()).unwrap(), c);
        }
        assert!(BeneficiaryCategory::from_str_value("nope").is_err());
    }
}
