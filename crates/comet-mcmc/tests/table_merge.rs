use comet_core::{GeneSet, ScoreMethod};
use comet_mcmc::records::{
    fold_sample, merge_into, merge_tables, target_weight, OVERFLOW_THRESHOLD,
    SATURATED_TARGET_WEIGHT,
};
use comet_mcmc::{CanonicalKey, ChainTable, ResultRecord, SetRecord};
use proptest::prelude::*;

fn set(genes: &[&str], weight: f64) -> SetRecord {
    SetRecord {
        genes: GeneSet::new(genes.iter().copied()),
        weight,
        method: ScoreMethod::Binomial,
        probability: (-weight).exp(),
    }
}

#[test]
fn first_sighting_sums_weights() {
    let record = ResultRecord::first_sighting(vec![set(&["A", "B"], 1.5), set(&["C"], 0.5)]);
    assert_eq!(record.frequency, 1);
    assert_eq!(record.total_weight, 2.0);
    assert!((record.target_weight - 2.0f64.exp()).abs() < 1e-12);
}

#[test]
fn target_weight_saturates_at_threshold() {
    assert!(target_weight(699.999).is_finite());
    assert_eq!(target_weight(OVERFLOW_THRESHOLD), SATURATED_TARGET_WEIGHT);
    assert_eq!(target_weight(812.0), SATURATED_TARGET_WEIGHT);
}

#[test]
fn folding_counts_repeats_under_one_key() {
    let mut table = ChainTable::new();
    assert!(fold_sample(&mut table, vec![set(&["A", "B"], 2.0), set(&["C"], 1.0)]));
    assert!(!fold_sample(&mut table, vec![set(&["C"], 1.0), set(&["B", "A"], 2.0)]));
    assert_eq!(table.len(), 1);
    let key = CanonicalKey::from_groups(vec![vec!["A", "B"], vec!["C"]]);
    assert_eq!(table[&key].frequency, 2);
}

#[test]
fn merge_keeps_first_seen_content() {
    let mut first = ChainTable::new();
    fold_sample(&mut first, vec![set(&["A"], 3.0)]);
    let mut second = ChainTable::new();
    fold_sample(&mut second, vec![set(&["A"], 9.0)]);
    fold_sample(&mut second, vec![set(&["B"], 1.0)]);

    merge_into(&mut first, &second);
    let a = CanonicalKey::from_groups(vec![vec!["A"]]);
    assert_eq!(first[&a].frequency, 2);
    assert_eq!(first[&a].total_weight, 3.0);
    assert_eq!(first.len(), 2);
}

fn table_from(keys: &[u8]) -> ChainTable {
    let mut table = ChainTable::new();
    for key in keys {
        let gene = format!("G{key}");
        fold_sample(&mut table, vec![set(&[gene.as_str()], f64::from(*key))]);
    }
    table
}

proptest! {
    #[test]
    fn merged_frequencies_do_not_depend_on_chain_order(
        a in prop::collection::vec(0u8..6, 0..20),
        b in prop::collection::vec(0u8..6, 0..20),
    ) {
        let (left, right) = (table_from(&a), table_from(&b));
        let forward = merge_tables([&left, &right]);
        let backward = merge_tables([&right, &left]);
        prop_assert_eq!(forward.len(), backward.len());
        for (key, record) in &forward {
            prop_assert_eq!(record.frequency, backward[key].frequency);
        }
        let total: u64 = forward.values().map(|record| record.frequency).sum();
        prop_assert_eq!(total, (a.len() + b.len()) as u64);
    }
}
