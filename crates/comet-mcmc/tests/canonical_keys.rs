use comet_core::GeneSet;
use comet_mcmc::CanonicalKey;
use proptest::prelude::*;

#[test]
fn key_sorts_genes_and_sets() {
    let key = CanonicalKey::from_groups(vec![vec!["KRAS", "EGFR"], vec!["TP53", "CDKN2A", "AKT1"]]);
    assert_eq!(key.as_str(), "AKT1,CDKN2A,TP53 EGFR,KRAS");
}

#[test]
fn gene_sets_and_raw_groups_agree() {
    let sets = vec![GeneSet::new(["B", "A"]), GeneSet::new(["C"])];
    let from_sets = CanonicalKey::from_sets(&sets);
    let from_groups = CanonicalKey::from_groups(vec![vec!["C"], vec!["A", "B"]]);
    assert_eq!(from_sets, from_groups);
    assert_eq!(from_sets.to_string(), "A,B C");
}

fn collection() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::btree_set("[A-Z][A-Z0-9]{0,4}", 1..4), 1..4).prop_map(
        |sets| {
            sets.into_iter()
                .map(|set| set.into_iter().collect())
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn key_ignores_gene_and_set_order(groups in collection(), seed in any::<u64>()) {
        let mut shuffled = groups.clone();
        let rotation = (seed as usize) % shuffled.len();
        shuffled.rotate_left(rotation);
        for group in &mut shuffled {
            group.reverse();
        }
        prop_assert_eq!(
            CanonicalKey::from_groups(&groups),
            CanonicalKey::from_groups(&shuffled)
        );
    }
}
