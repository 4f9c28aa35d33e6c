use std::collections::HashMap;

/// One observation contributing to a mode vote: the value itself plus the
/// `productid` it came from, used as the final tie-break.
pub struct Observation<T> {
    pub value: T,
    pub productid: i64,
}

/// Selects the value with the highest occurrence count; ties broken
/// lexicographically (`Ord`), then by the smallest contributing `productid`
/// (§4.G Stage 3/4, Design Note "Consensus selection with ties"). Panics if
/// `observations` is empty — callers only invoke this over groups known to
/// have at least one contributing row.
pub fn mode_with_tiebreak<T>(observations: &[Observation<T>]) -> T
where
    T: Clone + Eq + Ord + std::hash::Hash,
{
    assert!(!observations.is_empty(), "mode_with_tiebreak requires at least one observation");

    let mut counts: HashMap<&T, usize> = HashMap::new();
    let mut best_productid: HashMap<&T, i64> = HashMap::new();

    for obs in observations {
        *counts.entry(&obs.value).or_insert(0) += 1;
        best_productid
            .entry(&obs.value)
            .and_modify(|p| *p = (*p).min(obs.productid))
            .or_insert(obs.productid);
    }

    counts
        .into_iter()
        .max_by(|(value_a, count_a), (value_b, count_b)| {
            count_a
                .cmp(count_b)
                .then_with(|| value_b.cmp(value_a)) // lexicographically smaller wins, so reverse for max_by
                .then_with(|| best_productid[value_b].cmp(&best_productid[value_a]))
        })
        .map(|(value, _)| value.clone())
        .expect("non-empty observations guarantee a winner")
}

/// Like [`mode_with_tiebreak`] but for `Option<T>` fields where `None` should
/// only win if it is the *sole* observed value (§4.G Stage 4).
pub fn mode_with_null_only_if_sole<T>(observations: &[Observation<Option<T>>]) -> Option<T>
where
    T: Clone + Eq + Ord + std::hash::Hash,
{
    let all_null = observations.iter().all(|obs| obs.value.is_none());
    if all_null {
        return None;
    }

    let present: Vec<Observation<T>> = observations
        .iter()
        .filter_map(|obs| {
            obs.value.clone().map(|value| Observation {
                value,
                productid: obs.productid,
            })
        })
        .collect();

    Some(mode_with_tiebreak(&present))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_highest_count() {
        let obs = vec![
            Observation { value: "Geography".to_string(), productid: 1 },
            Observation { value: "Geography".to_string(), productid: 2 },
            Observation { value: "geography".to_string(), productid: 3 },
        ];
        assert_eq!(mode_with_tiebreak(&obs), "Geography");
    }

    #[test]
    fn ties_break_lexicographically_then_by_productid() {
        let obs = vec![
            Observation { value: "Zebra".to_string(), productid: 5 },
            Observation { value: "Alpha".to_string(), productid: 9 },
        ];
        assert_eq!(mode_with_tiebreak(&obs), "Alpha");
    }

    #[test]
    fn ties_break_by_smallest_productid_when_value_identical_count_and_order() {
        let obs = vec![
            Observation { value: "Alpha".to_string(), productid: 9 },
            Observation { value: "Beta".to_string(), productid: 1 },
        ];
        // "Alpha" < "Beta" lexicographically, so it wins outright regardless of productid.
        assert_eq!(mode_with_tiebreak(&obs), "Alpha");
    }

    #[test]
    fn null_wins_only_if_sole_value() {
        let obs = vec![
            Observation { value: Some(7_i64), productid: 1 },
            Observation { value: None, productid: 2 },
        ];
        assert_eq!(mode_with_null_only_if_sole(&obs), Some(7));

        let all_null = vec![
            Observation { value: None::<i64>, productid: 1 },
            Observation { value: None, productid: 2 },
        ];
        assert_eq!(mode_with_null_only_if_sole(&all_null), None);
    }
}
