use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

/// BFS tree-level computation for one canonical dimension's members (§4.G
/// Stage 4). Roots are members whose `parent_member_id` is `None` or refers
/// to an id absent from `members` itself; roots get level 1, children level
/// `parent + 1`. Returns `None` for the whole dimension if a cycle is
/// detected — members in a cycle are never reachable from any root, so a
/// final count mismatch is exactly the cycle signal.
pub fn compute_tree_levels(members: &[(i64, Option<i64>)]) -> Option<HashMap<i64, i32>> {
    let ids: HashSet<i64> = members.iter().map(|(id, _)| *id).collect();

    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut roots = Vec::new();
    for (id, parent) in members {
        match parent {
            Some(parent_id) if ids.contains(parent_id) => {
                children.entry(*parent_id).or_default().push(*id);
            }
            _ => roots.push(*id),
        }
    }

    let mut levels: HashMap<i64, i32> = HashMap::new();
    let mut queue: VecDeque<(i64, i32)> = VecDeque::new();
    for root in &roots {
        levels.insert(*root, 1);
        queue.push_back((*root, 1));
    }

    while let Some((id, level)) = queue.pop_front() {
        let Some(kids) = children.get(&id) else { continue };
        for kid in kids {
            if levels.contains_key(kid) {
                continue;
            }
            levels.insert(*kid, level + 1);
            queue.push_back((*kid, level + 1));
        }
    }

    if levels.len() != members.len() {
        warn!(
            total = members.len(),
            reachable = levels.len(),
            "cycle detected in dimension parent-child edges; leaving tree_level null for all members"
        );
        return None;
    }
    Some(levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_levels_from_roots() {
        let members = vec![(1, None), (2, Some(1)), (3, Some(2)), (4, Some(1))];
        let levels = compute_tree_levels(&members).expect("no cycle");
        assert_eq!(levels[&1], 1);
        assert_eq!(levels[&2], 2);
        assert_eq!(levels[&3], 3);
        assert_eq!(levels[&4], 2);
    }

    #[test]
    fn detects_simple_cycle() {
        let members = vec![(1, Some(2)), (2, Some(1))];
        assert!(compute_tree_levels(&members).is_none());
    }

    #[test]
    fn treats_dangling_parent_reference_as_root() {
        let members = vec![(1, Some(999))];
        let levels = compute_tree_levels(&members).expect("dangling parent is not a cycle");
        assert_eq!(levels[&1], 1);
    }

    #[test]
    fn self_loop_is_detected_as_cycle() {
        let members = vec![(1, Some(1)), (2, None)];
        assert!(compute_tree_levels(&members).is_none());
    }
}
