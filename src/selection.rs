//! Big-cluster selection: group trajectory indices by label and keep the
//! largest groups, re-keyed by size rank.
//!
//! Ties between equally sized clusters go to the label that appears first
//! when scanning trajectories in index order. Which clusters get displayed
//! depends on this, so the ordering is part of the contract.

use std::collections::{BTreeMap, HashMap};

use log::debug;

/// The largest clusters, rank 0 first. Each group lists its trajectory
/// indices in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BigClusters {
    groups: Vec<Vec<usize>>,
}

impl BigClusters {
    /// Number of groups kept.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Members of the group at `rank`.
    pub fn members(&self, rank: usize) -> Option<&[usize]> {
        self.groups.get(rank).map(Vec::as_slice)
    }

    /// `(rank, members)` pairs, largest group first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.groups.iter().map(Vec::as_slice).enumerate()
    }

    /// Rank of the group containing trajectory `index`, if any.
    pub fn rank_of(&self, index: usize) -> Option<usize> {
        self.groups.iter().position(|g| g.binary_search(&index).is_ok())
    }

    /// Every trajectory in some big cluster, in rank order.
    pub fn all_members(&self) -> Vec<usize> {
        self.groups.iter().flatten().copied().collect()
    }

    /// Total number of trajectories across all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Indices in `0..trajectory_count` that are in no big cluster, i.e. the
    /// trajectories a renderer draws as background.
    pub fn background(&self, trajectory_count: usize) -> Vec<usize> {
        let mut in_group = vec![false; trajectory_count];
        for &i in self.groups.iter().flatten() {
            if i < trajectory_count {
                in_group[i] = true;
            }
        }
        (0..trajectory_count).filter(|&i| !in_group[i]).collect()
    }

    /// Rank to members mapping.
    pub fn to_map(&self) -> BTreeMap<usize, Vec<usize>> {
        self.groups.iter().cloned().enumerate().collect()
    }
}

/// Group trajectory indices by cluster label and return the `top_n` largest
/// groups. Fewer are returned when there are fewer distinct labels.
///
/// # Example
/// ```
/// use trajectory_cluster::select_top_clusters;
///
/// let big = select_top_clusters(&[7, 3, 3, 7, 9], 2);
/// assert_eq!(big.members(0), Some(&[0, 3][..])); // label 7 seen first
/// assert_eq!(big.members(1), Some(&[1, 2][..]));
/// ```
pub fn select_top_clusters(labels: &[usize], top_n: usize) -> BigClusters {
    // Groups in first-seen label order
    let mut slot_of: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (index, &label) in labels.iter().enumerate() {
        let slot = *slot_of.entry(label).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(index);
    }

    let distinct = groups.len();
    // Stable sort keeps first-seen order among equal sizes
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    groups.truncate(top_n);

    debug!(
        "[BigClusters] Kept {} of {} clusters (sizes {:?})",
        groups.len(),
        distinct,
        groups.iter().map(Vec::len).collect::<Vec<_>>()
    );

    BigClusters { groups }
}
