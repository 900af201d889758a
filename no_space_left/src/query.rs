use tracing::debug;

use crate::config::Config;
use crate::error::FsError;
use crate::path::DirPath;
use crate::transcript::build_tree;
use crate::tree::DirectoryTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answers {
    pub bounded_sum: u64,
    pub min_deletion: u64,
}

/// Sum of the totals of every directory of at most `threshold` bytes.
/// Nested directories count once for themselves and again inside each parent.
pub fn bounded_sum(tree: &DirectoryTree, threshold: u64) -> Result<u64, FsError> {
    let sum: u64 = tree
        .sizes()?
        .into_values()
        .filter(|&size| size <= threshold)
        .sum();

    debug!("directories up to {threshold} sum to {sum}");
    Ok(sum)
}

/// Size of the smallest directory that frees enough space when deleted.
pub fn min_deletion(
    tree: &DirectoryTree,
    capacity: u64,
    required_free: u64,
) -> Result<u64, FsError> {
    let used = tree.total_size(&DirPath::root())?;
    let current_free = i128::from(capacity) - i128::from(used);
    let deficit = i128::from(required_free) - current_free;
    debug!("used {used} of {capacity}, need to free {deficit}");

    tree.sizes()?
        .into_values()
        .filter(|&size| i128::from(size) >= deficit)
        .min()
        .ok_or(FsError::NoCandidate { deficit })
}

pub fn size_smallest(
    input: impl Iterator<Item = impl AsRef<str>>,
    threshold: u64,
) -> Result<u64, FsError> {
    bounded_sum(&build_tree(input)?, threshold)
}

pub fn size_to_delete(
    input: impl Iterator<Item = impl AsRef<str>>,
    total: u64,
    needed: u64,
) -> Result<u64, FsError> {
    min_deletion(&build_tree(input)?, total, needed)
}

/// Both answers off a single pass over the transcript.
pub fn solve(
    input: impl Iterator<Item = impl AsRef<str>>,
    config: &Config,
) -> Result<Answers, FsError> {
    let tree = build_tree(input)?;
    answer(&tree, config)
}

pub fn answer(tree: &DirectoryTree, config: &Config) -> Result<Answers, FsError> {
    Ok(Answers {
        bounded_sum: bounded_sum(tree, config.size_threshold)?,
        min_deletion: min_deletion(tree, config.disk_capacity, config.required_free_space)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TEST_INPUT: &str = include_str!("../data/test_input");

    #[test]
    fn part1() {
        let res = size_smallest(TEST_INPUT.lines(), 100000);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), 95437);
    }

    #[test]
    fn part2() {
        let res = size_to_delete(TEST_INPUT.lines(), 70000000, 30000000);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), 24933642);
    }

    #[test]
    fn solve_with_defaults() {
        let res = solve(TEST_INPUT.lines(), &Config::default());
        assert_eq!(
            res.unwrap(),
            Answers {
                bounded_sum: 95437,
                min_deletion: 24933642,
            }
        );
    }

    #[rstest]
    #[case(584, 584)]
    #[case(94853, 95437)]
    #[case(0, 0)]
    fn bounded_sum_thresholds(#[case] threshold: u64, #[case] expected: u64) {
        let res = size_smallest(TEST_INPUT.lines(), threshold);
        assert_eq!(res.unwrap(), expected);
    }

    #[test]
    fn enough_free_space_picks_smallest_dir() {
        let res = size_to_delete(TEST_INPUT.lines(), 100000000, 30000000);
        assert_eq!(res.unwrap(), 584);
    }

    #[test]
    fn empty_dir_wins_when_nothing_needs_freeing() {
        let lines = ["$ cd /", "$ ls", "dir empty", "500 f"];
        let res = size_to_delete(lines.iter(), 1000, 10);
        assert_eq!(res.unwrap(), 0);
    }

    #[test]
    fn no_candidate_when_disk_too_small() {
        let res = size_to_delete(TEST_INPUT.lines(), 10000000, 30000000);
        assert!(matches!(
            res,
            Err(FsError::NoCandidate { deficit }) if deficit == 68381165
        ));
    }

    #[test]
    fn empty_tree_has_no_root() {
        let tree = DirectoryTree::new();
        assert!(matches!(
            min_deletion(&tree, 10, 5),
            Err(FsError::UnknownPath(p)) if p.is_root()
        ));
        assert_eq!(bounded_sum(&tree, 10).unwrap(), 0);
    }
}
