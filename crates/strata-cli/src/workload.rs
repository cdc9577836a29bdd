//! Sample tree shape and the reader/writer contention scenario.
//!
//! The tree is `/sol/projP/folderK/fileC` with `fanout` entries on each of the
//! three lower levels, so it holds `2 + n + n² + n³` elements.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tracing::debug;

use strata_tree::{Generation, TreeResult};
use strata_types::PathKey;

use crate::config::StressConfig;
use crate::element::{ElementInfo, ElementKind};

/// Number of elements [`setup_element_tree`] creates, root included.
pub fn expected_count(fanout: usize) -> usize {
    2 + fanout + fanout * fanout + fanout * fanout * fanout
}

/// Populate `tree` below the root.
pub fn setup_element_tree(tree: &Generation<ElementInfo>, fanout: usize) -> TreeResult<()> {
    let sol = PathKey::ROOT.append("sol");
    tree.create_element(&sol, ElementInfo::new(ElementKind::Solution))?;
    for p in 0..fanout {
        let proj = sol.append(format!("proj{p}"));
        tree.create_element(&proj, ElementInfo::new(ElementKind::Project))?;
        for k in 0..fanout {
            let folder = proj.append(format!("folder{k}"));
            tree.create_element(&folder, ElementInfo::new(ElementKind::Folder))?;
            for c in 0..fanout {
                tree.create_element(
                    &folder.append(format!("file{c}")),
                    ElementInfo::new(ElementKind::File),
                )?;
            }
        }
    }
    Ok(())
}

/// Bump `touched` on every element below the root.
pub fn modify_tree(tree: &Generation<ElementInfo>) -> TreeResult<()> {
    let mut pending = tree.get_children(&PathKey::ROOT)?;
    while let Some(path) = pending.pop() {
        tree.open_element_data(&path, |info| info.touched += 1)?;
        pending.extend(tree.get_children(&path)?);
    }
    Ok(())
}

/// Delete every child of `path`.
pub fn delete_children(tree: &Generation<ElementInfo>, path: &PathKey) -> TreeResult<()> {
    for child in tree.get_children(path)? {
        tree.delete_element(&child)?;
    }
    Ok(())
}

/// Outcome of [`run_stress`].
#[derive(Debug)]
pub struct StressReport {
    pub reader_iterations: usize,
    pub writer_iterations: usize,
    pub min_visited: usize,
    pub max_visited: usize,
    pub total_visited: usize,
    pub final_count: usize,
    pub elapsed: Duration,
}

/// One reader walks a delta repeatedly while one writer keeps rebuilding it.
///
/// Fails if either thread panics or a walk visits more elements than a full
/// tree holds.
pub fn run_stress(config: &StressConfig) -> anyhow::Result<StressReport> {
    let fanout = config.fanout;
    let started = Instant::now();

    let base = Generation::with_root_data(ElementInfo::new(ElementKind::Root));
    setup_element_tree(&base, fanout)?;
    base.immutable();
    let tree = base.new_empty_delta()?;
    modify_tree(&tree)?;

    let reader_tree = tree.clone();
    let reader_iterations = config.reader_iterations;
    let reader = thread::spawn(move || {
        let (mut min, mut max, mut total) = (usize::MAX, 0usize, 0usize);
        for _ in 0..reader_iterations {
            let visited = reader_tree.iterate(&PathKey::ROOT, |_: &PathKey, _: &ElementInfo| true);
            min = min.min(visited);
            max = max.max(visited);
            total += visited;
        }
        (min, max, total)
    });

    let writer_tree = tree.clone();
    let writer_iterations = config.writer_iterations;
    let writer = thread::spawn(move || -> TreeResult<()> {
        for i in 0..writer_iterations {
            modify_tree(&writer_tree)?;
            delete_children(&writer_tree, &PathKey::ROOT)?;
            setup_element_tree(&writer_tree, fanout)?;
            if i % 100 == 0 {
                debug!(iteration = i, "writer progress");
            }
        }
        Ok(())
    });

    let (min, max, total) = reader
        .join()
        .map_err(|_| anyhow!("reader thread panicked"))?;
    writer
        .join()
        .map_err(|_| anyhow!("writer thread panicked"))??;

    let expected = expected_count(fanout);
    if reader_iterations > 0 && (min == 0 || max > expected) {
        return Err(anyhow!(
            "reader saw between {min} and {max} elements, expected 1..={expected}"
        ));
    }

    Ok(StressReport {
        reader_iterations,
        writer_iterations,
        min_visited: if reader_iterations == 0 { 0 } else { min },
        max_visited: max,
        total_visited: total,
        final_count: tree.element_count(),
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_tree_has_expected_size() {
        let tree = Generation::with_root_data(ElementInfo::default());
        setup_element_tree(&tree, 3).unwrap();
        assert_eq!(tree.element_count(), expected_count(3));
        assert_eq!(
            tree.get_element_data(&"/sol/proj2/folder1/file0".parse().unwrap())
                .unwrap()
                .kind,
            ElementKind::File
        );
    }

    #[test]
    fn modify_touches_everything_but_root() {
        let tree = Generation::with_root_data(ElementInfo::default());
        setup_element_tree(&tree, 2).unwrap();
        modify_tree(&tree).unwrap();
        modify_tree(&tree).unwrap();
        let touched: Vec<u64> = tree
            .walk(&PathKey::ROOT)
            .map(|(_, node)| node.data().touched)
            .collect();
        assert_eq!(touched[0], 0);
        assert!(touched[1..].iter().all(|&t| t == 2));
    }

    #[test]
    fn delete_children_leaves_root_only() {
        let tree = Generation::with_root_data(ElementInfo::default());
        setup_element_tree(&tree, 2).unwrap();
        delete_children(&tree, &PathKey::ROOT).unwrap();
        assert_eq!(tree.element_count(), 1);
    }

    #[test]
    fn stress_completes_with_consistent_counts() {
        let report = run_stress(&StressConfig {
            fanout: 2,
            reader_iterations: 500,
            writer_iterations: 50,
        })
        .unwrap();
        assert_eq!(report.final_count, expected_count(2));
        assert!(report.min_visited >= 1);
        assert!(report.max_visited <= expected_count(2));
        assert!(report.total_visited >= 500);
    }
}
