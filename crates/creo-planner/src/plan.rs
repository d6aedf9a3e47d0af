use std::collections::BTreeMap;

use creo_core::{PackageRecord, VersionStore};
use tracing::debug;

use crate::subsumption::SubsumptionTable;
use crate::types::{PlanStep, UpdatePlan};

/// Whether the remote record should be installed over the local state.
///
/// Only a strictly newer remote counter counts; a local counter ahead of the
/// remote one is left alone.
pub fn needs_install(local: &VersionStore, remote: &PackageRecord) -> bool {
    match local.get(remote.title()) {
        None => remote.version() > 0,
        Some(installed) => remote.is_newer_than(installed),
    }
}

pub fn plan(local: &VersionStore, remote: &VersionStore) -> UpdatePlan {
    plan_with_table(local, remote, &SubsumptionTable::launcher_default())
}

pub fn plan_with_table(
    local: &VersionStore,
    remote: &VersionStore,
    table: &SubsumptionTable,
) -> UpdatePlan {
    let draft: BTreeMap<&str, &PackageRecord> = remote
        .iter()
        .filter(|record| needs_install(local, record))
        .map(|record| (record.title(), record))
        .collect();

    let pruned = prune_subsumed(&draft, table);

    let mut steps = Vec::new();
    for record in remote.iter() {
        if !draft.contains_key(record.title()) || pruned.contains_key(record.title()) {
            continue;
        }

        let subsumed = remote
            .iter()
            .filter(|candidate| {
                covering_root(&pruned, candidate.title()) == Some(record.title())
            })
            .cloned()
            .collect();
        steps.push(PlanStep {
            package: record.clone(),
            subsumed,
        });
    }

    UpdatePlan { steps }
}

/// Maps each pruned title to the coarse title that pruned it.
fn prune_subsumed<'a>(
    draft: &BTreeMap<&'a str, &'a PackageRecord>,
    table: &SubsumptionTable,
) -> BTreeMap<&'a str, &'a str> {
    let mut coarse: Vec<&PackageRecord> = draft
        .values()
        .copied()
        .filter(|record| table.is_coarse(record.title()))
        .collect();
    coarse.sort_by(|a, b| {
        b.version()
            .cmp(&a.version())
            .then_with(|| a.title().cmp(b.title()))
    });

    let mut pruned: BTreeMap<&str, &str> = BTreeMap::new();
    for parent in coarse {
        if pruned.contains_key(parent.title()) {
            continue;
        }
        for title in table.subsumed_by(parent.title()) {
            let Some(&child) = draft.get(title.as_str()) else {
                continue;
            };
            if child.version() > parent.version() || pruned.contains_key(child.title()) {
                continue;
            }
            debug!(
                package = child.title(),
                version = child.version(),
                subsumed_by = parent.title(),
                "pruning subsumed package from plan"
            );
            pruned.insert(child.title(), parent.title());
        }
    }

    pruned
}

fn covering_root<'a>(pruned: &BTreeMap<&'a str, &'a str>, title: &str) -> Option<&'a str> {
    let mut current = *pruned.get(title)?;
    for _ in 0..pruned.len() {
        match pruned.get(current) {
            Some(&next) => current = next,
            None => return Some(current),
        }
    }
    None
}
