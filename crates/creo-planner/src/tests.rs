use creo_core::{BaseDirectory, PackageRecord, VersionStore};

use super::*;

fn store(entries: &[(&str, u32)]) -> VersionStore {
    entries
        .iter()
        .map(|(title, version)| {
            PackageRecord::new(
                *title,
                *version,
                BaseDirectory::Content,
                format!("{title}.zip"),
                *title,
            )
            .expect("record must be valid")
        })
        .collect()
}

fn subsumed_titles(plan: &UpdatePlan, title: &str) -> Vec<String> {
    plan.steps
        .iter()
        .find(|step| step.package.title() == title)
        .map(|step| {
            step.subsumed
                .iter()
                .map(|record| record.title().to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn plans_only_packages_missing_locally() {
    let local = store(&[("A", 1)]);
    let remote = store(&[("A", 1), ("B", 2)]);

    let plan = plan(&local, &remote);
    assert_eq!(plan.titles(), vec!["B"]);
}

#[test]
fn plans_strictly_newer_remote_versions() {
    let local = store(&[("Images", 2), ("Fonts", 4)]);
    let remote = store(&[("Images", 3), ("Fonts", 4)]);

    assert_eq!(plan(&local, &remote).titles(), vec!["Images"]);
}

#[test]
fn never_plans_a_downgrade() {
    let local = store(&[("Images", 5)]);
    let remote = store(&[("Images", 3)]);

    assert!(plan(&local, &remote).is_empty());
}

#[test]
fn skips_unpublished_packages_on_first_run() {
    let remote = store(&[("Music", 0), ("Sounds", 1)]);

    assert_eq!(plan(&VersionStore::new(), &remote).titles(), vec!["Sounds"]);
}

#[test]
fn empty_remote_yields_empty_plan() {
    let local = store(&[("Images", 5)]);
    assert!(plan(&local, &VersionStore::new()).is_empty());
    assert!(plan(&VersionStore::new(), &VersionStore::new()).is_empty());
}

#[test]
fn all_data_subsumes_application_and_content() {
    let remote = store(&[("AllData", 3), ("Application", 1), ("Content", 1)]);

    let plan = plan(&VersionStore::new(), &remote);
    assert_eq!(plan.titles(), vec!["AllData"]);
    assert_eq!(
        subsumed_titles(&plan, "AllData"),
        vec!["Application", "Content"]
    );
}

#[test]
fn all_data_subsumes_content_categories_transitively() {
    let remote = store(&[("AllData", 3), ("AllContent", 2), ("Images", 3), ("Fonts", 1)]);

    let plan = plan(&VersionStore::new(), &remote);
    assert_eq!(plan.titles(), vec!["AllData"]);
    assert_eq!(
        subsumed_titles(&plan, "AllData"),
        vec!["AllContent", "Fonts", "Images"]
    );
}

#[test]
fn newer_fine_grained_package_survives_subsumption() {
    let remote = store(&[("AllContent", 2), ("Images", 5)]);

    let plan = plan(&VersionStore::new(), &remote);
    assert_eq!(plan.titles(), vec!["AllContent", "Images"]);
    assert!(subsumed_titles(&plan, "AllContent").is_empty());
}

#[test]
fn equal_counter_is_subsumed() {
    let remote = store(&[("AllContent", 2), ("Images", 2), ("Music", 3)]);

    let plan = plan(&VersionStore::new(), &remote);
    assert_eq!(plan.titles(), vec!["AllContent", "Music"]);
    assert_eq!(subsumed_titles(&plan, "AllContent"), vec!["Images"]);
}

#[test]
fn up_to_date_coarse_package_does_not_prune() {
    let local = store(&[("AllContent", 2)]);
    let remote = store(&[("AllContent", 2), ("Images", 1)]);

    assert_eq!(plan(&local, &remote).titles(), vec!["Images"]);
}

#[test]
fn pruned_coarse_package_hands_its_children_to_the_outer_tier() {
    let remote = store(&[("AllContent", 4), ("AllData", 4), ("Images", 4)]);

    let plan = plan(&VersionStore::new(), &remote);
    assert_eq!(plan.titles(), vec!["AllData"]);
    assert_eq!(
        subsumed_titles(&plan, "AllData"),
        vec!["AllContent", "Images"]
    );
}

#[test]
fn plan_order_follows_remote_store_order() {
    let remote = store(&[("Sounds", 1), ("Atlas", 1), ("Music", 1)]);

    assert_eq!(
        plan(&VersionStore::new(), &remote).titles(),
        vec!["Atlas", "Music", "Sounds"]
    );
}

#[test]
fn custom_table_drives_pruning() {
    let table = SubsumptionTable::new().with_rule("AllLocal", ["Planets"]);
    let remote = store(&[("AllLocal", 2), ("Planets", 2), ("Images", 1)]);

    let plan = plan_with_table(&VersionStore::new(), &remote, &table);
    assert_eq!(plan.titles(), vec!["AllLocal", "Images"]);
}

#[test]
fn empty_table_never_prunes() {
    let remote = store(&[("AllData", 3), ("Application", 1)]);

    let plan = plan_with_table(&VersionStore::new(), &remote, &SubsumptionTable::new());
    assert_eq!(plan.titles(), vec!["AllData", "Application"]);
}

#[test]
fn subsumed_by_follows_rules_transitively() {
    let table = SubsumptionTable::launcher_default();
    let closure = table.subsumed_by("AllData");

    for title in ["Application", "Content", "AllContent"]
        .into_iter()
        .chain(CONTENT_CATEGORIES)
    {
        assert!(closure.contains(title), "missing {title}");
    }
    assert!(!closure.contains("AllData"));
    assert!(table.subsumed_by("Images").is_empty());
}

#[test]
fn subsumed_by_tolerates_cyclic_rules() {
    let table = SubsumptionTable::new()
        .with_rule("A", ["B"])
        .with_rule("B", ["A", "C"]);

    let closure = table.subsumed_by("A");
    assert_eq!(closure.into_iter().collect::<Vec<_>>(), vec!["B", "C"]);
}

#[test]
fn cyclic_rules_keep_one_package_installed() {
    let table = SubsumptionTable::new()
        .with_rule("A", ["B"])
        .with_rule("B", ["A"]);
    let remote = store(&[("A", 1), ("B", 1)]);

    let plan = plan_with_table(&VersionStore::new(), &remote, &table);
    assert_eq!(plan.titles(), vec!["A"]);
    assert_eq!(subsumed_titles(&plan, "A"), vec!["B"]);
}
