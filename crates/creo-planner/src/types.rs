use creo_core::PackageRecord;

/// One package to install, plus the finer records its install makes redundant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub package: PackageRecord,
    pub subsumed: Vec<PackageRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    pub steps: Vec<PlanStep>,
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageRecord> {
        self.steps.iter().map(|step| &step.package)
    }

    pub fn titles(&self) -> Vec<&str> {
        self.packages().map(PackageRecord::title).collect()
    }
}
