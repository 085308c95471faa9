//! # Monitored resources and scheduling plans.
//!
//! The source manager replaces its [`Resource`] set wholesale on every
//! successful poll and derives a fresh [`SchedulingPlan`] from it. Plans are
//! never edited in place: the orchestrator receives its own copy.

use serde::{Deserialize, Serialize};

/// A monitored source.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// Source GUID.
    pub guid: String,
    /// Display name.
    pub name: String,
}

impl Resource {
    /// Creates a resource.
    pub fn new(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
        }
    }
}

/// One desired task: a resource and how many probe instances watch it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlannedTask {
    /// Resource the task probes.
    pub resource: Resource,
    /// Desired instance count.
    pub instances: u32,
}

/// Ordered set of desired tasks for one orchestrator term.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SchedulingPlan {
    tasks: Vec<PlannedTask>,
}

impl SchedulingPlan {
    /// One task per resource, one instance each, in resource order.
    ///
    /// ## Example
    /// ```rust
    /// use streamprobe::{Resource, SchedulingPlan};
    ///
    /// let plan = SchedulingPlan::from_resources(&[Resource::new("a", "app-1")]);
    /// assert_eq!(plan.tasks()[0].instances, 1);
    /// ```
    pub fn from_resources(resources: &[Resource]) -> Self {
        Self::weighted(resources, |_| 1)
    }

    /// One task per resource with the instance count chosen by `weight`.
    pub fn weighted<F>(resources: &[Resource], weight: F) -> Self
    where
        F: Fn(&Resource) -> u32,
    {
        let tasks = resources
            .iter()
            .map(|r| PlannedTask {
                instances: weight(r),
                resource: r.clone(),
            })
            .collect();
        Self { tasks }
    }

    /// Returns the planned tasks.
    pub fn tasks(&self) -> &[PlannedTask] {
        &self.tasks
    }

    /// Total instances across all tasks.
    pub fn total_instances(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.instances)).sum()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Consumes the plan, yielding its tasks.
    pub fn into_tasks(self) -> Vec<PlannedTask> {
        self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_preserves_resource_order() {
        let resources = vec![Resource::new("b", "app-2"), Resource::new("a", "app-1")];
        let plan = SchedulingPlan::from_resources(&resources);
        let guids: Vec<_> = plan.tasks().iter().map(|t| t.resource.guid.as_str()).collect();
        assert_eq!(guids, ["b", "a"]);
        assert_eq!(plan.total_instances(), 2);
    }

    #[test]
    fn same_resources_same_plan() {
        let resources = vec![Resource::new("a", "app-1"), Resource::new("b", "app-2")];
        assert_eq!(
            SchedulingPlan::from_resources(&resources),
            SchedulingPlan::from_resources(&resources.clone())
        );
    }

    #[test]
    fn weighted_plan() {
        let resources = vec![Resource::new("a", "big"), Resource::new("b", "small")];
        let plan = SchedulingPlan::weighted(&resources, |r| if r.name == "big" { 3 } else { 1 });
        assert_eq!(plan.tasks()[0].instances, 3);
        assert_eq!(plan.total_instances(), 4);
    }
}
