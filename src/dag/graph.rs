// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use petgraph::Direction;
use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::action::Action;
use crate::dag::plan::ExecutionPlan;
use crate::engine::TaskName;
use crate::errors::{Result, TaskdagError};

/// A registered task: name, prerequisites (in declaration order) and an
/// optional action. Tasks without an action only aggregate prerequisites.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: TaskName,
    pub prerequisites: Vec<TaskName>,
    pub action: Option<Arc<Action>>,
}

/// Registration phase: collects tasks, allowing forward references.
///
/// Nothing is checked across tasks until [`TaskGraphBuilder::build`].
#[derive(Debug, Default)]
pub struct TaskGraphBuilder {
    tasks: BTreeMap<TaskName, Task>,
}

impl TaskGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. Fails with [`TaskdagError::DuplicateTask`] if the name is
    /// already taken.
    pub fn register<N, I, S>(
        &mut self,
        name: N,
        prerequisites: I,
        action: Option<Action>,
    ) -> Result<&mut Self>
    where
        N: Into<TaskName>,
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            return Err(TaskdagError::DuplicateTask(name));
        }

        let prerequisites: Vec<TaskName> = prerequisites.into_iter().map(Into::into).collect();
        debug!(task = %name, ?prerequisites, "registered task");

        self.tasks.insert(
            name.clone(),
            Task {
                name,
                prerequisites,
                action: action.map(Arc::new),
            },
        );
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Finish registration and check graph invariants:
    /// every prerequisite resolves, and there are no cycles.
    pub fn build(self) -> Result<TaskGraph> {
        for task in self.tasks.values() {
            for prerequisite in &task.prerequisites {
                if prerequisite == &task.name {
                    return Err(TaskdagError::CyclicDependency {
                        cycle: vec![task.name.clone(), task.name.clone()],
                    });
                }
                if !self.tasks.contains_key(prerequisite) {
                    return Err(TaskdagError::UnresolvedPrerequisite {
                        task: task.name.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        let graph = TaskGraph::new(self.tasks);
        graph.ensure_acyclic()?;
        Ok(graph)
    }
}

/// Immutable, validated task graph.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: BTreeMap<TaskName, Task>,
    /// Reverse edges: tasks that list the key as a prerequisite.
    dependents: HashMap<TaskName, Vec<TaskName>>,
}

impl TaskGraph {
    pub fn builder() -> TaskGraphBuilder {
        TaskGraphBuilder::new()
    }

    fn new(tasks: BTreeMap<TaskName, Task>) -> Self {
        let mut dependents: HashMap<TaskName, Vec<TaskName>> = HashMap::new();
        for task in tasks.values() {
            for prerequisite in &task.prerequisites {
                dependents
                    .entry(prerequisite.clone())
                    .or_default()
                    .push(task.name.clone());
            }
        }
        Self { tasks, dependents }
    }

    /// All tasks, sorted by name.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Immediate prerequisites of a task.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.tasks
            .get(name)
            .map(|t| t.prerequisites.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.dependents
            .get(name)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }

    /// Transitive closure of `target`'s prerequisites, including `target`.
    pub fn closure(&self, target: &str) -> Result<HashSet<TaskName>> {
        if !self.contains(target) {
            return Err(TaskdagError::UnknownTask(target.to_string()));
        }

        let mut visited: HashSet<TaskName> = HashSet::new();
        let mut stack = vec![target.to_string()];
        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            stack.extend(self.dependencies_of(&name).iter().cloned());
        }
        Ok(visited)
    }

    /// Plan the execution of `target` and everything it depends on.
    pub fn plan(&self, target: &str) -> Result<ExecutionPlan> {
        let closure = self.closure(target)?;
        let order = self.topological_order(|name| closure.contains(name))?;
        Ok(ExecutionPlan::new(target.to_string(), order))
    }

    fn ensure_acyclic(&self) -> Result<()> {
        self.topological_order(|_| true).map(|_| ())
    }

    /// Topological order (prerequisites first) of the tasks accepted by
    /// `include`. Deterministic for a given graph, since nodes are inserted
    /// in name order.
    fn topological_order<F>(&self, include: F) -> Result<Vec<TaskName>>
    where
        F: Fn(&str) -> bool,
    {
        // Edge direction: prerequisite -> task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in self.tasks.keys().filter(|n| include(n)) {
            graph.add_node(name.as_str());
        }
        for task in self.tasks.values().filter(|t| include(&t.name)) {
            for prerequisite in &task.prerequisites {
                graph.add_edge(prerequisite.as_str(), task.name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
            Err(cycle) => Err(TaskdagError::CyclicDependency {
                cycle: describe_cycle(&graph, cycle.node_id()),
            }),
        }
    }
}

/// Concrete cycle through `start`, following prerequisite edges:
/// `["a", "b", "a"]` reads "a needs b needs a".
fn describe_cycle(graph: &DiGraphMap<&str, ()>, start: &str) -> Vec<TaskName> {
    let component: HashSet<&str> = kosaraju_scc(graph)
        .into_iter()
        .find(|scc| scc.contains(&start))
        .map(|scc| scc.into_iter().collect())
        .unwrap_or_default();

    let mut path: Vec<&str> = vec![start];
    let mut position: HashMap<&str, usize> = HashMap::from([(start, 0)]);
    let mut current = start;

    loop {
        let mut prerequisites: Vec<&str> = graph
            .neighbors_directed(current, Direction::Incoming)
            .filter(|n| component.contains(n))
            .collect();
        prerequisites.sort_unstable();

        let Some(next) = prerequisites.first().copied() else {
            break;
        };
        if let Some(&pos) = position.get(next) {
            let mut cycle: Vec<TaskName> = path[pos..].iter().map(|s| s.to_string()).collect();
            cycle.push(next.to_string());
            return cycle;
        }
        position.insert(next, path.len());
        path.push(next);
        current = next;
    }

    vec![start.to_string()]
}
