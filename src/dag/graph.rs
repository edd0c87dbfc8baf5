// src/dag/graph.rs

use std::collections::BTreeMap;
use std::fmt::Write as _;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{BuildError, Result};
use crate::tasks::Category;

pub type TaskName = String;

/// What a leaf task actually does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Clean,
    InstallDependencies,
    Compile(Category),
    Watch(Category),
}

/// Structure of a composite task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskNode {
    /// Run the task registered under this name.
    Ref(TaskName),
    /// Run children one after another; stop at the first failure.
    Series(Vec<TaskNode>),
    /// Run children concurrently and wait for all of them.
    Parallel(Vec<TaskNode>),
}

impl TaskNode {
    pub fn task(name: impl Into<TaskName>) -> Self {
        TaskNode::Ref(name.into())
    }

    pub fn series(children: impl IntoIterator<Item = TaskNode>) -> Self {
        TaskNode::Series(children.into_iter().collect())
    }

    pub fn parallel(children: impl IntoIterator<Item = TaskNode>) -> Self {
        TaskNode::Parallel(children.into_iter().collect())
    }

    /// Names referenced anywhere inside this node.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TaskNode::Ref(name) => out.push(name.as_str()),
            TaskNode::Series(children) | TaskNode::Parallel(children) => {
                for child in children {
                    child.collect_references(out);
                }
            }
        }
    }
}

/// A registered task: either a unit of work or a composition of other tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDef {
    Leaf(TaskKind),
    Composite(TaskNode),
}

/// Registry of named tasks.
///
/// Built once at startup. [`TaskGraph::validate`] rejects unknown references
/// and cycles before anything runs.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: BTreeMap<TaskName, TaskDef>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under a unique name.
    pub fn register(&mut self, name: impl Into<TaskName>, def: TaskDef) -> Result<()> {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            return Err(BuildError::DuplicateTask(name));
        }
        self.tasks.insert(name, def);
        Ok(())
    }

    pub fn leaf(&mut self, name: impl Into<TaskName>, kind: TaskKind) -> Result<()> {
        self.register(name, TaskDef::Leaf(kind))
    }

    pub fn composite(&mut self, name: impl Into<TaskName>, node: TaskNode) -> Result<()> {
        self.register(name, TaskDef::Composite(node))
    }

    pub fn get(&self, name: &str) -> Option<&TaskDef> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// All registered task names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    /// Names a task refers to directly (empty for leaves).
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        match self.tasks.get(name) {
            Some(TaskDef::Composite(node)) => node.references(),
            _ => Vec::new(),
        }
    }

    /// Whether running `name` starts at least one watch session.
    ///
    /// Unknown names (and references to them) count as not watching.
    pub fn starts_watchers(&self, name: &str) -> bool {
        match self.tasks.get(name) {
            Some(TaskDef::Leaf(kind)) => matches!(kind, TaskKind::Watch(_)),
            Some(TaskDef::Composite(node)) => node
                .references()
                .into_iter()
                .any(|dep| dep != name && self.starts_watchers(dep)),
            None => false,
        }
    }

    /// Check that every reference resolves and that no task contains itself.
    pub fn validate(&self) -> Result<()> {
        for name in self.tasks.keys() {
            for dep in self.dependencies_of(name) {
                if !self.tasks.contains_key(dep) {
                    return Err(BuildError::TaskNotFound(format!(
                        "'{}' (referenced by task '{}')",
                        dep, name
                    )));
                }
            }
        }

        // Edge direction: referenced task -> composite that references it.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.tasks.keys() {
            graph.add_node(name.as_str());
        }
        for name in self.tasks.keys() {
            for dep in self.dependencies_of(name) {
                graph.add_edge(dep, name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(BuildError::DagCycle(format!(
                "cycle detected in task graph involving task '{}'",
                cycle.node_id()
            ))),
        }
    }

    /// The pipeline's task set.
    ///
    /// ```text
    /// build = series(clean, install-npm,
    ///                parallel(copy-assets, compile-script, compile-template, compile-style))
    /// dev   = series(clean, install-npm,
    ///                parallel(series(copy-assets, watch-assets), ...))
    /// ```
    pub fn standard() -> Result<Self> {
        let mut graph = TaskGraph::new();

        graph.leaf("clean", TaskKind::Clean)?;
        graph.leaf("install-npm", TaskKind::InstallDependencies)?;
        graph.composite("install-dependencies", TaskNode::task("install-npm"))?;

        for category in Category::ALL {
            graph.leaf(category.compile_task(), TaskKind::Compile(category))?;
            graph.leaf(category.watch_task(), TaskKind::Watch(category))?;
        }

        graph.composite(
            "build",
            TaskNode::series([
                TaskNode::task("clean"),
                TaskNode::task("install-npm"),
                TaskNode::parallel(
                    Category::ALL
                        .iter()
                        .map(|c| TaskNode::task(c.compile_task())),
                ),
            ]),
        )?;

        graph.composite(
            "dev",
            TaskNode::series([
                TaskNode::task("clean"),
                TaskNode::task("install-npm"),
                TaskNode::parallel(Category::ALL.iter().map(|c| {
                    TaskNode::series([
                        TaskNode::task(c.compile_task()),
                        TaskNode::task(c.watch_task()),
                    ])
                })),
            ]),
        )?;

        graph.validate()?;
        Ok(graph)
    }

    /// Render the tree that running `name` would execute.
    pub fn describe(&self, name: &str) -> Result<String> {
        let mut out = String::new();
        self.describe_task(name, 0, &mut out)?;
        Ok(out)
    }

    fn describe_task(&self, name: &str, depth: usize, out: &mut String) -> Result<()> {
        let def = self
            .get(name)
            .ok_or_else(|| BuildError::TaskNotFound(name.to_string()))?;
        let indent = "  ".repeat(depth);
        match def {
            TaskDef::Leaf(kind) => {
                let _ = writeln!(out, "{indent}{name} ({kind:?})");
            }
            TaskDef::Composite(node) => {
                let _ = writeln!(out, "{indent}{name}");
                self.describe_node(node, depth + 1, out)?;
            }
        }
        Ok(())
    }

    fn describe_node(&self, node: &TaskNode, depth: usize, out: &mut String) -> Result<()> {
        match node {
            TaskNode::Ref(name) => self.describe_task(name, depth, out),
            TaskNode::Series(children) | TaskNode::Parallel(children) => {
                let label = if matches!(node, TaskNode::Series(_)) {
                    "series"
                } else {
                    "parallel"
                };
                let _ = writeln!(out, "{}{label}", "  ".repeat(depth));
                for child in children {
                    self.describe_node(child, depth + 1, out)?;
                }
                Ok(())
            }
        }
    }
}
