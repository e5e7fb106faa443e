//! Core resolution algorithm.
//!
//! A pass runs in three phases against one alias snapshot:
//! 1. breadth-first version selection with nearest-wins semantics, keyed by
//!    package name (build requirements of a package are queued before its
//!    regular ones);
//! 2. a depth-first walk that materializes the graph in declaration order,
//!    deduplicating nodes and detecting cycles on the descent path;
//! 3. option propagation over the finished graph.
//!
//! Any error aborts the pass; no partial graph is returned.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crane_core::config::ConflictPolicy;
use crane_core::manifest::Manifest;
use crane_core::recipe::{OptionOverride, RequirementKind};
use crane_core::reference::Reference;
use crane_util::errors::{CraneError, CraneResult};
use petgraph::graph::NodeIndex;

use crate::alias::{AliasSnapshot, AliasStore};
use crate::conflict::{Override, OverrideKind, OverrideReport};
use crate::events::{ResolutionEvent, ResolutionStatus};
use crate::graph::{DepEdge, ResolutionGraph};
use crate::options::{self, OptionValues};
use crate::path::DescentPath;
use crate::provider::RecipeProvider;
use crate::version::VersionRange;

/// The consumer side of a resolution: a manifest or anything shaped like one.
#[derive(Debug, Clone)]
pub struct RootRequest {
    /// External identity of the root node, e.g. `Crane.toml`.
    pub display: String,
    pub build_requires: Vec<Reference>,
    pub requires: Vec<Reference>,
    pub options: Vec<OptionOverride>,
}

impl RootRequest {
    pub fn new(display: &str) -> Self {
        Self {
            display: display.to_string(),
            build_requires: Vec::new(),
            requires: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn with_require(mut self, reference: Reference) -> Self {
        self.requires.push(reference);
        self
    }

    pub fn with_build_require(mut self, reference: Reference) -> Self {
        self.build_requires.push(reference);
        self
    }

    pub fn with_option(mut self, package: &str, option: &str, value: &str) -> Self {
        self.options.push(OptionOverride {
            package: package.to_string(),
            option: option.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn from_manifest(display: &str, manifest: &Manifest) -> CraneResult<Self> {
        Ok(Self {
            display: display.to_string(),
            build_requires: manifest.requirements(RequirementKind::Build)?,
            requires: manifest.requirements(RequirementKind::Regular)?,
            options: manifest.option_overrides()?,
        })
    }

    fn requirements(&self, kind: RequirementKind) -> &[Reference] {
        match kind {
            RequirementKind::Build => &self.build_requires,
            RequirementKind::Regular => &self.requires,
        }
    }
}

/// The output of one resolution pass.
#[derive(Debug)]
pub struct Resolution {
    pub graph: ResolutionGraph,
    /// `NewlyResolved` / `AlreadyInstalled` in depth-first discovery order.
    pub events: Vec<ResolutionEvent>,
    pub overrides: OverrideReport,
    /// Effective option values per package.
    pub options: OptionValues,
}

impl Resolution {
    /// References whose node was hit again after being created.
    pub fn already_installed(&self) -> impl Iterator<Item = &Reference> {
        self.events
            .iter()
            .filter(|e| e.status == ResolutionStatus::AlreadyInstalled)
            .map(|e| &e.reference)
    }

    pub fn options_of(&self, reference: &Reference) -> Option<&BTreeMap<String, String>> {
        self.options.get(reference)
    }
}

/// Resolves a [`RootRequest`] against a recipe provider and the alias store.
pub struct Resolver<'a, P> {
    provider: P,
    aliases: &'a AliasStore,
    policy: ConflictPolicy,
}

impl<'a, P: RecipeProvider> Resolver<'a, P> {
    pub fn new(provider: P, aliases: &'a AliasStore) -> Self {
        Self {
            provider,
            aliases,
            policy: ConflictPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one complete resolution pass.
    pub fn resolve(&self, root: &RootRequest) -> CraneResult<Resolution> {
        let mut pass = Pass {
            provider: &self.provider,
            aliases: self.aliases.snapshot(),
            policy: self.policy,
            concrete: HashMap::new(),
            selected: HashMap::new(),
            children: HashMap::new(),
            overrides: OverrideReport::new(),
        };

        let root_children = pass.select(root)?;

        let mut graph = ResolutionGraph::new(&root.display);
        let mut events = Vec::new();
        let mut path = DescentPath::new();
        let root_idx = graph.root();
        pass.build(&mut graph, root_idx, &root_children, &mut path, &mut events)?;

        let mut recipes = HashMap::new();
        for reference in graph.packages() {
            recipes.insert(reference.clone(), self.provider.recipe(reference)?);
        }
        let mut overrides = pass.overrides;
        let options = options::propagate(&graph, &recipes, &root.options, &mut overrides)?;

        tracing::debug!(
            nodes = graph.len(),
            overrides = overrides.len(),
            "resolution finished"
        );
        Ok(Resolution {
            graph,
            events,
            overrides,
            options,
        })
    }
}

/// A queued request during version selection.
struct Request {
    requested: Reference,
    kind: RequirementKind,
    depth: usize,
    /// `None` for requirements declared by the root.
    consumer: Option<Reference>,
}

/// The reference chosen for a package name.
struct Selection {
    reference: Reference,
    /// Declared directly by the root.
    pinned: bool,
}

/// Per-pass state.
struct Pass<'p, P> {
    provider: &'p P,
    aliases: AliasSnapshot,
    policy: ConflictPolicy,
    /// Memoised range and alias resolution.
    concrete: HashMap<Reference, Reference>,
    selected: HashMap<String, Selection>,
    /// Selected requirements of every expanded package, in declaration order.
    children: HashMap<Reference, Vec<(RequirementKind, Reference)>>,
    overrides: OverrideReport,
}

impl<P: RecipeProvider> Pass<'_, P> {
    /// Resolve ranges, then follow aliases.
    fn concretize(&mut self, requested: &Reference) -> CraneResult<Reference> {
        if let Some(done) = self.concrete.get(requested) {
            return Ok(done.clone());
        }

        let candidate = match VersionRange::from_reference(requested)? {
            Some(range) => {
                let mut candidates = self.provider.available_versions(requested.name())?;
                candidates.extend(self.aliases.sources_named(requested.name()).cloned());
                candidates.retain(|c| c.same_namespace(requested));
                let best = range.best_match(&candidates).cloned().ok_or_else(|| {
                    CraneError::UnresolvableRange {
                        reference: requested.to_string(),
                    }
                })?;
                tracing::debug!(%requested, selected = %best, "range resolved");
                best
            }
            None => requested.clone(),
        };
        let concrete = self.aliases.resolve(&candidate)?;

        self.concrete.insert(requested.clone(), concrete.clone());
        Ok(concrete)
    }

    /// Breadth-first nearest-wins selection. Returns the root's selected
    /// requirements.
    fn select(&mut self, root: &RootRequest) -> CraneResult<Vec<(RequirementKind, Reference)>> {
        let mut queue = VecDeque::new();
        for kind in RequirementKind::ORDER {
            for requested in root.requirements(kind) {
                queue.push_back(Request {
                    requested: requested.clone(),
                    kind,
                    depth: 1,
                    consumer: None,
                });
            }
        }

        let mut root_children = Vec::new();
        while let Some(request) = queue.pop_front() {
            let concrete = self.concretize(&request.requested)?;
            let name = concrete.name().to_string();

            let existing = self.selected.get(&name).map(|s| s.reference.clone());
            let target = match existing {
                Some(selected) => {
                    if selected != concrete {
                        self.on_mismatch(&root.display, &request, &concrete)?;
                    }
                    selected
                }
                None => {
                    tracing::debug!(reference = %concrete, depth = request.depth, "selected");
                    self.selected.insert(
                        name,
                        Selection {
                            reference: concrete.clone(),
                            pinned: request.consumer.is_none(),
                        },
                    );
                    self.children.entry(concrete.clone()).or_default();
                    for kind in RequirementKind::ORDER {
                        for requested in self.provider.requirements(&concrete, kind)? {
                            queue.push_back(Request {
                                requested,
                                kind,
                                depth: request.depth + 1,
                                consumer: Some(concrete.clone()),
                            });
                        }
                    }
                    concrete
                }
            };

            match &request.consumer {
                Some(consumer) => self
                    .children
                    .entry(consumer.clone())
                    .or_default()
                    .push((request.kind, target)),
                None => root_children.push((request.kind, target)),
            }
        }
        Ok(root_children)
    }

    /// A request resolved to something other than the selected reference.
    fn on_mismatch(
        &mut self,
        root_display: &str,
        request: &Request,
        concrete: &Reference,
    ) -> CraneResult<()> {
        let name = concrete.name();
        let Some(selection) = self.selected.get(name) else {
            return Ok(());
        };
        let consumer = request
            .consumer
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| root_display.to_string());

        match self.policy {
            ConflictPolicy::Strict => Err(CraneError::VersionConflict {
                name: name.to_string(),
                consumer,
                requested: concrete.to_string(),
                selected: selection.reference.to_string(),
            }),
            ConflictPolicy::NearestWins => {
                // a root pin only silences deeper requests, never another root request
                if !selection.pinned || request.consumer.is_none() {
                    let selected = selection.reference.to_string();
                    self.overrides.add(Override {
                        package: name.to_string(),
                        consumer,
                        kind: OverrideKind::Version {
                            requested: concrete.to_string(),
                            selected,
                        },
                    });
                }
                Ok(())
            }
        }
    }

    /// Depth-first graph construction from the selected requirements.
    fn build(
        &self,
        graph: &mut ResolutionGraph,
        parent: NodeIndex,
        children: &[(RequirementKind, Reference)],
        path: &mut DescentPath,
        events: &mut Vec<ResolutionEvent>,
    ) -> CraneResult<()> {
        for (kind, child) in children {
            if path.contains(child) {
                return Err(CraneError::DependencyCycle {
                    cycle: path.cycle_through(child),
                });
            }

            let (idx, created) = graph.add_node(child.clone());
            graph.add_edge(parent, idx, DepEdge { kind: *kind });
            if !created {
                tracing::debug!(reference = %child, "already installed");
                events.push(ResolutionEvent::new(
                    child.clone(),
                    ResolutionStatus::AlreadyInstalled,
                ));
                continue;
            }

            events.push(ResolutionEvent::new(
                child.clone(),
                ResolutionStatus::NewlyResolved,
            ));
            let grandchildren = self.children.get(child).map(Vec::as_slice).unwrap_or(&[]);
            path.enter(child);
            self.build(graph, idx, grandchildren, path, events)?;
            path.leave();
        }
        Ok(())
    }
}
