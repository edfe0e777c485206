//! The mutable build context
//!
//! Resolvers and plugins only ever change a build through [`State`]. It
//! owns the planned ops, diagnostics, the per-asset URL index, the
//! dependency map with its edge log, the registration table for deferred
//! (optional) assets, the manifest and, once frozen, the dependency graph.
//!
//! Diagnostics are collected rather than returned: a single run reports
//! every independent problem it finds.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;

use crate::domain::entities::{
    CopyOp, LocalSrc, Manifest, ManifestEntry, Op, OpId, OutputFile, PlannedOp, SourceCache,
    WriteOp,
};
use crate::domain::services::DependencyGraph;
use crate::domain::value_objects::path::{fix_relative_path, to_url};
use crate::domain::value_objects::UrlEntry;
use crate::error::{PlanError, PlanResult};

/// Deferred resolution of an optional asset
pub type Registrar = Box<dyn FnOnce(&mut State)>;

enum Registration {
    /// Not yet needed; resolvers to run once something depends on the name
    Pending(Vec<Registrar>),
    /// Resolvers have run
    Consumed,
}

/// A change to an existing op, applied by [`State::modify_op`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modification {
    pub new_filename: Option<String>,
    pub new_content: Option<String>,
}

impl Modification {
    pub fn rename(filename: impl Into<String>) -> Self {
        Self {
            new_filename: Some(filename.into()),
            new_content: None,
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            new_filename: None,
            new_content: Some(content.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_filename.is_none() && self.new_content.is_none()
    }
}

pub struct State {
    src: PathBuf,
    target: PathBuf,
    ops: Vec<PlannedOp>,
    next_op: u64,
    errors: Vec<String>,
    warnings: Vec<String>,
    urls: IndexMap<String, Vec<UrlEntry>>,
    deps: IndexMap<String, Vec<String>>,
    edges: Vec<(String, String)>,
    pending: IndexMap<String, Registration>,
    declared: HashSet<String>,
    sources: SourceCache,
    manifest: Manifest,
    graph: Option<DependencyGraph>,
}

impl State {
    /// A fresh context reading from `src` and writing under `target`
    pub fn new(src: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            target: target.into(),
            ops: Vec::new(),
            next_op: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            urls: IndexMap::new(),
            deps: IndexMap::new(),
            edges: Vec::new(),
            pending: IndexMap::new(),
            declared: HashSet::new(),
            sources: SourceCache::new(),
            manifest: Manifest::new(),
            graph: None,
        }
    }

    pub fn src(&self) -> &Path {
        &self.src
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub fn add_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(error = %message, "plan error");
        self.errors.push(message);
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Warnings so far, including manifest overwrite warnings
    pub fn warnings(&mut self) -> &[String] {
        self.collect_manifest_warnings();
        &self.warnings
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Run `f`, then prefix every error it added with `prefix` (joined by a
    /// space). An empty prefix leaves errors untouched.
    pub fn scope_errors<R>(&mut self, prefix: &str, f: impl FnOnce(&mut State) -> R) -> R {
        if prefix.is_empty() {
            return f(self);
        }
        self.scope_errors_with(|e| format!("{} {}", prefix, e), f)
    }

    /// Run `f`, then rewrite every error it added with `rewrite`
    pub fn scope_errors_with<R>(
        &mut self,
        rewrite: impl Fn(&str) -> String,
        f: impl FnOnce(&mut State) -> R,
    ) -> R {
        let start = self.errors.len();
        let result = f(self);
        for error in &mut self.errors[start..] {
            *error = rewrite(error);
        }
        result
    }

    /// Run `check`; only if it added no error and produced a value, run `run`
    /// with that value.
    pub fn check_then_run_if_no_errors<A>(
        &mut self,
        check: impl FnOnce(&mut State) -> Option<A>,
        run: impl FnOnce(&mut State, A),
    ) {
        let before = self.errors.len();
        let checked = check(self);
        if self.errors.len() == before {
            if let Some(value) = checked {
                run(self, value);
            }
        }
    }

    // ------------------------------------------------------------------
    // Registration and dependencies
    // ------------------------------------------------------------------

    /// Record a top-level declaration. A second declaration of the same name
    /// (in either table) is reported once and should then be ignored.
    pub fn declare(&mut self, name: &str) -> bool {
        if self.declared.insert(name.to_string()) {
            true
        } else {
            self.add_error(format!("Duplicate asset: {}", name));
            false
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    /// Register `name` as resolved. Idempotent, so every member of a bundle
    /// can register the bundle's name.
    pub fn register_now(&mut self, name: &str) {
        if matches!(self.pending.get(name), Some(Registration::Pending(_))) {
            self.add_error(format!("Duplicate asset: {}", name));
        } else if !self.deps.contains_key(name) {
            debug!(asset = name, "registered");
            self.deps.insert(name.to_string(), Vec::new());
            self.urls.insert(name.to_string(), Vec::new());
        }
    }

    /// Defer resolution of `name` until something depends on it
    pub fn register_for_later(&mut self, name: &str, registrar: Registrar) {
        if self.deps.contains_key(name) {
            self.add_error(format!("Duplicate asset: {}", name));
            return;
        }
        match self.pending.get_mut(name) {
            Some(Registration::Pending(registrars)) => registrars.push(registrar),
            Some(Registration::Consumed) => {
                self.add_error(format!("Duplicate asset: {}", name));
            }
            None => {
                debug!(asset = name, "deferred");
                self.pending
                    .insert(name.to_string(), Registration::Pending(vec![registrar]));
            }
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.deps.contains_key(name)
    }

    pub fn is_pending(&self, name: &str) -> bool {
        matches!(self.pending.get(name), Some(Registration::Pending(_)))
    }

    /// Add the edge `from → to` unless already present
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let deps = self.deps.entry(from.to_string()).or_default();
        if !deps.iter().any(|d| d == to) {
            deps.push(to.to_string());
            self.edges.push((from.to_string(), to.to_string()));
        }
    }

    /// Direct dependencies of every registered asset
    pub fn dependencies(&self) -> &IndexMap<String, Vec<String>> {
        &self.deps
    }

    /// Activate every deferred asset that something depends on.
    ///
    /// Works through the edge log in order. New edges added by activated
    /// assets join the end of the log, and each pending slot runs once, so
    /// this terminates.
    pub fn resolve_pending(&mut self) {
        let mut cursor = 0;
        while cursor < self.edges.len() {
            let (from, to) = self.edges[cursor].clone();
            cursor += 1;

            if self.deps.contains_key(&to) {
                continue;
            }
            match self.pending.get(&to) {
                Some(Registration::Pending(_)) => {
                    let registrars = match self.pending.insert(to.clone(), Registration::Consumed) {
                        Some(Registration::Pending(registrars)) => registrars,
                        _ => Vec::new(),
                    };
                    debug!(asset = %to, required_by = %from, "activating deferred asset");
                    for registrar in registrars {
                        registrar(self);
                    }
                }
                // Activated but failed; its own errors already explain why.
                Some(Registration::Consumed) => {}
                None if self.declared.contains(&to) => {}
                None => self.add_error(format!("{} referenced an unspecified asset: {}", from, to)),
            }
        }
    }

    /// Freeze the dependency graph. Skipped when errors exist; on a cycle
    /// every offending name is reported and no graph is kept.
    pub fn graph_dependencies(&mut self) {
        self.graph = None;
        if !self.ok() {
            return;
        }
        match DependencyGraph::build(&self.deps) {
            Ok(graph) => self.graph = Some(graph),
            Err(cycles) => {
                for name in cycles {
                    self.add_error(format!("Circular dependency on asset: {}", name));
                }
            }
        }
    }

    pub fn graph(&self) -> Option<&DependencyGraph> {
        self.graph.as_ref()
    }

    // ------------------------------------------------------------------
    // Ops
    // ------------------------------------------------------------------

    /// Descriptor for a source file, sharing the content cache of any other
    /// descriptor of the same file in this build
    pub fn local_src(&mut self, ctx: &Path, path: &str) -> LocalSrc {
        self.sources.get(ctx, path)
    }

    /// Destination under the output directory
    pub fn output_file(&self, path: &str) -> OutputFile {
        OutputFile::new(self.target.clone(), path)
    }

    pub fn add_op(&mut self, op: Op) -> OpId {
        let id = OpId::new(self.next_op);
        self.next_op += 1;
        debug!(%id, op = %op, "op added");
        self.ops.push(PlannedOp { id, op });
        id
    }

    pub fn add_op_copy(&mut self, from: LocalSrc, to: &str, transitive: bool) -> OpId {
        let to = self.output_file(to);
        self.add_op(Op::Copy(CopyOp {
            from,
            to,
            transitive,
        }))
    }

    pub fn add_op_write(
        &mut self,
        to: &str,
        content: impl Into<String>,
        originally_from: Option<LocalSrc>,
    ) -> OpId {
        let to = self.output_file(to);
        self.add_op(Op::Write(WriteOp {
            to,
            content: content.into(),
            originally_from,
        }))
    }

    /// Remove by identity
    pub fn remove_op(&mut self, id: OpId) -> Option<Op> {
        let pos = self.ops.iter().position(|p| p.id == id)?;
        Some(self.ops.remove(pos).op)
    }

    pub fn op(&self, id: OpId) -> Option<&Op> {
        self.ops.iter().find(|p| p.id == id).map(|p| &p.op)
    }

    pub fn ops(&self) -> &[PlannedOp] {
        &self.ops
    }

    pub fn op_ids(&self) -> Vec<OpId> {
        self.ops.iter().map(|p| p.id).collect()
    }

    /// The single op that writes `path`. Reports an error when there is
    /// none or more than one.
    pub fn op_that_creates(&mut self, path: &str) -> Option<OpId> {
        let wanted = fix_relative_path(path);
        let found: Vec<OpId> = self
            .ops
            .iter()
            .filter(|p| p.op.to().path() == wanted)
            .map(|p| p.id)
            .collect();
        match found.as_slice() {
            [] => {
                self.add_error(format!("Unable to find op that writes to {}", path));
                None
            }
            [id] => Some(*id),
            [first, ..] => {
                self.add_error(format!("Multiple ops write to {}", path));
                Some(*first)
            }
        }
    }

    /// Replace op `id` according to `modification`.
    ///
    /// A copy whose content is untouched stays a copy; any new content makes
    /// a write that keeps the original source as provenance. When the path
    /// changes, URL entries and `local` manifest entries that pointed at the
    /// old path are repointed.
    pub fn modify_op(&mut self, id: OpId, modification: Modification) -> PlanResult<OpId> {
        if self.op(id).is_none() {
            return Err(PlanError::Contract(format!("no op with id {}", id)));
        }
        if let Some(name) = &modification.new_filename {
            if fix_relative_path(name).is_empty() {
                return Err(PlanError::Contract(format!(
                    "empty filename for op {}",
                    id
                )));
            }
        }
        let Some(op) = self.remove_op(id) else {
            return Err(PlanError::Contract(format!("no op with id {}", id)));
        };

        let old_to = op.to().clone();
        let new_to = match &modification.new_filename {
            Some(name) => old_to.with_new_path(name),
            None => old_to.clone(),
        };

        let replacement = match (op, modification.new_content) {
            (Op::Copy(copy), None) => Op::Copy(CopyOp {
                to: new_to.clone(),
                ..copy
            }),
            (Op::Copy(copy), Some(content)) => Op::Write(WriteOp {
                to: new_to.clone(),
                content,
                originally_from: Some(copy.from),
            }),
            (Op::Write(write), content) => Op::Write(WriteOp {
                to: new_to.clone(),
                content: content.unwrap_or(write.content),
                originally_from: write.originally_from,
            }),
        };
        let new_id = self.add_op(replacement);

        if new_to.path() != old_to.path() {
            self.rename_local(old_to.path(), new_to.path());
        }
        Ok(new_id)
    }

    /// Repoint URL entries and `local` manifest entries from `/before` to
    /// `/after`
    pub fn rename_local(&mut self, before: &str, after: &str) {
        let before = to_url(before);
        let after = to_url(after);
        debug!(%before, %after, "renaming local url");

        for entries in self.urls.values_mut() {
            for entry in entries.iter_mut() {
                if entry.url == before {
                    entry.url = after.clone();
                }
            }
        }
        self.manifest.map_values(|entry| match entry {
            ManifestEntry::Local(path) if *path == before => ManifestEntry::Local(after.clone()),
            other => other.clone(),
        });
    }

    // ------------------------------------------------------------------
    // URLs and manifest
    // ------------------------------------------------------------------

    /// Register a servable URL for a registered asset
    pub fn add_url(&mut self, name: &str, entry: UrlEntry) {
        if entry.url.is_empty() {
            let shown = serde_json::to_string(&entry).unwrap_or_default();
            self.add_error(format!("{} has an invalid URL entry: {}", name, shown));
            return;
        }
        match self.urls.get_mut(name) {
            Some(entries) => entries.push(entry),
            None => self.add_error(format!("Asset not registered: {}", name)),
        }
    }

    pub fn urls(&self, name: &str) -> &[UrlEntry] {
        self.urls.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn all_urls(&self) -> &IndexMap<String, Vec<UrlEntry>> {
        &self.urls
    }

    /// Rewrite every URL entry in place
    pub fn map_urls(&mut self, mut f: impl FnMut(&mut UrlEntry)) {
        for entries in self.urls.values_mut() {
            entries.iter_mut().for_each(&mut f);
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn manifest_mut(&mut self) -> &mut Manifest {
        &mut self.manifest
    }

    fn collect_manifest_warnings(&mut self) {
        let warnings = self.manifest.take_warnings();
        self.warnings.extend(warnings);
    }

    /// Freeze into results: diagnostics sorted, ops in plan order
    pub fn into_results(mut self) -> PlanResults {
        self.collect_manifest_warnings();
        self.errors.sort();
        self.warnings.sort();
        PlanResults {
            src: self.src,
            target: self.target,
            ops: self.ops.into_iter().map(|p| p.op).collect(),
            errors: self.errors,
            warnings: self.warnings,
            manifest: self.manifest,
            graph: self.graph,
            urls: self.urls,
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("src", &self.src)
            .field("target", &self.target)
            .field("ops", &self.ops.len())
            .field("errors", &self.errors)
            .field("warnings", &self.warnings)
            .field("pending", &self.pending.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The finished plan handed to execution
#[derive(Debug, Clone)]
pub struct PlanResults {
    pub src: PathBuf,
    pub target: PathBuf,
    pub ops: Vec<Op>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub manifest: Manifest,
    pub graph: Option<DependencyGraph>,
    pub urls: IndexMap<String, Vec<UrlEntry>>,
}

impl PlanResults {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}
