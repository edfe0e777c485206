//! Plan orchestrator
//!
//! Turns a [`Config`] into a finished [`State`]:
//!
//! 1. resolve the source and output directories;
//! 2. declare and defer every optional asset;
//! 3. declare and resolve every required asset;
//! 4. activate the optional assets something depends on, then freeze the
//!    dependency graph;
//! 5. run plugins, write the manifest, check that no two ops share a target.
//!
//! Steps after 4 only happen while the build is still error-free.

use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::{debug, info};

use super::plugins::{run_plugins, Plugin};
use super::resolvers::{defer, fold, Arity, ResolveContext};
use super::state::State;
use crate::config::Config;
use crate::domain::ports::SourceTree;
use crate::domain::value_objects::path::{normalize, to_slash};
use crate::error::PlanResult;
use crate::infrastructure::GlobWalker;

fn base_dir(config: &Config) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_default();
    match &config.base_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => cwd.join(dir),
        None => cwd,
    }
}

/// Resolve the config into a State without running plugins
pub fn parse(config: &Config) -> State {
    parse_with(config, Rc::new(GlobWalker::new()))
}

/// [`parse`] against a specific source tree
pub fn parse_with(config: &Config, tree: Rc<dyn SourceTree>) -> State {
    let base = base_dir(config);
    let Some(dir) = config.output.dir.as_deref().filter(|d| !d.is_empty()) else {
        let mut state = State::new(PathBuf::new(), PathBuf::new());
        state.add_error("Invalid config.output: dir is missing.");
        return state;
    };

    let src = normalize(&base.join(&config.src));
    let target = normalize(&base.join(dir));
    let mut state = State::new(&src, &target);
    debug!(src = %src.display(), target = %target.display(), "planning");

    for warning in config.assets.warnings().iter().chain(config.optional.warnings()) {
        state.add_warning(warning.clone());
    }

    if !tree.is_dir(&src) {
        state.add_error(format!("Src dir doesn't exist: {}", src.display()));
        return state;
    }

    let ctx = Rc::new(ResolveContext::new(
        &config.output.name,
        config.output.name_options(),
        tree,
    ));

    for (name, value) in config.optional.iter() {
        if state.declare(name) {
            defer(&ctx, &mut state, name, value, Arity::Single);
        }
    }
    for (name, value) in config.assets.iter() {
        if state.declare(name) {
            fold(&ctx, &mut state, name, value, Arity::Single);
        }
    }

    state.resolve_pending();
    state.graph_dependencies();
    state
}

/// Plan a build: resolve, run plugins, add the manifest and validate
/// targets. `Err` only for invalid plugin specs or contract violations;
/// everything else is recorded on the returned State.
pub fn run(config: &Config) -> PlanResult<State> {
    run_with(config, Rc::new(GlobWalker::new()))
}

/// [`run`] against a specific source tree
pub fn run_with(config: &Config, tree: Rc<dyn SourceTree>) -> PlanResult<State> {
    let plugins: Vec<Rc<dyn Plugin>> = config.build_plugins()?;
    let mut state = parse_with(config, tree);
    run_plugins(&mut state, &plugins)?;
    generate_manifest(config, &mut state)?;
    ensure_no_duplicate_targets(&mut state);
    info!(
        ops = state.ops().len(),
        errors = state.errors().len(),
        "plan complete"
    );
    Ok(state)
}

fn generate_manifest(config: &Config, state: &mut State) -> PlanResult<()> {
    if !state.ok() {
        return Ok(());
    }
    if let Some(file) = config.output.manifest_file() {
        let content = state.manifest().serialize()?;
        state.add_op_write(file, content, None);
    }
    Ok(())
}

fn ensure_no_duplicate_targets(state: &mut State) {
    let mut counts: HashMap<PathBuf, usize> = HashMap::new();
    let mut order: Vec<PathBuf> = Vec::new();
    for planned in state.ops() {
        let abs = planned.op.to().abs().to_path_buf();
        let count = counts.entry(abs.clone()).or_insert(0);
        if *count == 0 {
            order.push(abs);
        }
        *count += 1;
    }

    let target = state.target().to_path_buf();
    for abs in order {
        if counts.get(&abs).copied().unwrap_or(0) > 1 {
            let shown = abs.strip_prefix(&target).unwrap_or(&abs);
            state.add_error(format!(
                "Multiple assets write to the same target: {}",
                to_slash(shown)
            ));
        }
    }
}
