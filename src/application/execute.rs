//! Carry out a finished plan
//!
//! Copies run first, ordered by source path, then writes ordered by
//! destination. A failing op is recorded and the rest still run. A dry run
//! lists and counts the same ops without touching the file system.

use tracing::info;

use super::state::PlanResults;
use crate::domain::entities::Op;
use crate::domain::ports::FileSystem;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Log what would happen without touching the file system
    pub dry_run: bool,
}

impl ExecuteOptions {
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// What an execution did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Files copied or written (or that would have been, in a dry run)
    pub files: usize,
    pub bytes: u64,
    /// One line per op carried out (or intended, in a dry run), in order
    pub actions: Vec<String>,
    pub errors: Vec<String>,
}

impl ExecutionReport {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn done(&mut self, op: &Op, bytes: u64) {
        self.files += 1;
        self.bytes += bytes;
        self.actions.push(op.to_string());
    }
}

fn execution_order(ops: &[Op]) -> Vec<&Op> {
    let mut copies: Vec<&Op> = Vec::new();
    let mut writes: Vec<&Op> = Vec::new();
    for op in ops {
        match op {
            Op::Copy(_) => copies.push(op),
            Op::Write(_) => writes.push(op),
        }
    }
    copies.sort_by(|a, b| {
        let key = |op: &Op| op.source().map(|s| s.abs().to_path_buf());
        key(a).cmp(&key(b))
    });
    writes.sort_by(|a, b| a.to().path().cmp(b.to().path()));
    copies.into_iter().chain(writes).collect()
}

pub fn execute(
    results: &PlanResults,
    fs: &dyn FileSystem,
    options: &ExecuteOptions,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for op in execution_order(&results.ops) {
        let dest = op.to().abs();
        match op {
            Op::Copy(copy) => {
                let from = copy.from.abs();
                info!(
                    from = %from.display(),
                    to = %op.to().path(),
                    dry_run = options.dry_run,
                    "copy"
                );
                if options.dry_run {
                    match copy.from.size() {
                        Ok(bytes) => report.done(op, bytes),
                        Err(e) => report
                            .errors
                            .push(format!("Error reading {}: {}", from.display(), e)),
                    }
                    continue;
                }
                match fs.copy(from, dest) {
                    Ok(bytes) => report.done(op, bytes),
                    Err(e) => report
                        .errors
                        .push(format!("Error copying {}: {}", from.display(), e)),
                }
            }
            Op::Write(write) => {
                info!(to = %op.to().path(), dry_run = options.dry_run, "write");
                let bytes = write.content.as_bytes();
                if options.dry_run {
                    report.done(op, bytes.len() as u64);
                    continue;
                }
                match fs.write(dest, bytes) {
                    Ok(()) => report.done(op, bytes.len() as u64),
                    Err(e) => report
                        .errors
                        .push(format!("Error creating {}: {}", dest.display(), e)),
                }
            }
        }
    }

    report
}
