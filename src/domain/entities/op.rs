//! Planned file operations
//!
//! An [`Op`] is either a copy of a source file or a write of generated
//! content. Ops live in the build state under a stable [`OpId`]; removal
//! always goes through the id, never the destination path, because paths
//! are only checked for uniqueness once the plan is finalised.

use std::borrow::Cow;
use std::fmt;

use super::{LocalSrc, OutputFile};
use crate::error::PlanResult;

/// Identity of an op within one build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(u64);

impl OpId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Copy `from` to `to`
#[derive(Debug, Clone, PartialEq)]
pub struct CopyOp {
    pub from: LocalSrc,
    pub to: OutputFile,
    pub transitive: bool,
}

/// Write `content` to `to`
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOp {
    pub to: OutputFile,
    pub content: String,
    /// Source file the content was derived from, if any
    pub originally_from: Option<LocalSrc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Copy(CopyOp),
    Write(WriteOp),
}

impl Op {
    /// Destination of the op
    pub fn to(&self) -> &OutputFile {
        match self {
            Op::Copy(op) => &op.to,
            Op::Write(op) => &op.to,
        }
    }

    /// The source file behind the op: the copy source, or a write's provenance
    pub fn source(&self) -> Option<&LocalSrc> {
        match self {
            Op::Copy(op) => Some(&op.from),
            Op::Write(op) => op.originally_from.as_ref(),
        }
    }

    pub fn is_transitive(&self) -> bool {
        matches!(self, Op::Copy(CopyOp { transitive: true, .. }))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Op::Copy(_) => "copy",
            Op::Write(_) => "write",
        }
    }

    /// Bytes the op will produce
    pub fn content(&self) -> PlanResult<Cow<'_, [u8]>> {
        match self {
            Op::Copy(op) => op.from.content().map(Cow::Borrowed),
            Op::Write(op) => Ok(Cow::Borrowed(op.content.as_bytes())),
        }
    }

    /// Size in bytes of what the op will produce
    pub fn size(&self) -> PlanResult<u64> {
        match self {
            Op::Copy(op) => op.from.size(),
            Op::Write(op) => Ok(op.content.len() as u64),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Copy(op) => write!(f, "copy {} -> {}", op.from.path(), op.to.path()),
            Op::Write(op) => write!(f, "write {} ({} bytes)", op.to.path(), op.content.len()),
        }
    }
}

/// An op together with its id in the build state
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOp {
    pub id: OpId,
    pub op: Op,
}
