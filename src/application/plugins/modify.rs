//! Modify plugin family
//!
//! Visits every non-transitive op and lets a function decide whether the
//! file gets a new name, new content, or both. Changes go through
//! [`State::modify_op`], so renamed files keep their URLs and manifest
//! entries in step.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use regex::Regex;
use tracing::trace;

use super::Plugin;
use crate::application::state::{Modification, State};
use crate::domain::entities::{LocalSrc, Op};
use crate::domain::value_objects::path::fix_relative_path;
use crate::error::PlanResult;

/// What a modify function sees for one op
pub struct FileInput<'a> {
    /// Source file the op copies from or was derived from
    pub originally_from: Option<&'a LocalSrc>,
    /// Current output path
    pub filename: &'a str,
    content: Content<'a>,
}

enum Content<'a> {
    Source(&'a LocalSrc),
    Text(&'a str),
}

impl<'a> FileInput<'a> {
    fn from_op(op: &'a Op) -> Self {
        match op {
            Op::Copy(copy) => Self {
                originally_from: Some(&copy.from),
                filename: copy.to.path(),
                content: Content::Source(&copy.from),
            },
            Op::Write(write) => Self {
                originally_from: write.originally_from.as_ref(),
                filename: write.to.path(),
                content: Content::Text(&write.content),
            },
        }
    }

    /// Current content of the file, read on demand
    pub fn content(&self) -> PlanResult<Cow<'a, str>> {
        match self.content {
            Content::Source(src) => src.content_string().map(Cow::Owned),
            Content::Text(text) => Ok(Cow::Borrowed(text)),
        }
    }

    fn describe(&self) -> &str {
        self.originally_from
            .map(LocalSrc::path)
            .unwrap_or(self.filename)
    }
}

/// Which files a rename / content plugin applies to. Matches the output
/// path or the original source path.
#[derive(Clone)]
pub enum FilenameTest {
    Regex(Regex),
    Fn(Rc<dyn Fn(&str) -> bool>),
}

impl FilenameTest {
    pub fn func(f: impl Fn(&str) -> bool + 'static) -> Self {
        FilenameTest::Fn(Rc::new(f))
    }

    fn test(&self, s: &str) -> bool {
        match self {
            FilenameTest::Regex(re) => re.is_match(s),
            FilenameTest::Fn(f) => f(s),
        }
    }

    pub fn matches(&self, input: &FileInput<'_>) -> bool {
        self.test(input.filename)
            || input
                .originally_from
                .is_some_and(|src| self.test(src.path()))
    }
}

impl From<Regex> for FilenameTest {
    fn from(re: Regex) -> Self {
        FilenameTest::Regex(re)
    }
}

impl fmt::Debug for FilenameTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilenameTest::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            FilenameTest::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

type Logic = Rc<dyn Fn(&mut State, &FileInput<'_>) -> Option<Modification>>;

#[derive(Clone)]
pub struct Modify {
    name: String,
    logic: Logic,
}

impl Modify {
    /// A modification that may record errors or inspect the build
    pub fn stateful(
        f: impl Fn(&mut State, &FileInput<'_>) -> Option<Modification> + 'static,
    ) -> Self {
        Self {
            name: "modify".to_string(),
            logic: Rc::new(f),
        }
    }

    pub fn stateless(f: impl Fn(&FileInput<'_>) -> Option<Modification> + 'static) -> Self {
        Self::stateful(move |_, input| f(input))
    }

    /// Rename matching files with `f(current output path)`
    pub fn rename(test: impl Into<FilenameTest>, f: impl Fn(&str) -> String + 'static) -> Self {
        let test = test.into();
        Self::stateless(move |input| {
            test.matches(input)
                .then(|| Modification::rename(f(input.filename)))
        })
        .named("rename")
    }

    /// Rewrite the content of matching files with `f`. With
    /// `fail_unless_change`, a file `f` leaves untouched is an error.
    pub fn content(
        test: impl Into<FilenameTest>,
        f: impl Fn(&str) -> String + 'static,
        fail_unless_change: bool,
    ) -> Self {
        let test = test.into();
        Self::stateful(move |state, input| {
            if !test.matches(input) {
                return None;
            }
            let before = match input.content() {
                Ok(content) => content,
                Err(e) => {
                    state.add_error(e.to_string());
                    return None;
                }
            };
            let after = f(&before);
            if fail_unless_change && after == before {
                state.add_error(format!("Failed to change {}", input.filename));
                None
            } else {
                Some(Modification::content(after))
            }
        })
        .named("replace-content")
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl fmt::Debug for Modify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modify").field("name", &self.name).finish()
    }
}

impl Plugin for Modify {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, state: &mut State) -> PlanResult<()> {
        for id in state.op_ids() {
            let Some(op) = state.op(id).cloned() else {
                continue;
            };
            if op.is_transitive() {
                continue;
            }
            let input = FileInput::from_op(&op);
            let prefix = format!("{}:", input.describe());
            let Some(mut modification) =
                state.scope_errors(&prefix, |state| (self.logic)(state, &input))
            else {
                continue;
            };

            if let Some(new_content) = &modification.new_content {
                if matches!(input.content(), Ok(current) if current == new_content.as_str()) {
                    modification.new_content = None;
                }
            }
            if let Some(new_filename) = modification.new_filename.take() {
                let new_filename = fix_relative_path(&new_filename);
                if new_filename != input.filename {
                    modification.new_filename = Some(new_filename);
                }
            }
            if modification.is_empty() {
                continue;
            }

            trace!(plugin = %self.name, file = input.filename, "modifying op");
            state.modify_op(id, modification)?;
        }
        Ok(())
    }
}
