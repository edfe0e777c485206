//! Aliases: a name that stands for another asset

use crate::application::state::State;

pub(super) fn resolve(state: &mut State, name: &str, target: &str) {
    state.register_now(name);
    state.add_dependency(name, target);
}
