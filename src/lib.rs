//! Crossword filling as a constraint satisfaction problem: each slot in the grid is a variable whose
//! domain is the set of dictionary words that fit it, and crossing slots must agree on the letter
//! in their shared cell.
//!
//! The usual entry points are `generate_grid_config_from_template_string` to build the structural
//! model, `Dictionary::from_word_list_string` to build the word set, and `solve` (or `find_fill`,
//! which also reports statistics) to produce an `Assignment`.

pub mod arc_consistency;
pub mod assignment;
pub mod backtracking_search;
pub mod dictionary;
pub mod domains;
pub mod grid_config;
pub mod heuristics;

pub use assignment::{Assignment, Choice};
pub use backtracking_search::{find_fill, solve, FillFailure, FillOptions, FillSuccess, Statistics};
pub use dictionary::{Dictionary, Word, WordId};
pub use grid_config::{
    generate_grid_config, generate_grid_config_from_template_string, generate_square_grid_config,
    render_grid, Direction, GridConfig, GridConfigError, GridEntry, SlotConfig, SlotId,
};

pub const LOG_FILL_PROCESS: bool = cfg!(feature = "log_fill_process");
pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
