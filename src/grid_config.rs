//! The structural model of a grid: which slots exist, where they are, how long they are, and which
//! cells they share with each other. Everything here is static during filling.

use bit_set::BitSet;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use thiserror::Error;

use crate::assignment::Assignment;
use crate::dictionary::Dictionary;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the `GridConfig`'s `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A struct representing the aspects of a slot in the grid that are static during filling.
#[derive(Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// Letters given in the input for each cell, if any.
    pub fill: SmallVec<[Option<char>; MAX_SLOT_LENGTH]>,

    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,
}

impl Debug for SlotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotConfig")
            .field("id", &self.id)
            .field("start_cell", &self.start_cell)
            .field("direction", &self.direction)
            .field("length", &self.length)
            .field("crossings", &self.crossings)
            .finish()
    }
}

impl SlotConfig {
    pub fn row(&self) -> usize {
        self.start_cell.1
    }

    pub fn column(&self) -> usize {
        self.start_cell.0
    }

    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.length).map(|cell_idx| cell_coord(self.start_cell, self.direction, cell_idx))
    }
}

fn cell_coord(start_cell: GridCoord, direction: Direction, cell_idx: usize) -> GridCoord {
    match direction {
        Direction::Across => (start_cell.0 + cell_idx, start_cell.1),
        Direction::Down => (start_cell.0, start_cell.1 + cell_idx),
    }
}

/// A struct representing the aspects of a grid that are static during filling.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub slot_configs: Vec<SlotConfig>,

    /// For each slot, the ids of the slots crossing it, in cell order.
    neighbors_by_slot: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>>,

    /// Cells that aren't blocks, indexed by `y * width + x`. This includes open cells that don't
    /// belong to any slot.
    open_cells: BitSet,
}

impl GridConfig {
    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    pub fn slot_ids(&self) -> impl Iterator<Item = SlotId> {
        0..self.slot_configs.len()
    }

    /// If slots `x` and `y` share a cell, return the index of that cell within `x` and within `y`.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<(usize, usize)> {
        if x == y {
            return None;
        }

        self.slot_configs[x]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == y => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }

    /// All slots that share a cell with the given slot.
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors_by_slot[slot_id]
    }

    pub fn is_open_cell(&self, (x, y): GridCoord) -> bool {
        x < self.width && y < self.height && self.open_cells.contains(y * self.width + x)
    }

    /// Every ordered pair of distinct slots that share a cell.
    pub fn arcs(&self) -> impl Iterator<Item = (SlotId, SlotId)> + '_ {
        self.slot_ids()
            .flat_map(move |x| self.neighbors(x).iter().map(move |&y| (x, y)))
    }
}

/// Problems with the input to `generate_grid_config` and friends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridConfigError {
    #[error("grid template has no rows")]
    EmptyTemplate,

    #[error("row {row} of the grid template has {actual} cells, expected {expected}")]
    RaggedTemplate {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("entry {entry} has length {expected} but its fill has {actual} cells")]
    MismatchedFillLength {
        entry: usize,
        expected: usize,
        actual: usize,
    },

    #[error("contradictory letters given for cell {cell:?}")]
    ContradictoryFill { cell: GridCoord },

    #[error("more than two entries cross at cell {cell:?}")]
    TooManyCrossings { cell: GridCoord },

    #[error("entry {entry} is shorter than two cells")]
    EntryTooShort { entry: usize },

    #[error("grid template has no runs of two or more open cells")]
    NoSlots,
}

/// An across or down entry in the input to `generate_grid_config`. Cells of `fill` containing `.`
/// are open; any other char is a given letter.
#[derive(Debug, Clone)]
pub struct GridEntry {
    pub loc: GridCoord,
    pub len: usize,
    pub dir: Direction,
    pub fill: Option<String>,
}

/// Generate a GridConfig representing a grid with specified entries.
pub fn generate_grid_config(entries: &[GridEntry]) -> Result<GridConfig, GridConfigError> {
    let width = entries
        .iter()
        .map(|entry| cell_coord(entry.loc, entry.dir, entry.len.saturating_sub(1)).0 + 1)
        .max()
        .unwrap_or(0);
    let height = entries
        .iter()
        .map(|entry| cell_coord(entry.loc, entry.dir, entry.len.saturating_sub(1)).1 + 1)
        .max()
        .unwrap_or(0);

    generate_grid_config_with_size(entries, width, height, None)
}

/// Build the config for `entries` in a grid of the given size. If `open_cells` isn't given, the
/// cells covered by entries are the only open ones.
fn generate_grid_config_with_size(
    entries: &[GridEntry],
    width: usize,
    height: usize,
    open_cells: Option<BitSet>,
) -> Result<GridConfig, GridConfigError> {
    // Build a map from cell location to entries involved, which we can then use to calculate
    // crossings.
    #[derive(Debug, Default)]
    struct GridCell {
        // (entry index, cell index within entry)
        entries: SmallVec<[(usize, usize); 2]>,
        glyph: Option<char>,
    }
    let mut cell_by_loc: HashMap<GridCoord, GridCell> = HashMap::new();
    let mut fills: Vec<SmallVec<[Option<char>; MAX_SLOT_LENGTH]>> =
        Vec::with_capacity(entries.len());

    for (entry_idx, entry) in entries.iter().enumerate() {
        if entry.len < 2 {
            return Err(GridConfigError::EntryTooShort { entry: entry_idx });
        }

        let fill: SmallVec<[Option<char>; MAX_SLOT_LENGTH]> = match &entry.fill {
            Some(fill) => fill
                .chars()
                .map(|c| if c == '.' { None } else { c.to_lowercase().next() })
                .collect(),
            None => (0..entry.len).map(|_| None).collect(),
        };
        if fill.len() != entry.len {
            return Err(GridConfigError::MismatchedFillLength {
                entry: entry_idx,
                expected: entry.len,
                actual: fill.len(),
            });
        }

        for (cell_idx, &glyph) in fill.iter().enumerate() {
            let loc = cell_coord(entry.loc, entry.dir, cell_idx);
            let grid_cell = cell_by_loc.entry(loc).or_default();

            if grid_cell.entries.len() >= 2 {
                return Err(GridConfigError::TooManyCrossings { cell: loc });
            }
            match (grid_cell.glyph, glyph) {
                (Some(existing), Some(glyph)) if existing != glyph => {
                    return Err(GridConfigError::ContradictoryFill { cell: loc });
                }
                (None, Some(glyph)) => grid_cell.glyph = Some(glyph),
                _ => {}
            }
            grid_cell.entries.push((entry_idx, cell_idx));
        }

        fills.push(fill);
    }

    // Letters given by a crossing entry apply to both entries.
    for (entry_idx, entry) in entries.iter().enumerate() {
        for (cell_idx, glyph) in fills[entry_idx].iter_mut().enumerate() {
            *glyph = cell_by_loc[&cell_coord(entry.loc, entry.dir, cell_idx)].glyph;
        }
    }

    let slot_configs: Vec<SlotConfig> = entries
        .iter()
        .zip(fills)
        .enumerate()
        .map(|(entry_idx, (entry, fill))| {
            let crossings = (0..entry.len)
                .map(|cell_idx| {
                    let loc = cell_coord(entry.loc, entry.dir, cell_idx);
                    cell_by_loc[&loc]
                        .entries
                        .iter()
                        .find(|&&(e, _)| e != entry_idx)
                        .map(|&(other_slot_id, other_slot_cell)| Crossing {
                            other_slot_id,
                            other_slot_cell,
                        })
                })
                .collect();

            SlotConfig {
                id: entry_idx,
                start_cell: entry.loc,
                direction: entry.dir,
                length: entry.len,
                fill,
                crossings,
            }
        })
        .collect();

    let neighbors_by_slot = slot_configs
        .iter()
        .map(|slot_config| {
            let mut neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = SmallVec::new();
            for crossing in slot_config.crossings.iter().flatten() {
                if !neighbors.contains(&crossing.other_slot_id) {
                    neighbors.push(crossing.other_slot_id);
                }
            }
            neighbors
        })
        .collect();

    let open_cells = open_cells
        .unwrap_or_else(|| cell_by_loc.keys().map(|&(x, y)| y * width + x).collect());

    Ok(GridConfig {
        width,
        height,
        slot_configs,
        neighbors_by_slot,
        open_cells,
    })
}

/// Generate a GridConfig representing a square grid with no blocks.
pub fn generate_square_grid_config(square_size: usize) -> Result<GridConfig, GridConfigError> {
    let entries: Vec<GridEntry> = (0..square_size)
        .flat_map(|idx| {
            [
                GridEntry { loc: (0, idx), len: square_size, dir: Direction::Across, fill: None },
                GridEntry { loc: (idx, 0), len: square_size, dir: Direction::Down, fill: None },
            ]
        })
        .collect();

    generate_grid_config(&entries)
}

/// Generate a grid config from a string template, with `.` or `_` representing empty cells, `#`
/// representing blocks, and letters representing themselves. Runs of a single open cell are not
/// slots.
pub fn generate_grid_config_from_template_string(
    template: &str,
) -> Result<GridConfig, GridConfigError> {
    let template: Vec<Vec<char>> = template
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.chars()
                .map(|c| if c == '_' { '.' } else { c })
                .collect()
        })
        .collect();

    let width = template.first().ok_or(GridConfigError::EmptyTemplate)?.len();
    if let Some((row, line)) = template.iter().enumerate().find(|(_, line)| line.len() != width) {
        return Err(GridConfigError::RaggedTemplate { row, expected: width, actual: line.len() });
    }
    let height = template.len();

    let open_cells: BitSet = template
        .iter()
        .enumerate()
        .flat_map(|(y, line)| {
            line.iter()
                .enumerate()
                .filter(|&(_, &cell)| cell != '#')
                .map(move |(x, _)| y * width + x)
        })
        .collect();

    let transposed_template: Vec<Vec<char>> = (0..width)
        .map(|x| (0..height).map(|y| template[y][x]).collect())
        .collect();

    let across_entries = template.iter().enumerate().flat_map(|(y, line)| {
        open_runs(line).map(move |(x, run)| entry_for_run((x, y), Direction::Across, run))
    });
    let down_entries = transposed_template.iter().enumerate().flat_map(|(x, column)| {
        open_runs(column).map(move |(y, run)| entry_for_run((x, y), Direction::Down, run))
    });
    let entries: Vec<GridEntry> = across_entries.chain(down_entries).collect();

    if entries.is_empty() {
        return Err(GridConfigError::NoSlots);
    }

    generate_grid_config_with_size(&entries, width, height, Some(open_cells))
}

/// Maximal runs of at least two non-block cells in a template line, with their starting offsets.
fn open_runs(line: &[char]) -> impl Iterator<Item = (usize, &[char])> {
    let mut offset = 0;
    line.split(|&cell| cell == '#').filter_map(move |run| {
        let start = offset;
        offset += run.len() + 1;
        (run.len() > 1).then_some((start, run))
    })
}

fn entry_for_run(loc: GridCoord, dir: Direction, run: &[char]) -> GridEntry {
    let fill = if run.iter().all(|&cell| cell == '.') {
        None
    } else {
        Some(run.iter().collect())
    };

    GridEntry { loc, len: run.len(), dir, fill }
}

/// Turn the given grid config and assignment into a rendered string. Blocks are shown as `#` and
/// open cells without a letter as `.`.
pub fn render_grid(config: &GridConfig, dictionary: &Dictionary, assignment: &Assignment) -> String {
    let mut grid: Vec<Vec<char>> = (0..config.height)
        .map(|y| {
            (0..config.width)
                .map(|x| if config.is_open_cell((x, y)) { '.' } else { '#' })
                .collect()
        })
        .collect();

    for slot_config in &config.slot_configs {
        let word = assignment.get(slot_config.id).map(|word_id| dictionary.word(word_id));

        for (cell_idx, (x, y)) in slot_config.cell_coords().enumerate() {
            let glyph = word.map(|word| word.chars[cell_idx]).or(slot_config.fill[cell_idx]);
            if let Some(glyph) = glyph {
                grid[y][x] = glyph;
            }
        }
    }

    grid.into_iter()
        .map(|line| line.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::assignment::Assignment;
    use crate::dictionary::Dictionary;
    use crate::grid_config::{
        generate_grid_config, generate_grid_config_from_template_string,
        generate_square_grid_config, render_grid, Direction, GridConfigError, GridEntry,
    };

    /// #..
    /// ...
    /// ..#
    #[test]
    fn test_template_slots_and_overlaps() {
        let config = generate_grid_config_from_template_string(
            "
            #..
            ...
            ..#
            ",
        )
        .unwrap();

        assert_eq!((config.width, config.height), (3, 3));
        assert_eq!(config.slot_count(), 6);

        // Across entries come first, in reading order.
        let lengths: Vec<_> = config.slot_configs.iter().map(|s| s.length).collect();
        assert_eq!(lengths, vec![2, 3, 2, 2, 3, 2]);
        assert_eq!(config.slot_configs[1].direction, Direction::Across);
        assert_eq!((config.slot_configs[1].row(), config.slot_configs[1].column()), (1, 0));

        // The middle across entry crosses all three down entries.
        assert_eq!(config.neighbors(1), &[3, 4, 5]);
        assert_eq!(config.overlap(1, 4), Some((1, 1)));
        assert_eq!(config.overlap(4, 1), Some((1, 1)));
        assert_eq!(config.overlap(0, 2), None);
        assert_eq!(config.overlap(0, 0), None);

        for (x, y) in config.arcs() {
            let (ix, iy) = config.overlap(x, y).unwrap();
            assert_eq!(config.overlap(y, x), Some((iy, ix)));
        }
    }

    #[test]
    fn test_underscore_template_and_prefilled_letters() {
        let config = generate_grid_config_from_template_string(
            "
            #___#
            _C__#
            ",
        )
        .unwrap();

        assert_eq!(config.slot_count(), 5);
        let down = config
            .slot_configs
            .iter()
            .find(|slot| slot.direction == Direction::Down && slot.column() == 1)
            .unwrap();
        assert_eq!(down.fill.as_slice(), &[None, Some('c')]);

        let across = &config.slot_configs[1];
        assert_eq!(across.fill.as_slice(), &[None, Some('c'), None, None]);
    }

    #[test]
    fn test_template_errors() {
        assert_eq!(
            generate_grid_config_from_template_string("\n  \n").unwrap_err(),
            GridConfigError::EmptyTemplate
        );
        assert_eq!(
            generate_grid_config_from_template_string("...\n..").unwrap_err(),
            GridConfigError::RaggedTemplate { row: 1, expected: 3, actual: 2 }
        );
        assert_eq!(
            generate_grid_config_from_template_string("#\n").unwrap_err(),
            GridConfigError::NoSlots
        );
        assert_eq!(
            generate_grid_config_from_template_string("#.#\n###").unwrap_err(),
            GridConfigError::NoSlots
        );

        // Entries are given explicitly here, so an empty list is just an empty grid.
        assert_eq!(generate_grid_config(&[]).unwrap().slot_count(), 0);
    }

    #[test]
    fn test_entry_errors() {
        let mismatched = generate_grid_config(&[GridEntry {
            loc: (0, 0),
            len: 3,
            dir: Direction::Across,
            fill: Some("ab".into()),
        }]);
        assert!(matches!(mismatched, Err(GridConfigError::MismatchedFillLength { .. })));

        let contradictory = generate_grid_config(&[
            GridEntry { loc: (0, 0), len: 3, dir: Direction::Across, fill: Some("a..".into()) },
            GridEntry { loc: (0, 0), len: 3, dir: Direction::Down, fill: Some("b..".into()) },
        ]);
        assert_eq!(contradictory.unwrap_err(), GridConfigError::ContradictoryFill { cell: (0, 0) });

        let crowded = generate_grid_config(&[
            GridEntry { loc: (0, 0), len: 3, dir: Direction::Across, fill: None },
            GridEntry { loc: (0, 0), len: 3, dir: Direction::Down, fill: None },
            GridEntry { loc: (0, 0), len: 2, dir: Direction::Down, fill: None },
        ]);
        assert_eq!(crowded.unwrap_err(), GridConfigError::TooManyCrossings { cell: (0, 0) });
    }

    #[test]
    fn test_square_grid_config() {
        let config = generate_square_grid_config(4).unwrap();

        assert_eq!(config.slot_count(), 8);
        for slot_id in config.slot_ids() {
            assert_eq!(config.neighbors(slot_id).len(), 4);
        }
    }

    #[test]
    fn test_render_grid() {
        let config = generate_grid_config_from_template_string(
            "
            ...#
            .#..
            ",
        )
        .unwrap();
        let dictionary = Dictionary::new(["cat"]);
        let mut assignment = Assignment::new(config.slot_count());
        assignment.insert(0, dictionary.word_id("cat").unwrap());

        assert_eq!(render_grid(&config, &dictionary, &assignment), "cat#\n.#..");
    }

    /// ..
    /// ##
    /// .#
    #[test]
    fn test_render_grid_keeps_open_cells_outside_slots() {
        let config = generate_grid_config_from_template_string(
            "
            ..
            ##
            .#
            ",
        )
        .unwrap();
        assert_eq!(config.slot_count(), 1);
        assert!(config.is_open_cell((0, 2)));
        assert!(!config.is_open_cell((1, 2)));

        let dictionary = Dictionary::new(["ab"]);
        let mut assignment = Assignment::new(config.slot_count());
        assert_eq!(render_grid(&config, &dictionary, &assignment), "..\n##\n.#");

        assignment.insert(0, dictionary.word_id("ab").unwrap());
        assert_eq!(render_grid(&config, &dictionary, &assignment), "ab\n##\n.#");
    }

    #[test]
    fn test_render_grid_from_entries_treats_uncovered_cells_as_blocks() {
        let config = generate_grid_config(&[
            GridEntry { loc: (0, 0), len: 3, dir: Direction::Across, fill: None },
            GridEntry { loc: (2, 0), len: 2, dir: Direction::Down, fill: Some(".x".into()) },
        ])
        .unwrap();
        let dictionary = Dictionary::new(["abc"]);
        let assignment = Assignment::new(config.slot_count());

        assert_eq!(render_grid(&config, &dictionary, &assignment), "...\n##x");
    }
}
