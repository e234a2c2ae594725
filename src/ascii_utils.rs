/*!
 * # ASCII rendering of mazes
 *
 * Renders the ground-truth [`Labyrinth`] and the mouse's knowledge of the maze
 * in the same text format [`Labyrinth::parse`] reads:
 *
 * ```text
 * +--+--+
 * |S .  |
 * +..+  +
 * |   G |
 * +--+--+
 * ```
 *
 * Known walls are drawn with `--` and `|`, unknown walls with `..` and `:`,
 * open edges with spaces.
 */

use std::collections::HashSet;

use crate::cell::Cell;
use crate::direction::Direction;
use crate::labyrinth_mock::Labyrinth;
use crate::wall_memory::WallMemory;
use crate::walls::WallState;

/// Generic renderer: `wall` gives the state of each wall, `content` the two
/// characters drawn inside each cell.
pub fn render_grid(
    width: usize,
    height: usize,
    wall: impl Fn(Cell, Direction) -> WallState,
    content: impl Fn(Cell) -> [char; 2],
) -> String {
    let mut out = String::new();

    for row in 0..height {
        // Top edge of this row.
        for col in 0..width {
            out.push('+');
            let segment = match wall(Cell::new(row, col), Direction::North) {
                WallState::Present => "--",
                WallState::Absent => "  ",
                WallState::Unknown => "..",
            };
            out.push_str(segment);
        }
        out.push_str("+\n");

        // Cell contents with the vertical walls between them.
        for col in 0..width {
            let cell = Cell::new(row, col);
            out.push(vertical_char(wall(cell, Direction::West)));
            out.extend(content(cell));
        }
        out.push(vertical_char(wall(Cell::new(row, width - 1), Direction::East)));
        out.push('\n');
    }

    for col in 0..width {
        out.push('+');
        let segment = match wall(Cell::new(height - 1, col), Direction::South) {
            WallState::Present => "--",
            WallState::Absent => "  ",
            WallState::Unknown => "..",
        };
        out.push_str(segment);
    }
    out.push_str("+\n");
    out
}

fn vertical_char(state: WallState) -> char {
    match state {
        WallState::Present => '|',
        WallState::Absent => ' ',
        WallState::Unknown => ':',
    }
}

/// Renders the ground truth. The output parses back to the same labyrinth.
pub fn render_labyrinth(labyrinth: &Labyrinth) -> String {
    render_grid(
        labyrinth.width(),
        labyrinth.height(),
        |cell, d| {
            if labyrinth.has_wall(cell, d) {
                WallState::Present
            } else {
                WallState::Absent
            }
        },
        |_| [' ', ' '],
    )
}

/// What the mouse knows, for logs and the standalone report.
pub struct KnowledgeView<'a> {
    pub memory: &'a WallMemory,
    pub path: &'a [Cell],
    pub visited: &'a HashSet<Cell>,
    pub start: Cell,
    pub goal: Cell,
    pub position: Option<Cell>,
}

/// Renders known walls plus cell markers.
///
/// `@` mouse, `S` start, `G` goal, `*` on the committed path, `.` visited,
/// `,` walls fully observed but never entered, blank otherwise.
pub fn render_knowledge(view: &KnowledgeView<'_>) -> String {
    let map = view.memory.map();
    let on_path: HashSet<Cell> = view.path.iter().copied().collect();

    render_grid(
        map.width(),
        map.height(),
        |cell, d| map.wall(cell, d).unwrap_or(WallState::Unknown),
        |cell| {
            let marker = if view.position == Some(cell) {
                '@'
            } else if cell == view.start {
                'S'
            } else if cell == view.goal {
                'G'
            } else if on_path.contains(&cell) {
                '*'
            } else if view.visited.contains(&cell) {
                '.'
            } else if view.memory.is_fully_explored(cell) {
                ','
            } else {
                ' '
            };
            [marker, ' ']
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MazeMap;
    use crate::walls::Walls;

    #[test]
    fn test_labyrinth_round_trip() {
        let maze = Labyrinth::generate(5, 4, 7).unwrap();
        let text = render_labyrinth(&maze);
        assert_eq!(Labyrinth::parse(&text).unwrap(), maze);
    }

    #[test]
    fn test_knowledge_marks_unknown_walls() {
        let mut memory = WallMemory::new(MazeMap::new(2, 1).unwrap());
        let visited = HashSet::from([Cell::new(0, 0)]);
        let path = [Cell::new(0, 0)];
        let view = KnowledgeView {
            memory: &memory,
            path: &path,
            visited: &visited,
            start: Cell::new(0, 0),
            goal: Cell::new(0, 1),
            position: Some(Cell::new(0, 0)),
        };
        assert_eq!(render_knowledge(&view), "+--+--+\n|@ :G |\n+--+--+\n");

        memory
            .observe(Cell::new(0, 0), &Walls::from_present(|_| true))
            .unwrap();
        let view = KnowledgeView {
            memory: &memory,
            path: &path,
            visited: &visited,
            start: Cell::new(0, 0),
            goal: Cell::new(0, 1),
            position: Some(Cell::new(0, 0)),
        };
        assert_eq!(render_knowledge(&view), "+--+--+\n|@ |G |\n+--+--+\n");
    }
}
