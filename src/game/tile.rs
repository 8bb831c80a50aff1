use rand::Rng;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Taxicab distance between two positions, saturating at `i32::MAX`.
    pub fn manhattan(&self, other: Position) -> i32 {
        let distance = self.row.abs_diff(other.row).saturating_add(self.col.abs_diff(other.col));
        i32::try_from(distance).unwrap_or(i32::MAX)
    }

    /// True if the position lies on a `rows` x `cols` grid.
    pub fn is_within(&self, rows: usize, cols: usize) -> bool {
        self.row >= 0 && (self.row as usize) < rows && self.col >= 0 && (self.col as usize) < cols
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TileColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
}

impl TileColor {
    pub const ALL: [TileColor; 5] = [
        TileColor::Red,
        TileColor::Blue,
        TileColor::Green,
        TileColor::Yellow,
        TileColor::Purple,
    ];

    fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// A colored tile. Two tiles are equal iff they share a color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Tile {
    pub color: TileColor,
}

impl Tile {
    pub const fn new(color: TileColor) -> Self {
        Self { color }
    }

    pub fn random() -> Self {
        Self::new(TileColor::random())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Tile),
}

impl Cell {
    pub fn tile(&self) -> Option<Tile> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(tile) => Some(*tile),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<Tile> for Cell {
    fn from(tile: Tile) -> Self {
        Cell::Occupied(tile)
    }
}

impl From<Option<Tile>> for Cell {
    fn from(tile: Option<Tile>) -> Self {
        tile.map_or(Cell::Empty, Cell::Occupied)
    }
}

/// A tile that changed rows while its column was compacted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileMovement {
    pub tile: Tile,
    pub from: Position,
    pub to: Position,
}

/// A freshly generated tile dropped into an emptied cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PlacedTile {
    pub pos: Position,
    pub tile: Tile,
}

// ============================================================================
// Tile Provider Trait
// ============================================================================

pub trait TileProvider {
    fn next_tile(&mut self) -> Tile;
}

pub struct RandomTileProvider;

impl TileProvider for RandomTileProvider {
    fn next_tile(&mut self) -> Tile {
        Tile::random()
    }
}

/// Cycles through a fixed list of colors. Used for reproducible boards.
pub struct SequenceTileProvider {
    colors: Vec<TileColor>,
    index: usize,
}

impl SequenceTileProvider {
    pub fn new(colors: Vec<TileColor>) -> Self {
        Self { colors, index: 0 }
    }
}

impl TileProvider for SequenceTileProvider {
    fn next_tile(&mut self) -> Tile {
        if self.colors.is_empty() {
            return Tile::new(TileColor::Red);
        }
        let color = self.colors[self.index % self.colors.len()];
        self.index += 1;
        Tile::new(color)
    }
}
