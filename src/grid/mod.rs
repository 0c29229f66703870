pub mod grid2d;
pub mod gridmap;
pub mod neighborhood;

pub use grid2d::{Grid2d, Layer};
pub use gridmap::GridMap;
pub use neighborhood::{Disc, MAX_RADIUS_CELLS, radius_to_cells};
