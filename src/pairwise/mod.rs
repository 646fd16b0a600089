pub mod distance;
pub mod neighbors;

pub use distance::{DistanceMatrix, Metric};
pub use neighbors::{nearest_neighbors, Neighbors};
