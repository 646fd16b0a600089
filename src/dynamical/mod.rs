pub mod lyapunov;

pub use lyapunov::{
    lyapunov_min_length, lyapunov_rosenstein, mean_period_tolerance, LyapunovResult,
};
