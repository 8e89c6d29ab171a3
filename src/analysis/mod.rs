//! Static, line-by-line analysis of submitted source
//!
//! Nothing here executes the program. Each line is classified by simple
//! prefix and substring patterns:
//! - [`classifier`]: one stripped line → short description
//! - [`hints`]: one raw line → coaching sentence shown with a trace step
//! - [`steps`]: whole source → outline of non-blank, non-comment lines

pub mod classifier;
pub mod hints;
pub mod steps;

pub use classifier::classify;
pub use hints::hint;
pub use steps::{extract_steps, AlgorithmStep};
