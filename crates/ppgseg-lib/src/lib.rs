pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod plot;
pub mod scan;
pub mod segment;
pub mod signal;

pub use config::*;
pub use error::*;
pub use pipeline::*;
pub use scan::*;
pub use segment::*;
pub use signal::*;
