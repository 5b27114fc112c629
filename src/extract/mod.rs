pub mod extractor;
pub mod heuristic;
pub mod sanitize;
pub mod sites;
pub mod structured;
