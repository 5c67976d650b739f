pub mod backup;
pub mod cells;
pub mod core;
pub mod scores;
pub mod selection;
