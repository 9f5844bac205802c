// Core modules implementing sizing, statistics, and error modeling.
pub mod attr;
pub mod decimal;
pub mod error;
pub mod item;
pub mod number;
pub mod stats;
