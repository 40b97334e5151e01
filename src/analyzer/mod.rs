// Analyzer module: aggregates submodules for different aspects of analysis.

pub mod crossover;
pub mod indicators;
