pub mod catalog;
pub mod cli;
pub mod planner;
pub mod report;
