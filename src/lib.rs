pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod html;
pub mod index;
