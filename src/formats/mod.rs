//! Container formats read and written by the splitter.

pub mod ini;
pub mod pe;
