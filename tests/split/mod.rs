mod actions;
mod attaches;
mod errors;
mod levels;
mod models;
mod texlists;
