mod catalog;
mod common;
mod listing;
