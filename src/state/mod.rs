pub mod command;
pub mod selection;
pub mod series_store;
