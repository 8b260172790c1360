//! Export adapters. Render directory data for teachers and spreadsheets.

pub mod roster_csv;

pub use roster_csv::roster_to_csv;
