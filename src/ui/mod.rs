pub mod dialog;
pub mod panels;
pub mod plot;
pub mod table;
