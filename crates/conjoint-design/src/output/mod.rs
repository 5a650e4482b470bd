pub mod csv;
pub mod preview;
pub mod script;
