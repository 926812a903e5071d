pub mod bench;
pub mod list;
pub mod run;
pub mod testing;
