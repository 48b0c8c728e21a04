pub mod builder;
pub mod editor;
pub mod exercises;
pub mod media;
pub mod routines;
pub mod students;
