mod helper;

pub mod student;
pub mod teacher;
