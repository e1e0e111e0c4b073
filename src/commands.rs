pub mod inspect;
pub mod retrieve;
