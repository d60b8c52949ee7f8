pub mod answer;
pub mod result;
pub mod selector;
pub mod step;
