mod declarations;
mod names;
mod types;
