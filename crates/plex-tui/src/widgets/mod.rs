pub mod filter_input;
pub mod progress_bar;
pub mod scrollable_list;
