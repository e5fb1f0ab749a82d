pub mod control_panel;
pub mod selectable_list;
pub mod util;
