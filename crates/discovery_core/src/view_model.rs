use crate::SessionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub query: String,
    pub state: SessionState,
    pub iteration: u32,
    pub accumulated: usize,
    /// Items the latest iteration found, before any truncation to the max.
    pub new_items: usize,
    pub stall_counter: u32,
}
