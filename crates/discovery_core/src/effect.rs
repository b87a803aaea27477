#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Ask the content source for more content, then wait for it to settle.
    RevealMore,
    /// The session reached a terminal state.
    Finished { state: crate::SessionState },
}
