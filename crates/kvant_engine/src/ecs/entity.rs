//! Entity implementation

slotmap::new_key_type! {
    /// Entity identifier
    ///
    /// A generation-checked handle: once an entity is destroyed every copy of
    /// its handle stops resolving, even if the slot is later reused.
    pub struct Entity;
}

impl Entity {
    /// A handle that never refers to a live entity
    pub fn null() -> Self {
        <Self as slotmap::Key>::null()
    }

    /// Whether this is the null handle
    pub fn is_null(&self) -> bool {
        slotmap::Key::is_null(self)
    }
}
