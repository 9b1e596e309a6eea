//! Optional book capabilities.
//!
//! Each book variant opts into a fixed set of capabilities. Callers ask the
//! book whether it supports one (`Book::supports`) or request the capability
//! view directly (`Book::as_borrowable`, `Book::as_digital_access`) instead of
//! inspecting the concrete variant.

/// Capability a book variant may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Can be lent out and returned.
    Borrowable,
    /// Has electronic delivery metadata.
    DigitalAccess,
}

impl Capability {
    /// Stable string id used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Borrowable => "borrowable",
            Self::DigitalAccess => "digital_access",
        }
    }
}

/// Lending state machine: `Available <-> Unavailable`.
pub trait Borrowable {
    /// Marks the item unavailable. Borrowing an unavailable item is a no-op.
    fn borrow(&mut self);
    /// Marks the item available from either state.
    fn return_item(&mut self);
    fn is_available(&self) -> bool;
}

/// Electronic delivery metadata.
pub trait DigitalAccess {
    fn download_url(&self) -> &str;
    /// File size in megabytes.
    fn file_size(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::Capability;

    #[test]
    fn capability_ids_are_stable() {
        assert_eq!(Capability::Borrowable.as_str(), "borrowable");
        assert_eq!(Capability::DigitalAccess.as_str(), "digital_access");
    }
}
