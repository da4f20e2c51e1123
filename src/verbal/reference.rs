/// A zero-copy view into the command string being parsed.
///
/// Offsets are byte offsets. The tokenizer only ever splits on ASCII delimiters,
/// so every reference it produces starts and ends on a `char` boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StringReference {
    pub start: usize,
    pub length: usize,
}

impl StringReference {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// A reference covering `start..end`.
    pub fn span(start: usize, end: usize) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Resolves the reference against the string it was taken from.
    ///
    /// Out-of-range references resolve to the empty string rather than panicking.
    pub fn resolve<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_slices_source() {
        let source = "builder prune";
        let reference = StringReference::new(8, 5);
        assert_eq!(reference.resolve(source), "prune");
        assert_eq!(reference.end(), 13);
    }

    #[test]
    fn test_zero_length_reference_is_empty_but_positioned() {
        let a = StringReference::new(0, 0);
        let b = StringReference::new(4, 0);
        assert!(a.is_empty());
        assert!(b.is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn test_out_of_range_resolves_empty() {
        let reference = StringReference::span(10, 20);
        assert_eq!(reference.resolve("short"), "");
    }
}
