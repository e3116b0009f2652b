//! Byte-range transition labels.
//!
//! Transitions are labelled with inclusive byte ranges instead of single
//! symbols so that automata over the full 256-symbol alphabet stay compact:
//! `[a-z]` is one edge, not twenty-six.

/// An inclusive range of bytes `[lo, hi]` labelling a transition.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharRange {
    pub lo: u8,
    pub hi: u8,
}

impl CharRange {
    /// Create a range. `lo` must not exceed `hi`.
    pub fn new(lo: u8, hi: u8) -> Self {
        debug_assert!(lo <= hi);
        Self { lo, hi }
    }

    /// The range covering a single byte.
    pub fn single(b: u8) -> Self {
        Self { lo: b, hi: b }
    }

    /// The range covering the entire alphabet.
    pub fn full() -> Self {
        Self { lo: 0, hi: u8::MAX }
    }

    pub fn contains(&self, b: u8) -> bool {
        self.lo <= b && b <= self.hi
    }

    pub fn is_full(&self) -> bool {
        self.lo == 0 && self.hi == u8::MAX
    }

    pub fn overlaps(&self, other: &CharRange) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }
}

impl std::fmt::Debug for CharRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.lo == self.hi {
            write!(f, "[{:#04x}]", self.lo)
        } else {
            write!(f, "[{:#04x}-{:#04x}]", self.lo, self.hi)
        }
    }
}

/// Sort ranges ascending and merge overlapping or adjacent ones, yielding the
/// canonical form: ascending, pairwise disjoint, non-adjacent.
pub fn normalize(ranges: &mut Vec<CharRange>) {
    if ranges.len() < 2 {
        return;
    }
    ranges.sort_unstable();
    let mut out: Vec<CharRange> = Vec::with_capacity(ranges.len());
    for r in ranges.drain(..) {
        match out.last_mut() {
            // Merge when overlapping or directly adjacent.
            Some(prev) if r.lo as u16 <= prev.hi as u16 + 1 => {
                prev.hi = prev.hi.max(r.hi);
            }
            _ => out.push(r),
        }
    }
    *ranges = out;
}

/// Complement of a normalized range set within the full alphabet.
pub fn complement(ranges: &[CharRange]) -> Vec<CharRange> {
    let mut out = Vec::new();
    let mut next: u16 = 0;
    for r in ranges {
        if (r.lo as u16) > next {
            out.push(CharRange::new(next as u8, r.lo - 1));
        }
        next = r.hi as u16 + 1;
    }
    if next <= u8::MAX as u16 {
        out.push(CharRange::new(next as u8, u8::MAX));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_merges_overlap_and_adjacency() {
        let mut ranges = vec![
            CharRange::new(b'f', b'k'),
            CharRange::new(b'a', b'c'),
            CharRange::new(b'd', b'e'),
        ];
        normalize(&mut ranges);
        assert_eq!(ranges, vec![CharRange::new(b'a', b'k')]);
    }

    #[test]
    fn test_normalize_keeps_gaps() {
        let mut ranges = vec![CharRange::single(b'z'), CharRange::new(b'a', b'c')];
        normalize(&mut ranges);
        assert_eq!(
            ranges,
            vec![CharRange::new(b'a', b'c'), CharRange::single(b'z')]
        );
    }

    #[test]
    fn test_complement() {
        let comp = complement(&[CharRange::new(b'a', b'z')]);
        assert_eq!(
            comp,
            vec![CharRange::new(0, b'a' - 1), CharRange::new(b'z' + 1, u8::MAX)]
        );

        assert_eq!(complement(&[CharRange::full()]), vec![]);
        assert_eq!(complement(&[]), vec![CharRange::full()]);
    }

    #[test]
    fn test_complement_at_alphabet_edges() {
        let comp = complement(&[CharRange::new(0, 10), CharRange::new(250, u8::MAX)]);
        assert_eq!(comp, vec![CharRange::new(11, 249)]);
    }
}
