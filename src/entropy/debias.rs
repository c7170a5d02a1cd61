//! Von Neumann debiasing.
//!
//! Raw bits are taken in non-overlapping pairs. A pair of differing bits
//! yields its first bit; a pair of equal bits yields nothing. For
//! independent raw bits with any fixed bias the output is unbiased, at
//! the cost of throughput (at best one output bit per four raw bits).

/// Debiaser register: the first half of the current pair, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VonNeumann {
    held: Option<bool>,
}

impl VonNeumann {
    /// Feeds one raw bit. Returns the next debiaser state and the accepted
    /// bit, if this raw bit completed a differing pair.
    #[inline]
    pub fn push(self, raw: bool) -> (Self, Option<bool>) {
        match self.held {
            None => (Self { held: Some(raw) }, None),
            Some(first) if first != raw => (Self::default(), Some(first)),
            Some(_) => (Self::default(), None),
        }
    }

    /// Returns true if half a pair is held.
    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// Register encoding: 0 when empty, 1 or 2 for a held 0 or 1.
    pub(crate) fn encode(&self) -> u8 {
        match self.held {
            None => 0,
            Some(bit) => 1 + bit as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(bits: &[bool]) -> Vec<bool> {
        let mut state = VonNeumann::default();
        let mut out = Vec::new();
        for &bit in bits {
            let (next, accepted) = state.push(bit);
            state = next;
            out.extend(accepted);
        }
        out
    }

    #[test]
    fn test_differing_pairs_accept_first_bit() {
        assert_eq!(run(&[false, true]), vec![false]);
        assert_eq!(run(&[true, false]), vec![true]);
    }

    #[test]
    fn test_equal_pairs_rejected() {
        assert!(run(&[true, true, false, false]).is_empty());
    }

    #[test]
    fn test_pairs_do_not_overlap() {
        // Pairs: (1,1) rejected, (0,1) accepted. The middle (1,0) is not a pair.
        assert_eq!(run(&[true, true, false, true]), vec![false]);
    }

    #[test]
    fn test_constant_input_starves_output() {
        assert!(run(&[true; 100]).is_empty());
    }

    #[test]
    fn test_holding_state() {
        let (state, _) = VonNeumann::default().push(true);
        assert!(state.is_holding());

        let (state, _) = state.push(true);
        assert!(!state.is_holding());
    }

    #[test]
    fn test_encoding_keeps_held_value() {
        let (zero, _) = VonNeumann::default().push(false);
        let (one, _) = VonNeumann::default().push(true);
        assert_ne!(zero.encode(), one.encode());
        assert_ne!(zero.encode(), VonNeumann::default().encode());
    }
}
