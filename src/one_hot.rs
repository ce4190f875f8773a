/// One-hot DNA encoding at a fixed length
///
/// Channels are A, C, G, T. Unknown bases spread evenly over all four.
/// Sequences are trimmed evenly from both ends or centered with zero padding
/// to reach the target length.

const UNKNOWN: [f32; 4] = [0.25; 4];

/// A `seq_len` x 4 encoding
#[derive(Debug, Clone, PartialEq)]
pub struct OneHot {
    columns: Vec<[f32; 4]>,
}

impl OneHot {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The four channel values at a position
    pub fn column(&self, pos: usize) -> [f32; 4] {
        self.columns[pos]
    }

    /// Channel-major flattening: all A values, then C, G, T
    pub fn flatten(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.columns.len() * 4);
        for channel in 0..4 {
            flat.extend(self.columns.iter().map(|c| c[channel]));
        }
        flat
    }
}

fn encode_base(base: u8) -> [f32; 4] {
    match base.to_ascii_uppercase() {
        b'A' => [1.0, 0.0, 0.0, 0.0],
        b'C' => [0.0, 1.0, 0.0, 0.0],
        b'G' => [0.0, 0.0, 1.0, 0.0],
        b'T' => [0.0, 0.0, 0.0, 1.0],
        _ => UNKNOWN,
    }
}

/// Encode `seq` at exactly `seq_len` positions
pub fn dna_one_hot(seq: &[u8], seq_len: usize) -> OneHot {
    let (seq, offset) = if seq.len() >= seq_len {
        let trim = (seq.len() - seq_len) / 2;
        (&seq[trim..trim + seq_len], 0)
    } else {
        (seq, (seq_len - seq.len()) / 2)
    };

    let mut columns = vec![[0.0; 4]; seq_len];
    for (i, &base) in seq.iter().enumerate() {
        columns[offset + i] = encode_base(base);
    }
    OneHot { columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_length() {
        let code = dna_one_hot(b"ACgTN", 5);
        assert_eq!(code.len(), 5);
        assert_eq!(code.column(0), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(code.column(2), [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(code.column(4), [0.25; 4]);
    }

    #[test]
    fn test_trim_evenly() {
        // 7 bases into 4: drop 1 on the left, 2 on the right
        let code = dna_one_hot(b"TACGTTT", 4);
        assert_eq!(code.column(0), encode_base(b'A'));
        assert_eq!(code.column(3), encode_base(b'T'));
    }

    #[test]
    fn test_pad_centered() {
        let code = dna_one_hot(b"GG", 5);
        assert_eq!(code.column(0), [0.0; 4]);
        assert_eq!(code.column(1), encode_base(b'G'));
        assert_eq!(code.column(2), encode_base(b'G'));
        assert_eq!(code.column(3), [0.0; 4]);
        assert_eq!(code.column(4), [0.0; 4]);
    }

    #[test]
    fn test_flatten_channel_major() {
        let flat = dna_one_hot(b"AC", 2).flatten();
        assert_eq!(flat, vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }
}
