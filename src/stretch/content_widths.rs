/// Last observed content width per logical column, 0 until first measured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentWidths {
    widths: Vec<usize>,
}

impl ContentWidths {
    pub fn new(len: usize) -> Self {
        Self {
            widths: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn get(&self, col_idx: usize) -> usize {
        self.widths.get(col_idx).copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.widths
    }

    /// A copy with one entry replaced.
    pub fn with(&self, col_idx: usize, width: usize) -> Self {
        let mut widths = self.widths.clone();
        widths[col_idx] = width;
        Self { widths }
    }
}
