use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an instruction came from in the original source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub source_file: Option<String>,
    /// Bytecode address in the input method.
    pub address: Option<u32>,
    pub line: Option<u32>,
}

impl SourcePosition {
    pub const NO_INFO: SourcePosition = SourcePosition {
        source_file: None,
        address: None,
        line: None,
    };

    pub fn new(source_file: Option<&str>, address: Option<u32>, line: Option<u32>) -> SourcePosition {
        SourcePosition {
            source_file: source_file.map(str::to_string),
            address,
            line,
        }
    }

    pub fn same_line(&self, other: &SourcePosition) -> bool {
        self.line == other.line
    }

    pub fn same_line_and_file(&self, other: &SourcePosition) -> bool {
        self.line == other.line && self.source_file == other.source_file
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(file) = &self.source_file {
            write!(f, "{}:", file)?;
        }
        if let Some(line) = self.line {
            write!(f, "{}", line)?;
        }
        match self.address {
            Some(address) => write!(f, "@{:04x}", address),
            None => write!(f, "@????"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering() {
        assert_eq!(SourcePosition::NO_INFO.to_string(), "@????");
        let p = SourcePosition::new(Some("Foo.java"), Some(0x1a), Some(12));
        assert_eq!(p.to_string(), "Foo.java:12@001a");
    }

    #[test]
    fn line_comparisons() {
        let a = SourcePosition::new(Some("A.java"), Some(1), Some(7));
        let b = SourcePosition::new(Some("B.java"), Some(9), Some(7));
        assert!(a.same_line(&b));
        assert!(!a.same_line_and_file(&b));
        assert!(a.same_line_and_file(&SourcePosition::new(Some("A.java"), None, Some(7))));
    }
}
