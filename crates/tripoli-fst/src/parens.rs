// Parenthesis (stack symbol) label pairs of a PDT.

use std::io::BufRead;

use hashbrown::HashMap;
use tripoli_core::Label;

use crate::FstError;

/// Set of matched open/close label pairs.
///
/// A PDT pushes on an arc labelled with an open parenthesis and pops on the
/// matching close parenthesis. Composition treats both as moves on the PDT
/// side alone.
#[derive(Debug, Clone, Default)]
pub struct Parens {
    pairs: Vec<(Label, Label)>,
    matching: HashMap<Label, Label>,
}

impl Parens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of `(open, close)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Label, Label)>) -> Result<Self, FstError> {
        let mut parens = Self::new();
        for (open, close) in pairs {
            parens.insert(open, close)?;
        }
        Ok(parens)
    }

    fn insert(&mut self, open: Label, close: Label) -> Result<(), FstError> {
        if self.matching.contains_key(&open) {
            return Err(FstError::DuplicateParen(open));
        }
        if open == close || self.matching.contains_key(&close) {
            return Err(FstError::DuplicateParen(close));
        }
        self.matching.insert(open, close);
        self.matching.insert(close, open);
        self.pairs.push((open, close));
        Ok(())
    }

    pub fn is_paren(&self, label: Label) -> bool {
        self.matching.contains_key(&label)
    }

    /// The other half of `label`'s pair.
    pub fn matching(&self, label: Label) -> Option<Label> {
        self.matching.get(&label).copied()
    }

    pub fn pairs(&self) -> &[(Label, Label)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Read parenthesis pairs, one `open close` pair per line.
///
/// Blank lines and `#` comments are skipped.
pub fn read_parens<R: BufRead>(reader: R) -> Result<Parens, FstError> {
    let mut parens = Parens::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let nline = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() || fields[0].starts_with('#') {
            continue;
        }
        let [open, close] = fields.as_slice() else {
            return Err(FstError::parse(
                nline,
                format!("expected 2 fields, got {}", fields.len()),
            ));
        };
        let open: Label = open
            .parse()
            .map_err(|_| FstError::parse(nline, format!("invalid label '{open}'")))?;
        let close: Label = close
            .parse()
            .map_err(|_| FstError::parse(nline, format!("invalid label '{close}'")))?;
        parens.insert(open, close)?;
    }
    Ok(parens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_pairs() {
        let parens = read_parens("10 11\n# skip\n\n12 13\n".as_bytes()).unwrap();
        assert_eq!(parens.len(), 2);
        assert_eq!(parens.pairs(), &[(10, 11), (12, 13)]);
        assert!(parens.is_paren(11));
        assert_eq!(parens.matching(10), Some(11));
        assert_eq!(parens.matching(13), Some(12));
        assert_eq!(parens.matching(5), None);
    }

    #[test]
    fn duplicate_label_rejected() {
        let err = Parens::from_pairs([(10, 11), (11, 12)]).unwrap_err();
        assert!(matches!(err, FstError::DuplicateParen(11)));
        let err = Parens::from_pairs([(10, 10)]).unwrap_err();
        assert!(matches!(err, FstError::DuplicateParen(10)));
    }

    #[test]
    fn malformed_line_rejected() {
        let err = read_parens("10 11 12\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FstError::Parse { line: 1, .. }));
        let err = read_parens("10 x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FstError::Parse { line: 1, .. }));
    }

    #[test]
    fn empty_parens() {
        let parens = Parens::new();
        assert!(parens.is_empty());
        assert!(!parens.is_paren(0));
    }
}
