//! Documents as sequences of vocabulary indices.
//!
//! The on-disk format is lda-c: one document per line,
//!
//! ```text
//! <k> <w_1>:<c_1> ... <w_k>:<c_k>
//! ```
//!
//! where each `w:c` pair expands to `c` repeated tokens of word `w`.

use crate::common_io::{open_buf_reader, write_lines};
use crate::error::{HdpError, Result};
use log::{info, warn};
use std::io::BufRead;

/// Read-only token data for the sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    n_word: usize,
    docs: Vec<Vec<usize>>,
}

impl Corpus {
    /// Build a corpus from token sequences.
    ///
    /// * `docs` - one vector of vocabulary indices per document
    /// * `n_word` - vocabulary size; every index must be below it
    pub fn from_documents(docs: Vec<Vec<usize>>, n_word: usize) -> Result<Self> {
        for (d, doc) in docs.iter().enumerate() {
            if let Some(&w) = doc.iter().find(|&&w| w >= n_word) {
                return Err(HdpError::MalformedInput {
                    line: d + 1,
                    reason: format!("word index {} >= vocabulary size {}", w, n_word),
                });
            }
        }
        Ok(Corpus { n_word, docs })
    }

    /// Parse lda-c formatted text.
    ///
    /// * `reader` - buffered source, one document per line
    /// * `n_doc` - number of documents to read; all lines if `None`
    /// * `n_word` - vocabulary size; `max index + 1` if `None`
    pub fn from_lda_c<R: BufRead>(
        reader: R,
        n_doc: Option<usize>,
        n_word: Option<usize>,
    ) -> Result<Self> {
        let mut docs = vec![];
        let mut lines = reader.lines();
        let mut max_word: Option<usize> = None;

        while n_doc.is_none_or(|n| docs.len() < n) {
            let line = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            let line_no = docs.len() + 1;
            let doc = parse_lda_c_line(&line, line_no, n_word)?;
            if let Some(&m) = doc.iter().max() {
                max_word = Some(max_word.map_or(m, |x| x.max(m)));
            }
            docs.push(doc);
        }

        if let Some(n) = n_doc {
            if docs.len() < n {
                return Err(HdpError::MalformedInput {
                    line: docs.len() + 1,
                    reason: format!("expected {} documents, found {}", n, docs.len()),
                });
            }
            if lines.any(|l| l.map(|s| !s.trim().is_empty()).unwrap_or(false)) {
                warn!("ignoring lines after the first {} documents", n);
            }
        }

        let n_word = n_word.unwrap_or_else(|| max_word.map_or(0, |m| m + 1));
        Ok(Corpus { n_word, docs })
    }

    /// Read an lda-c file (gzipped or not).
    pub fn read_lda_c(
        file: &str,
        n_doc: Option<usize>,
        n_word: Option<usize>,
    ) -> anyhow::Result<Self> {
        let corpus = Self::from_lda_c(open_buf_reader(file)?, n_doc, n_word)?;
        info!(
            "read {} documents, {} tokens, {} words from {}",
            corpus.n_doc(),
            corpus.n_token(),
            corpus.n_word(),
            file
        );
        Ok(corpus)
    }

    /// Number of documents
    pub fn n_doc(&self) -> usize {
        self.docs.len()
    }

    /// Vocabulary size
    pub fn n_word(&self) -> usize {
        self.n_word
    }

    /// Total number of tokens
    pub fn n_token(&self) -> usize {
        self.docs.iter().map(Vec::len).sum()
    }

    /// Tokens of document `d`
    #[inline]
    pub fn doc(&self, d: usize) -> &[usize] {
        &self.docs[d]
    }

    /// All documents in order
    pub fn docs(&self) -> &[Vec<usize>] {
        &self.docs
    }

    /// lda-c lines with word indices in increasing order
    pub fn to_lda_c_lines(&self) -> Vec<Box<str>> {
        self.docs
            .iter()
            .map(|doc| {
                let mut counts = vec![0usize; self.n_word];
                for &w in doc {
                    counts[w] += 1;
                }
                let pairs: Vec<String> = counts
                    .iter()
                    .enumerate()
                    .filter(|(_, &c)| c > 0)
                    .map(|(w, c)| format!("{}:{}", w, c))
                    .collect();
                let mut line = pairs.len().to_string();
                for p in pairs {
                    line.push(' ');
                    line.push_str(&p);
                }
                line.into_boxed_str()
            })
            .collect()
    }

    /// Write lda-c lines to `file` (gzipped if it ends in `.gz`)
    pub fn write_lda_c(&self, file: &str) -> anyhow::Result<()> {
        write_lines(&self.to_lda_c_lines(), file)
    }
}

fn parse_lda_c_line(line: &str, line_no: usize, n_word: Option<usize>) -> Result<Vec<usize>> {
    let malformed = |reason: String| HdpError::MalformedInput {
        line: line_no,
        reason,
    };

    let mut fields = line.split_whitespace();
    let n_pairs: usize = match fields.next() {
        None => return Ok(vec![]),
        Some(s) => s
            .parse()
            .map_err(|_| malformed(format!("bad pair count `{}`", s)))?,
    };

    let mut doc = vec![];
    let mut seen = 0;
    for field in fields {
        let (w, c) = field
            .split_once(':')
            .ok_or_else(|| malformed(format!("expected `word:count`, got `{}`", field)))?;
        let w: usize = w
            .parse()
            .map_err(|_| malformed(format!("bad word index `{}`", w)))?;
        let c: usize = c
            .parse()
            .map_err(|_| malformed(format!("bad count `{}`", c)))?;
        if let Some(v) = n_word {
            if w >= v {
                return Err(malformed(format!(
                    "word index {} >= vocabulary size {}",
                    w, v
                )));
            }
        }
        doc.extend(std::iter::repeat_n(w, c));
        seen += 1;
    }

    if seen != n_pairs {
        return Err(malformed(format!(
            "declared {} pairs, found {}",
            n_pairs, seen
        )));
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expands_counts() -> anyhow::Result<()> {
        let text = "2 0:2 3:1\n1 1:3\n";
        let corpus = Corpus::from_lda_c(text.as_bytes(), Some(2), Some(4))?;
        assert_eq!(corpus.n_doc(), 2);
        assert_eq!(corpus.n_word(), 4);
        assert_eq!(corpus.doc(0), &[0, 0, 3]);
        assert_eq!(corpus.doc(1), &[1, 1, 1]);
        assert_eq!(corpus.n_token(), 6);
        Ok(())
    }

    #[test]
    fn test_infers_sizes() -> anyhow::Result<()> {
        let text = "1 5:1\n\n2 0:1 2:2\n";
        let corpus = Corpus::from_lda_c(text.as_bytes(), None, None)?;
        assert_eq!(corpus.n_doc(), 3);
        assert_eq!(corpus.n_word(), 6);
        assert!(corpus.doc(1).is_empty());
        Ok(())
    }

    #[test]
    fn test_reads_only_requested_documents() -> anyhow::Result<()> {
        let text = "1 0:1\n1 1:1\n1 2:1\n";
        let corpus = Corpus::from_lda_c(text.as_bytes(), Some(2), None)?;
        assert_eq!(corpus.n_doc(), 2);
        assert_eq!(corpus.n_word(), 2);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_lines() {
        let cases = [
            ("x 0:1\n", 1),
            ("2 0:1\n", 1),
            ("1 0:1\n1 01\n", 2),
            ("1 0:1\n1 9:1\n", 2),
            ("1 0:a\n", 1),
        ];
        for (text, bad_line) in cases {
            match Corpus::from_lda_c(text.as_bytes(), None, Some(4)) {
                Err(HdpError::MalformedInput { line, .. }) => assert_eq!(line, bad_line, "{}", text),
                other => panic!("expected malformed input for {:?}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_too_few_documents() {
        let res = Corpus::from_lda_c("1 0:1\n".as_bytes(), Some(3), None);
        assert!(matches!(res, Err(HdpError::MalformedInput { line: 2, .. })));
    }

    #[test]
    fn test_lda_c_lines_reparse() -> anyhow::Result<()> {
        let corpus = Corpus::from_documents(vec![vec![3, 0, 3, 3], vec![], vec![1]], 5)?;
        let lines = corpus.to_lda_c_lines();
        assert_eq!(&*lines[0], "2 0:1 3:3");
        assert_eq!(&*lines[1], "0");
        assert_eq!(&*lines[2], "1 1:1");

        let text = lines.join("\n");
        let back = Corpus::from_lda_c(text.as_bytes(), Some(3), Some(5))?;
        assert_eq!(back.doc(0), &[0, 3, 3, 3]);
        assert!(back.doc(1).is_empty());
        assert_eq!(back.doc(2), &[1]);
        Ok(())
    }

    #[test]
    fn test_from_documents_bounds() {
        assert!(Corpus::from_documents(vec![vec![0, 1], vec![2]], 3).is_ok());
        assert!(matches!(
            Corpus::from_documents(vec![vec![0], vec![3]], 3),
            Err(HdpError::MalformedInput { line: 2, .. })
        ));
    }
}
