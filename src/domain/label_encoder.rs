// ============================================================
// Layer 3 — Label Encoder
// ============================================================
// Maps string class codes to dense integer ids.
//
// Classes are sorted lexicographically, so the mapping depends
// only on the *set* of labels and never on row order. The encoder
// is fitted exactly once on the full cleaned dataset and then
// shared by every partition; refitting per partition would
// silently renumber classes.
//
// Index i of `classes` is class id i. Everything downstream that
// is indexed by class (weights, logits, report rows) follows this
// order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::DataError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on every label in the dataset.
    pub fn fit<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let classes: BTreeSet<&str> = labels.into_iter().collect();
        Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_classes(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn encode(&self, label: &str) -> Result<usize, DataError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| DataError::UnknownLabel(label.to_string()))
    }

    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_classes_are_sorted_and_unique() {
        let enc = LabelEncoder::fit(["b", "a", "c", "a", "b"]);
        assert_eq!(enc.classes(), &["a", "b", "c"]);
        assert_eq!(enc.len(), 3);
    }

    #[test]
    fn test_encode_decode_is_a_bijection() {
        let labels = ["Bug", "Feature", "Question", "Bug", "Docs"];
        let enc    = LabelEncoder::fit(labels);

        let decoded: HashSet<&str> = labels
            .iter()
            .map(|l| enc.decode(enc.encode(l).unwrap()).unwrap())
            .collect();
        let original: HashSet<&str> = labels.iter().copied().collect();
        assert_eq!(decoded, original);

        // Distinct labels get distinct ids
        let ids: HashSet<usize> = original.iter().map(|l| enc.encode(l).unwrap()).collect();
        assert_eq!(ids.len(), original.len());
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let enc = LabelEncoder::fit(["x", "y"]);
        assert!(matches!(enc.encode("z"), Err(DataError::UnknownLabel(l)) if l == "z"));
        assert!(enc.decode(2).is_none());
    }

    #[test]
    fn test_fit_is_independent_of_row_order() {
        let a = LabelEncoder::fit(["p", "q", "r"]);
        let b = LabelEncoder::fit(["r", "p", "q", "p"]);
        assert_eq!(a, b);
    }
}
