// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two kinds of metrics:
//
//   EpochMetrics / MetricsLogger
//     One CSV row per epoch in {output_dir}/metrics.csv:
//       epoch,train_loss,val_loss,val_accuracy
//       1,2.4123,2.3011,0.18
//
//   ClassificationReport
//     Per-class precision / recall / F1 / support on the test
//     partition, plus accuracy, macro average and
//     support-weighted average. A metric whose denominator is
//     zero is reported as 0.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fmt,
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// One row of metrics.csv
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based
    pub epoch:        usize,
    /// Mean weighted loss over the training batches
    pub train_loss:   f64,
    pub val_loss:     f64,
    pub val_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_accuracy: f64) -> Self {
        Self { epoch, train_loss, val_loss, val_accuracy }
    }

    /// Lower validation loss than `best_val_loss`.
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Appends one `EpochMetrics` row per epoch to `{dir}/metrics.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Creates `dir` and the CSV with its header row. An existing file is
    /// appended to.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut writer = csv::Writer::from_path(&csv_path)?;
            writer.write_record(["epoch", "train_loss", "val_loss", "val_accuracy"])?;
            writer.flush()?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(m)?;
        writer.flush()?;

        tracing::debug!(
            "Epoch {} logged to '{}'",
            m.epoch,
            self.csv_path.display()
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    #[cfg(test)]
    pub(crate) fn read_all(&self) -> Result<Vec<EpochMetrics>> {
        let mut reader = csv::Reader::from_path(&self.csv_path)?;
        reader
            .deserialize()
            .map(|row| row.with_context(|| format!("Malformed row in '{}'", self.csv_path.display())))
            .collect()
    }
}

// ─── Classification Report ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub name:      String,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

/// Averaged precision / recall / F1 over all classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes:      Vec<ClassMetrics>,
    pub accuracy:     f64,
    pub macro_avg:    AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
    pub total:        usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl ClassificationReport {
    /// `class_names[i]` names class id `i`. Predictions outside the
    /// class range count as misses for the true class.
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize], class_names: &[String]) -> Self {
        let n_classes = class_names.len();
        let mut tp = vec![0usize; n_classes];
        let mut fp = vec![0usize; n_classes];
        let mut fn_ = vec![0usize; n_classes];

        let mut correct = 0usize;
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t == p {
                correct += 1;
                if t < n_classes {
                    tp[t] += 1;
                }
            } else {
                if t < n_classes {
                    fn_[t] += 1;
                }
                if p < n_classes {
                    fp[p] += 1;
                }
            }
        }

        let classes: Vec<ClassMetrics> = class_names
            .iter()
            .enumerate()
            .map(|(c, name)| {
                let precision = ratio(tp[c], tp[c] + fp[c]);
                let recall    = ratio(tp[c], tp[c] + fn_[c]);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else { 0.0 };
                ClassMetrics {
                    name: name.clone(),
                    precision,
                    recall,
                    f1,
                    support: tp[c] + fn_[c],
                }
            })
            .collect();

        let total = y_true.len().min(y_pred.len());
        let k     = n_classes.max(1) as f64;

        let macro_avg = AveragedMetrics {
            precision: classes.iter().map(|m| m.precision).sum::<f64>() / k,
            recall:    classes.iter().map(|m| m.recall).sum::<f64>() / k,
            f1:        classes.iter().map(|m| m.f1).sum::<f64>() / k,
        };

        let support_sum = classes.iter().map(|m| m.support).sum::<usize>();
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if support_sum == 0 {
                0.0
            } else {
                classes.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / support_sum as f64
            }
        };
        let weighted_avg = AveragedMetrics {
            precision: weighted(|m| m.precision),
            recall:    weighted(|m| m.recall),
            f1:        weighted(|m| m.f1),
        };

        Self {
            accuracy: ratio(correct, total),
            classes,
            macro_avg,
            weighted_avg,
            total,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|m| m.name.len())
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(12);

        writeln!(f, "{:>width$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for m in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>width$} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, self.total)?;
        for (label, avg) in [("macro avg", self.macro_avg), ("weighted avg", self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, avg.precision, avg.recall, avg.f1, self.total
            )?;
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 2.5, 2.3, 0.2);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_logger_appends_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 1.5, 1.25, 0.5)).unwrap();
        logger.log(&EpochMetrics::new(2, 1.0, 1.0, 0.75)).unwrap();

        let contents = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(contents.lines().next(), Some("epoch,train_loss,val_loss,val_accuracy"));

        let rows = logger.read_all().unwrap();
        assert_eq!(rows, vec![
            EpochMetrics::new(1, 1.5, 1.25, 0.5),
            EpochMetrics::new(2, 1.0, 1.0, 0.75),
        ]);

        // A second logger on the same directory does not rewrite the header
        let again = MetricsLogger::new(dir.path()).unwrap();
        again.log(&EpochMetrics::new(3, 0.5, 0.5, 1.0)).unwrap();
        assert_eq!(again.read_all().unwrap().len(), 3);
    }

    #[test]
    fn test_report_by_hand() {
        // class 0: 3 true, 2 found, 1 false alarm
        // class 1: 2 true, 1 found
        // class 2: 1 true, 1 found, 1 false alarm
        let y_true = [0, 0, 0, 1, 1, 2];
        let y_pred = [0, 0, 2, 1, 0, 2];
        let r = ClassificationReport::from_predictions(&y_true, &y_pred, &names(&["a", "b", "c"]));

        assert_eq!(r.total, 6);
        assert!((r.accuracy - 4.0 / 6.0).abs() < 1e-12);

        let a = &r.classes[0];
        assert!((a.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((a.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(a.support, 3);

        let b = &r.classes[1];
        assert!((b.precision - 1.0).abs() < 1e-12);
        assert!((b.recall - 0.5).abs() < 1e-12);
        assert!((b.f1 - 2.0 / 3.0).abs() < 1e-12);

        let c = &r.classes[2];
        assert!((c.precision - 0.5).abs() < 1e-12);
        assert!((c.recall - 1.0).abs() < 1e-12);

        let macro_recall = (2.0 / 3.0 + 0.5 + 1.0) / 3.0;
        assert!((r.macro_avg.recall - macro_recall).abs() < 1e-12);

        // Weighted recall equals accuracy
        assert!((r.weighted_avg.recall - r.accuracy).abs() < 1e-12);
    }

    #[test]
    fn test_class_never_predicted_scores_zero() {
        let r = ClassificationReport::from_predictions(&[0, 1], &[0, 0], &names(&["x", "y"]));
        assert_eq!(r.classes[1].precision, 0.0);
        assert_eq!(r.classes[1].recall, 0.0);
        assert_eq!(r.classes[1].f1, 0.0);
    }

    #[test]
    fn test_display_lists_every_class() {
        let r    = ClassificationReport::from_predictions(&[0, 1], &[0, 1], &names(&["bug", "docs"]));
        let text = r.to_string();
        assert!(text.contains("bug"));
        assert!(text.contains("docs"));
        assert!(text.contains("accuracy"));
        assert!(text.contains("weighted avg"));
    }
}
