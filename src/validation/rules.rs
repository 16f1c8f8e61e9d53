//! Label checks using Validation.

use crate::persist::is_marker;
use crate::validation::violations::Violation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of one or more checks; failures carry every violation found.
pub type CheckResult = Validation<(), NonEmptyVec<Violation>>;

/// Check that `label` reads back unchanged from the text format.
///
/// Names and triggers are read as whitespace-separated tokens joined by a
/// single space, and tokens shaped like `:marker:` end a phrase. All problems
/// with the label are reported together.
pub fn check_label(subject: &str, label: &str) -> CheckResult {
    if label.is_empty() {
        return Validation::fail(Violation::EmptyLabel {
            subject: subject.to_string(),
        });
    }

    let mut checks: Vec<CheckResult> = Vec::new();

    let normalized = label.split_whitespace().collect::<Vec<_>>().join(" ");
    checks.push(if normalized == label {
        Validation::success(())
    } else {
        Validation::fail(Violation::IrregularWhitespace {
            subject: subject.to_string(),
            label: label.to_string(),
        })
    });

    for token in label.split_whitespace().filter(|token| is_marker(token)) {
        checks.push(Validation::fail(Violation::MarkerToken {
            subject: subject.to_string(),
            label: label.to_string(),
            token: token.to_string(),
        }));
    }

    Validation::all_vec(checks).map(|_| ())
}
