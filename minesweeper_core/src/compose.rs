use serde::{Deserialize, Serialize};

use crate::algebra::OperationKind;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct Operation {
  pub kind: OperationKind,
  pub row: i32,
  pub col: i32,
  /// Assigned by the server at commit time. On an incoming operation this
  /// holds the client's provisional id: one past the highest committed id
  /// it has observed.
  pub sequence_id: i64,
}

impl Operation {
  pub fn targets_same_cell(&self, other: &Operation) -> bool {
    self.row == other.row && self.col == other.col
  }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CompositionResult {
  pub apply: Vec<Operation>,
  pub delta_first: Option<Operation>,
  pub delta_second: Option<Operation>,
}

/// Composes two operations, `first` being the earlier-sequenced one.
///
/// On the same cell only `first` applies; `second` additionally learns about
/// `first` as a delta when the kinds differ, since a later operation of a
/// different kind must not blindly reapply to a cell `first` already
/// mutated. On different cells both apply independently and each is the
/// other's delta.
pub fn compose(first: &Operation, second: &Operation) -> CompositionResult {
  if first.targets_same_cell(second) {
    CompositionResult {
      apply: vec![*first],
      delta_first: None,
      delta_second: (first.kind != second.kind).then_some(*first),
    }
  } else {
    CompositionResult {
      apply: vec![*first, *second],
      delta_first: Some(*second),
      delta_second: Some(*first),
    }
  }
}

#[derive(Debug, PartialEq, Eq)]
pub struct LogComposition {
  pub should_apply: bool,
  pub deltas: Vec<Operation>,
  /// Sequence id the incoming operation would commit under.
  pub sequence_id: i64,
}

/// Left-folds [`compose`] over the committed operations (ascending by
/// sequence id) that the incoming operation's client has not observed.
///
/// The incoming operation loses its effect as soon as any committed
/// operation targets the same cell; the fold still visits the rest of the
/// log so the client receives the complete delta list to catch up with.
pub fn compose_against_log(committed: &[Operation], incoming: &Operation) -> LogComposition {
  let mut should_apply = true;
  let mut deltas = Vec::new();

  for earlier in committed {
    let pair = compose(earlier, incoming);
    if let Some(delta) = pair.delta_second {
      deltas.push(delta);
    }
    if earlier.targets_same_cell(incoming) {
      should_apply = false;
    }
  }

  let sequence_id = committed
    .iter()
    .map(|operation| operation.sequence_id)
    .max()
    .map_or_else(|| incoming.sequence_id.max(1), |highest| highest + 1);

  LogComposition {
    should_apply,
    deltas,
    sequence_id,
  }
}
