use minesweeper_core::types::{compose, compose_against_log, Operation, OperationKind};
use rstest::*;

fn operation(kind: OperationKind, row: i32, col: i32, sequence_id: i64) -> Operation {
  Operation {
    kind,
    row,
    col,
    sequence_id,
  }
}

#[rstest]
fn test_should_apply_only_the_earlier_operation_on_the_same_cell() {
  let first = operation(OperationKind::Reveal, 1, 1, 3);
  let second = operation(OperationKind::Reveal, 1, 1, 4);

  let result = compose(&first, &second);

  assert_eq!(result.apply, vec![first]);
  assert_eq!(result.delta_first, None);
  assert_eq!(result.delta_second, None);
}

#[rstest]
fn test_should_record_the_earlier_operation_as_delta_when_kinds_differ_on_the_same_cell() {
  let first = operation(OperationKind::Reveal, 1, 1, 3);
  let second = operation(OperationKind::Mark, 1, 1, 4);

  let result = compose(&first, &second);

  assert_eq!(result.apply, vec![first]);
  assert_eq!(result.delta_first, None);
  assert_eq!(result.delta_second, Some(first));
}

#[rstest]
fn test_should_apply_both_operations_on_different_cells_with_mutual_deltas() {
  let first = operation(OperationKind::Reveal, 0, 0, 3);
  let second = operation(OperationKind::Mark, 2, 1, 4);

  let result = compose(&first, &second);

  assert_eq!(result.apply, vec![first, second]);
  assert_eq!(result.delta_first, Some(second));
  assert_eq!(result.delta_second, Some(first));
}

#[rstest]
fn test_should_apply_against_an_empty_log_under_the_clients_own_sequence_id() {
  let incoming = operation(OperationKind::Reveal, 0, 0, 5);

  let composition = compose_against_log(&[], &incoming);

  assert!(composition.should_apply);
  assert!(composition.deltas.is_empty());
  assert_eq!(composition.sequence_id, 5);
}

#[rstest]
fn test_should_never_assign_the_uncommitted_sentinel_sequence_id() {
  let incoming = operation(OperationKind::Reveal, 0, 0, 0);

  let composition = compose_against_log(&[], &incoming);

  assert_eq!(composition.sequence_id, 1);
}

#[rstest]
fn test_should_assign_one_past_the_highest_committed_sequence_id() {
  let committed = vec![
    operation(OperationKind::Reveal, 0, 0, 3),
    operation(OperationKind::Mark, 0, 1, 4),
  ];
  let incoming = operation(OperationKind::Reveal, 2, 2, 2);

  let composition = compose_against_log(&committed, &incoming);

  assert!(composition.should_apply);
  assert_eq!(composition.deltas, committed);
  assert_eq!(composition.sequence_id, 5);
}

#[rstest]
fn test_should_not_apply_once_any_committed_operation_took_the_same_cell() {
  let committed = vec![
    operation(OperationKind::Reveal, 1, 1, 3),
    operation(OperationKind::Mark, 0, 1, 4),
  ];
  let incoming = operation(OperationKind::Mark, 1, 1, 2);

  let composition = compose_against_log(&committed, &incoming);

  assert!(!composition.should_apply);
  // the same-cell reveal invalidates the mark and still reaches the client,
  // together with the unrelated later operation
  assert_eq!(composition.deltas, committed);
}

#[rstest]
fn test_should_not_hand_back_a_same_cell_duplicate_of_the_same_kind_as_delta() {
  let committed = vec![operation(OperationKind::Reveal, 1, 1, 3)];
  let incoming = operation(OperationKind::Reveal, 1, 1, 3);

  let composition = compose_against_log(&committed, &incoming);

  assert!(!composition.should_apply);
  assert!(composition.deltas.is_empty());
  assert_eq!(composition.sequence_id, 4);
}
