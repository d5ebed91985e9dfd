//! SQL assembly of the checkpoint query scopes.
//!
//! The scope records conditions as data and renders SQL at execution time,
//! so these tests pin the rendered statement text (bind placeholders as
//! `$n`) without needing a database.

use checkpoint_core::Checkpoint;

const BASE_SELECT: &str =
    "SELECT id, owner_name, payload, created_at, last_edited_at, owner_id FROM gameplay_checkpoints";

#[test]
fn unscoped_select_has_no_where_clause() {
    assert_eq!(Checkpoint::scope().to_sql(), BASE_SELECT);
}

#[test]
fn owned_by_renders_the_ownership_filter() {
    let sql = Checkpoint::scope().owned_by("p-1").to_sql();
    assert_eq!(sql, format!("{BASE_SELECT} WHERE owner_id = $1"));
}

#[test]
fn id_and_owner_combine_with_and() {
    let sql = Checkpoint::scope().with_id(7).owned_by("p-1").to_sql();
    assert_eq!(sql, format!("{BASE_SELECT} WHERE id = $1 AND owner_id = $2"));
}

#[test]
fn unowned_renders_null_check_without_bind() {
    let sql = Checkpoint::scope().unowned().to_sql();
    assert_eq!(sql, format!("{BASE_SELECT} WHERE owner_id IS NULL"));
}

#[test]
fn ordering_and_limit_follow_the_predicate() {
    let sql = Checkpoint::scope()
        .owned_by("p-1")
        .order_by_id(true)
        .limit(10)
        .to_sql();
    assert_eq!(
        sql,
        format!("{BASE_SELECT} WHERE owner_id = $1 ORDER BY id ASC LIMIT $2")
    );

    let descending = Checkpoint::scope().order_by_id(false).to_sql();
    assert_eq!(descending, format!("{BASE_SELECT} ORDER BY id DESC"));
}

#[test]
fn chaining_order_is_irrelevant_to_rendering() {
    // Conditions are fields, not streamed text, so call order cannot change
    // the rendered statement
    let a = Checkpoint::scope().order_by_id(true).owned_by("p-1").to_sql();
    let b = Checkpoint::scope().owned_by("p-1").order_by_id(true).to_sql();
    assert_eq!(a, b);
}
