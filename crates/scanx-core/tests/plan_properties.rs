//! Behavioural properties of `ScanPlan` verified against scripted backend stubs.
//!
//! - Pushdown is idempotent, sound (accepted is a subset of candidates) and keeps
//!   rejected predicates visible in the combined filter.
//! - Pruning narrows the read schema to exactly what was requested.
//! - Pruning and pushdown give the same plan in either order.
//! - Partition planning consults exactly one enumeration source and wraps 1:1.
//! - Unknown statistics stay unknown.
//! - Plan identity depends on table, normalized schema and combined filter only.

mod common;

use common::{init_tracing, orders_schema, StubContext};
use scanx_core::context::ReaderContext;
use scanx_core::schema::FIELD_ID_KEY;
use scanx_core::{
    InMemoryReaderContext, Predicate, ScanError, ScanPlan, Schema, Statistics, TableId,
    TableStatistics,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

fn plan(ctx: StubContext) -> ScanPlan {
    init_tracing();
    ScanPlan::new(Box::new(ctx))
}

fn hash_of(plan: &ScanPlan) -> u64 {
    let mut h = DefaultHasher::new();
    plan.hash(&mut h);
    h.finish()
}

// ---------------------------------------------------------------------------
// Pushdown
// ---------------------------------------------------------------------------

#[test]
fn test_empty_pushdown_does_not_reach_backend() {
    let ctx = StubContext::new("orders");
    let calls = ctx.calls.clone();
    let mut p = plan(ctx);

    p.push_filters(&[Predicate::equal_to("country", "US")]).unwrap();
    let before = p.pushed_filters();
    let outcome = p.push_filters(&[]).unwrap();

    assert!(outcome.accepted.is_empty());
    assert!(outcome.residual.is_empty());
    assert_eq!(p.pushed_filters(), before);
    assert_eq!(calls.push(), 1);
}

#[test]
fn test_pushed_filters_stable_between_reads() {
    let mut p = plan(StubContext::new("orders"));
    p.push_filters(&[Predicate::gt("amount", 100), Predicate::is_not_null("id")])
        .unwrap();
    assert_eq!(p.pushed_filters(), p.pushed_filters());
}

#[test]
fn test_rejected_predicate_is_residual_and_in_combined_filter() {
    let rejected = Predicate::StringContains {
        column: "country".into(),
        needle: "land".into(),
    };
    let mut ctx = StubContext::new("orders");
    ctx.unsupported = vec![rejected.clone()];
    let mut p = plan(ctx);

    let candidates = vec![Predicate::gt("amount", 100), rejected.clone()];
    let outcome = p.push_filters(&candidates).unwrap();

    assert!(outcome.accepted.iter().all(|a| candidates.contains(a)));
    assert!(!outcome.accepted.contains(&rejected));
    assert_eq!(outcome.residual, vec![rejected.clone()]);

    let combined = p.combined_filter_expression().unwrap();
    assert!(combined.contains(&rejected.to_sql()));
    assert!(combined.contains("`amount` > 100"));
}

#[test]
fn test_negotiation_failure_propagates() {
    let mut ctx = StubContext::new("orders");
    ctx.fail_push = true;
    let mut p = plan(ctx);

    let err = p.push_filters(&[Predicate::gt("amount", 1)]).unwrap_err();
    assert_eq!(err, ScanError::Backend("filter negotiation refused".into()));
    assert!(p.pushed_filters().is_empty());
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

#[test]
fn test_pruning_narrows_monotonically() {
    let mut p = plan(StubContext::new("orders"));

    let first = orders_schema().select(&["id", "amount"]).unwrap();
    p.prune_columns(&first).unwrap();
    assert_eq!(p.read_schema(), first);

    let second = first.select(&["amount"]).unwrap();
    p.prune_columns(&second).unwrap();
    assert_eq!(p.read_schema(), second);
    assert_eq!(p.read_schema().names(), vec!["amount"]);
}

// ---------------------------------------------------------------------------
// Negotiation order
// ---------------------------------------------------------------------------

fn country_contains_land() -> Predicate {
    Predicate::StringContains {
        column: "country".into(),
        needle: "land".into(),
    }
}

/// Negotiates the same pruning and pushdown on two fresh contexts, in opposite order.
fn assert_negotiation_order_irrelevant<F>(make: F)
where
    F: Fn() -> Box<dyn ReaderContext>,
{
    init_tracing();
    let required = orders_schema().select(&["id", "amount"]).unwrap();
    let candidates = vec![Predicate::gt("amount", 100), country_contains_land()];

    let mut prune_first = ScanPlan::new(make());
    prune_first.prune_columns(&required).unwrap();
    let outcome_a = prune_first.push_filters(&candidates).unwrap();

    let mut push_first = ScanPlan::new(make());
    let outcome_b = push_first.push_filters(&candidates).unwrap();
    push_first.prune_columns(&required).unwrap();

    assert_eq!(outcome_a, outcome_b);
    assert_eq!(outcome_a.residual, vec![country_contains_land()]);
    assert_eq!(prune_first.read_schema(), push_first.read_schema());
    assert_eq!(prune_first.pushed_filters(), push_first.pushed_filters());
    assert_eq!(
        prune_first.combined_filter_expression(),
        push_first.combined_filter_expression()
    );
    assert_eq!(prune_first, push_first);
    assert_eq!(hash_of(&prune_first), hash_of(&push_first));
}

#[test]
fn test_negotiation_order_irrelevant_for_stub() {
    assert_negotiation_order_irrelevant(|| {
        let mut ctx = StubContext::new("orders");
        ctx.unsupported = vec![country_contains_land()];
        Box::new(ctx)
    });
}

#[test]
fn test_negotiation_order_irrelevant_in_memory() {
    assert_negotiation_order_irrelevant(|| {
        Box::new(
            InMemoryReaderContext::new(TableId::new("acme", "sales", "orders"), orders_schema())
                .with_rejected_columns(["country"])
                .with_stream_count(3),
        )
    });
}

// ---------------------------------------------------------------------------
// Partition planning
// ---------------------------------------------------------------------------

#[test]
fn test_row_mode_consults_only_row_source() {
    let ctx = StubContext::new("orders").with_partitions(2, 7);
    let calls = ctx.calls.clone();
    let mut p = plan(ctx);

    let parts = p.plan_partitions().unwrap();
    assert_eq!(parts.len(), 7);
    assert!(parts.iter().all(|h| !h.is_columnar()));
    assert_eq!((calls.batch(), calls.row()), (0, 1));
}

#[test]
fn test_batch_mode_consults_only_batch_source() {
    let mut ctx = StubContext::new("orders").with_partitions(2, 7);
    ctx.batch_mode = true;
    let calls = ctx.calls.clone();
    let mut p = plan(ctx);

    let parts = p.plan_partitions().unwrap();
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|h| h.is_columnar()));
    assert!(p.reader_factory().supports_columnar_reads(&parts[0]));
    assert_eq!((calls.batch(), calls.row()), (1, 0));
}

#[test]
fn test_partitions_are_complete_and_unique() {
    let mut p = plan(StubContext::new("orders").with_partitions(0, 12));
    let parts = p.plan_partitions().unwrap();

    let streams: HashSet<&str> = parts.iter().flat_map(|h| h.streams()).collect();
    assert_eq!(parts.len(), 12);
    assert_eq!(streams.len(), 12);
    let indices: HashSet<u32> = parts.iter().map(|h| h.index).collect();
    assert_eq!(indices.len(), 12);
}

#[test]
fn test_empty_table_has_no_partitions() {
    let mut p = plan(StubContext::new("orders"));
    assert!(p.plan_partitions().unwrap().is_empty());
}

#[test]
fn test_partition_failure_is_not_an_empty_list() {
    let mut ctx = StubContext::new("orders").with_partitions(3, 3);
    ctx.fail_partitions = true;
    let mut p = plan(ctx);

    assert!(matches!(
        p.plan_partitions(),
        Err(ScanError::Partitioning { .. })
    ));
}

#[test]
fn test_replanning_is_allowed() {
    let mut p = plan(StubContext::new("orders").with_partitions(0, 4));
    let first = p.plan_partitions().unwrap();
    p.prune_columns(&orders_schema().select(&["id"]).unwrap())
        .unwrap();
    let second = p.plan_partitions().unwrap();
    assert_eq!(first.len(), second.len());
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_row_count_is_absent() {
    let mut ctx = StubContext::new("orders");
    ctx.statistics = TableStatistics {
        num_rows: None,
        num_bytes: Some(1 << 20),
    };
    let stats = plan(ctx).estimate_statistics();
    assert_eq!(
        stats,
        Statistics {
            row_count: None,
            size_in_bytes: Some(1 << 20),
        }
    );
}

#[test]
fn test_fully_unknown_statistics() {
    let stats = plan(StubContext::new("orders")).estimate_statistics();
    assert!(stats.is_unknown());
    assert_ne!(stats.row_count, Some(0));
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

fn negotiated(ctx: StubContext) -> ScanPlan {
    let mut p = plan(ctx);
    p.prune_columns(&orders_schema().select(&["id", "amount"]).unwrap())
        .unwrap();
    p.push_filters(&[Predicate::equal_to("country", "US")]).unwrap();
    p
}

fn with_field_ids(schema: &Schema, base: u32) -> Schema {
    let mut s = schema.clone();
    for (i, f) in s.fields.iter_mut().enumerate() {
        f.metadata
            .insert(FIELD_ID_KEY.into(), (base + i as u32).to_string());
    }
    s
}

#[test]
fn test_identity_ignores_context_instance_and_field_ids() {
    let a = negotiated(StubContext::new("orders"));

    let mut b = plan(StubContext::new("orders"));
    let required = orders_schema().select(&["id", "amount"]).unwrap();
    b.prune_columns(&with_field_ids(&required, 40)).unwrap();
    b.push_filters(&[Predicate::equal_to("country", "US")]).unwrap();

    assert_ne!(a.read_schema(), b.read_schema());
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn test_identity_ignores_partitions_and_statistics() {
    let a = negotiated(StubContext::new("orders").with_partitions(1, 1));
    let mut ctx = StubContext::new("orders").with_partitions(9, 9);
    ctx.statistics = TableStatistics::new(10, 100);
    let b = negotiated(ctx);
    assert_eq!(a, b);
}

#[test]
fn test_identity_flips_on_table() {
    let a = negotiated(StubContext::new("orders"));
    let b = negotiated(StubContext::new("returns"));
    assert_ne!(a, b);
}

#[test]
fn test_identity_flips_on_schema() {
    let a = negotiated(StubContext::new("orders"));
    let mut b = negotiated(StubContext::new("orders"));
    b.prune_columns(&orders_schema().select(&["id"]).unwrap())
        .unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_identity_flips_on_filter() {
    let a = negotiated(StubContext::new("orders"));
    let mut b = negotiated(StubContext::new("orders"));
    b.push_filters(&[Predicate::equal_to("country", "CA")]).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_identity_depends_on_backend_kind() {
    let stub = negotiated(StubContext::new("orders"));
    let mut memory = ScanPlan::new(Box::new(InMemoryReaderContext::new(
        TableId::new("acme", "sales", "orders"),
        orders_schema(),
    )));
    memory
        .prune_columns(&orders_schema().select(&["id", "amount"]).unwrap())
        .unwrap();
    memory
        .push_filters(&[Predicate::equal_to("country", "US")])
        .unwrap();

    assert_eq!(stub.combined_filter_expression(), memory.combined_filter_expression());
    assert_ne!(stub, memory);
}
