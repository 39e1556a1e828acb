//! Property-based tests for hashing, accessions and reconciliation.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p biosamples --test property_tests
//!
//! # More cases
//! PROPTEST_CASES=10000 cargo test -p biosamples --test property_tests
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use biosamples::clock::FixedClock;
use biosamples::config::AccessionConfig;
use biosamples::model::{Attribute, Owner, Relationship, SubmissionChannel};
use biosamples::store::MemoryStore;
use biosamples::{
    Accession, AccessionAllocator, Curation, Namespace, ReconciliationEngine, RegistryConfig,
    Sample, WriteContext,
};

// =============================================================================
// Test Strategies
// =============================================================================

fn attribute() -> impl Strategy<Value = Attribute> {
    ("[a-z]{1,12}", "[A-Za-z0-9]{1,16}", proptest::option::of("[a-z]{1,4}")).prop_map(
        |(t, v, unit)| match unit {
            Some(unit) => Attribute::new(t, v).with_unit(unit),
            None => Attribute::new(t, v),
        },
    )
}

fn relationship() -> impl Strategy<Value = Relationship> {
    (
        proptest::option::of("SAMEA[0-9]{1,6}"),
        prop_oneof![Just("has member"), Just("derived from"), Just("same as")],
        "SAMEA[0-9]{1,6}",
    )
        .prop_map(|(source, kind, target)| match source {
            Some(source) => Relationship::new(source, kind, target),
            None => Relationship::unsourced(kind, target),
        })
}

fn channel() -> impl Strategy<Value = SubmissionChannel> {
    prop_oneof![
        Just(SubmissionChannel::PipelineEna),
        Just(SubmissionChannel::PipelineNcbi),
        Just(SubmissionChannel::FileUpload),
        Just(SubmissionChannel::InteractiveApi),
    ]
}

fn engine() -> ReconciliationEngine {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    ReconciliationEngine::new(&RegistryConfig::default(), Arc::new(MemoryStore::new()))
        .with_clock(Arc::new(FixedClock(now)))
}

// =============================================================================
// Curation order independence
// =============================================================================

proptest! {
    #[test]
    fn curation_hash_ignores_order(
        pre in proptest::collection::vec(attribute(), 0..8),
        post in proptest::collection::vec(attribute(), 0..8),
        rels in proptest::collection::vec(relationship(), 0..6),
    ) {
        let forward = Curation::build(
            pre.clone(), post.clone(), [], [], rels.clone(), [],
        );

        let mut pre_rev = pre;
        pre_rev.reverse();
        let mut post_rev = post;
        post_rev.reverse();
        let mut rels_rev = rels;
        rels_rev.reverse();
        let backward = Curation::build(pre_rev, post_rev, [], [], rels_rev, []);

        prop_assert_eq!(forward.hash(), backward.hash());
    }

    #[test]
    fn curation_hash_ignores_duplicates(attrs in proptest::collection::vec(attribute(), 1..6)) {
        let mut doubled = attrs.clone();
        doubled.extend(attrs.iter().cloned());

        let single = Curation::attributes(attrs, []);
        let double = Curation::attributes(doubled, []);
        prop_assert_eq!(single.hash(), double.hash());
    }
}

// =============================================================================
// Accession grammar
// =============================================================================

proptest! {
    #[test]
    fn accession_split_round_trips(prefix in "[A-Z]{1,6}", digits in "[0-9]{1,12}") {
        let raw = format!("{}{}", prefix, digits);
        let accession = Accession::parse(&raw).unwrap();
        let (p, d) = accession.split();

        prop_assert_eq!(p, prefix.as_str());
        prop_assert_eq!(d, digits.as_str());
        prop_assert_eq!(format!("{}{}", p, d), raw);
    }

    #[test]
    fn accession_parse_never_panics(input in "\\PC{0,40}") {
        let parsed = Accession::parse(&input);
        prop_assert_eq!(parsed.is_ok(), Accession::is_valid(&input));
    }

    #[test]
    fn relationship_order_puts_missing_source_last(rel in relationship(), source in "SAMEA[0-9]{1,6}") {
        let sourced = Relationship::new(source, rel.relationship_type.clone(), rel.target.clone());
        let unsourced = Relationship::unsourced(rel.relationship_type.clone(), rel.target.clone());
        prop_assert!(sourced < unsourced);
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

proptest! {
    #[test]
    fn reconcile_is_idempotent(
        attrs in proptest::collection::vec(attribute(), 0..6),
        rels in proptest::collection::vec(relationship(), 0..4),
        channel in channel(),
        privileged in any::<bool>(),
    ) {
        let accession = Accession::parse("SAMEA10").unwrap();
        let existing = Sample::new("stored")
            .with_accession(accession.clone())
            .with_release(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
            .with_attribute(Attribute::sra_accession("ERS10"))
            .with_relationship(Relationship::new("SAMEA10", "has member", "SAMEA11"));

        let mut incoming = Sample::new("incoming")
            .with_accession(accession)
            .with_release(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        incoming.attributes.extend(attrs.into_iter().filter(|a| !a.is_sra_accession()));
        incoming.relationships.extend(rels);

        let mut context = WriteContext::new(Owner::Domain("self.test".into()), channel);
        if privileged {
            context = context.privileged();
        }

        let engine = engine();
        let first = engine.reconcile(&incoming, Some(&existing), &context).unwrap();
        let second = engine.reconcile(&incoming, Some(&existing), &context).unwrap();

        prop_assert_eq!(
            serde_json::to_string(&first.sample).unwrap(),
            serde_json::to_string(&second.sample).unwrap()
        );
        prop_assert_eq!(first.sample.sra_accession(), Some("ERS10"));
    }
}

// =============================================================================
// Concurrent allocation
// =============================================================================

#[test]
fn concurrent_allocators_never_repeat() {
    let store = Arc::new(MemoryStore::new());
    let allocators: Vec<AccessionAllocator> = (0..8)
        .map(|_| AccessionAllocator::new(store.clone(), AccessionConfig::default()))
        .collect();

    let allocated: Vec<Accession> = std::thread::scope(|scope| {
        let handles: Vec<_> = allocators
            .iter()
            .map(|allocator| {
                scope.spawn(move || {
                    (0..250)
                        .map(|_| allocator.allocate(Namespace::Sample).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(allocated.len(), 2000);
    assert!(allocated.iter().all(|a| Accession::is_valid(a.as_str())));
    let unique: HashSet<&Accession> = allocated.iter().collect();
    assert_eq!(unique.len(), allocated.len());
}

#[test]
fn allocation_is_monotonic_per_thread() {
    let store = Arc::new(MemoryStore::new());
    let allocator = AccessionAllocator::new(store, AccessionConfig::default());

    let numbers: Vec<u64> = (0..100)
        .map(|_| allocator.allocate(Namespace::Group).unwrap().number().unwrap())
        .collect();
    assert!(numbers.windows(2).all(|pair| pair[0] < pair[1]));
}
