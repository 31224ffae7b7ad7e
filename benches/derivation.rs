//! Benchmarks for the rewrite pass and the state-threading evaluator.
//!
//! A linear growth grammar (end marker sprouts a step, a probe, and a fresh
//! marker; every step lengthens each generation) keeps the sequence growing
//! arithmetically, so the rewrite benchmark measures repeated full passes
//! over an ever-longer chain.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lindenmayer::prelude::*;
use std::any::Any;

const MARKER: ModuleKind = ModuleKind::new(1);
const STEP: ModuleKind = ModuleKind::new(2);
const PROBE: ModuleKind = ModuleKind::new(3);

struct Marker;

impl Module<i64> for Marker {
    fn kind(&self) -> ModuleKind {
        MARKER
    }
    fn change_state(&mut self, _state: &mut SystemState<i64>) {}
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Step {
    length: i64,
}

impl Module<i64> for Step {
    fn kind(&self) -> ModuleKind {
        STEP
    }
    fn change_state(&mut self, state: &mut SystemState<i64>) {
        *state.current_mut() += self.length;
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Probe {
    seen: Option<i64>,
}

impl Module<i64> for Probe {
    fn kind(&self) -> ModuleKind {
        PROBE
    }
    fn change_state(&mut self, _state: &mut SystemState<i64>) {}
    fn as_query(&mut self) -> Option<&mut dyn QueryModule<i64>> {
        Some(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl QueryModule<i64> for Probe {
    fn query_state(&mut self, state: &SystemState<i64>) {
        self.seen = Some(*state.current());
    }
}

fn growth_system() -> DerivationSequence<i64> {
    let sprout = Production::new(MARKER, |generation, _window| {
        vec![
            Node::new(generation, Step { length: 1 }),
            Node::new(generation, Probe { seen: None }),
            Node::new(generation, Marker),
        ]
    });
    let lengthen = Production::new(STEP, |generation, window| {
        let length = window
            .node
            .module_as::<Step>()
            .map(|s| s.length)
            .unwrap_or(0);
        vec![Node::new(generation, Step { length: length + 1 })]
    });
    DerivationSequence::new(vec![Node::new(0, Marker)], vec![sprout, lengthen])
        .expect("non-empty axiom")
}

/// Measures 32 full generations of rewriting, including the repeated
/// per-production passes over the grown sequence.
fn bench_advance_32_generations(c: &mut Criterion) {
    c.bench_function("advance_32_generations", |b| {
        b.iter(|| {
            let mut system = growth_system();
            for _ in 0..32 {
                system.advance_generation().expect("well-stamped builders");
            }
            black_box(system.len())
        });
    });
}

/// Measures state threading over a grown derivation, query modules
/// included.
fn bench_evaluate_grown_sequence(c: &mut Criterion) {
    let mut system = growth_system();
    for _ in 0..32 {
        system.advance_generation().expect("well-stamped builders");
    }
    c.bench_function("evaluate_grown_sequence", |b| {
        b.iter(|| {
            let sequence = system.evaluate_with(black_box(&0));
            black_box(sequence.len())
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10); // smaller sample for speed
    targets = bench_advance_32_generations, bench_evaluate_grown_sequence
);
criterion_main!(benches);
