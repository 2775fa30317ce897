use criterion::{Criterion, criterion_group, criterion_main};
use deflist_engine::{LiveEngine, TreeSitterOracle};
mod common;

/// Types a word one character at a time inside a definition, then deletes it.
fn bench_typing_in_definition(c: &mut Criterion) {
    let mut group = c.benchmark_group("typing");
    group.sample_size(10);

    let content = common::generate_glossary(1_000);
    let offset = content.find(":   definition of term 500").expect("entry exists") + 8;

    group.bench_function("definition_text", |b| {
        b.iter(|| {
            let oracle = TreeSitterOracle::new(&content).expect("grammar loads");
            let mut engine = LiveEngine::open(&content, oracle);
            for (i, ch) in "glacier ".chars().enumerate() {
                let at = offset + i;
                let report = engine
                    .apply_edit(at..at, ch.encode_utf8(&mut [0; 4]))
                    .expect("edit applies");
                std::hint::black_box(report);
            }
            engine
                .apply_edit(offset..offset + 8, "")
                .expect("edit applies");
        });
    });

    group.bench_function("marker_toggle", |b| {
        b.iter(|| {
            let oracle = TreeSitterOracle::new(&content).expect("grammar loads");
            let mut engine = LiveEngine::open(&content, oracle);
            let marker = offset - 8;
            engine.apply_edit(marker..marker + 1, "").expect("edit applies");
            engine.apply_edit(marker..marker, ":").expect("edit applies");
            std::hint::black_box(engine.version());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_typing_in_definition);
criterion_main!(benches);
