use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nepqgen_core::model::{CognitiveLevel, GenerationConfig, Question};
use nepqgen_core::rubric::Rubric;
use nepqgen_core::validator::{evaluate, RubricEvaluator};

const TYPES: [&str; 6] = ["mcq", "short", "medium", "long", "application", "case_study"];

fn make_paper(size: usize) -> Vec<Question> {
    (0..size)
        .map(|i| {
            let kind = TYPES[i % TYPES.len()];
            let level = CognitiveLevel::ALL[i % CognitiveLevel::ALL.len()];
            let text = if i % 3 == 0 {
                format!("Analyze the practical scenario in case {i} and justify your approach.")
            } else {
                format!("Explain concept number {i}.")
            };
            Question::new(text, kind)
                .with_marks(1 + (i % 10) as u32)
                .with_level(level)
                .with_topic(format!("Unit {}", i % 5))
        })
        .collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let config = GenerationConfig::default();

    for size in [10, 100, 1000] {
        let paper = make_paper(size);
        group.bench_function(format!("nep_2020_{size}"), |b| {
            b.iter(|| evaluate(black_box(&paper), black_box(&config)))
        });
    }

    let mut strict = Rubric::nep_2020();
    strict.competency.real_world_keywords.extend(
        ["industry", "field", "everyday", "community"]
            .iter()
            .map(|s| s.to_string()),
    );
    let evaluator = RubricEvaluator::new(strict);
    let paper = make_paper(100);
    group.bench_function("extended_keywords_100", |b| {
        b.iter(|| evaluator.evaluate(black_box(&paper), black_box(&config)))
    });

    let empty: Vec<Question> = Vec::new();
    group.bench_function("empty", |b| {
        b.iter(|| evaluate(black_box(&empty), black_box(&config)))
    });

    group.finish();
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
