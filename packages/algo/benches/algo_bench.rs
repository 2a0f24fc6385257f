//! Benchmark suite for conjugar-algo
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use conjugar_algo::conjugation::lexicon;
use conjugar_algo::{check_answer, Conjugator, Difficulty, ExerciseGenerator, Strictness, Tense};

fn bench_conjugate_lexicon(c: &mut Criterion) {
    let conjugator = Conjugator::new();
    c.bench_function("Conjugator::all_conjugations (lexicon x tenses)", |b| {
        b.iter(|| {
            for entry in lexicon::entries() {
                for tense in Tense::ALL {
                    black_box(conjugator.all_conjugations(black_box(entry.infinitive), tense));
                }
            }
        })
    });
}

fn bench_generate_exercise(c: &mut Criterion) {
    let mut generator = ExerciseGenerator::with_seed(42);
    c.bench_function("ExerciseGenerator::generate_exercise", |b| {
        b.iter(|| generator.generate_exercise(None, None, None, Difficulty::Advanced))
    });
}

fn bench_check_answer(c: &mut Criterion) {
    c.bench_function("check_answer lenient", |b| {
        b.iter(|| check_answer(black_box("estuvimoss"), black_box("estuvimos"), Strictness::Lenient))
    });
}

criterion_group!(
    benches,
    bench_conjugate_lexicon,
    bench_generate_exercise,
    bench_check_answer
);
criterion_main!(benches);
