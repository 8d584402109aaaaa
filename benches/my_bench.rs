use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loghmm::hmm::mocks::mock_gaussian;
use loghmm::learn::BaumWelch;
use loghmm::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

fn criterion_benchmark(c: &mut Criterion) {
    let hmm = mock_gaussian();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
    let (_, oseq) = hmm.sample(1000, &mut rng);
    let seqs = hmm.sample_corpus(20, 200, &mut rng);

    c.bench_function("forward_backward t1000", |b| {
        b.iter(|| hmm.forward_backward(black_box(&oseq), Computation::BOTH))
    });
    c.bench_function("viterbi t1000", |b| b.iter(|| hmm.viterbi(black_box(&oseq))));
    c.bench_function("baum_welch iterate k20 t200", |b| {
        let bw = BaumWelch::default();
        b.iter(|| bw.iterate(&hmm, black_box(&seqs)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
