use criterion::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};
use parsitree::{
    Alignment, Alphabet, ParsimonyAlgorithm, parse_newick, parsimony_asr,
    random_binary_tree,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use std::path::PathBuf;

const TIP_COUNTS: [usize; 3] = [100, 1_000, 10_000];

fn prepare_test_data() -> Vec<(usize, String)> {
    let mut rng = StdRng::seed_from_u64(2024);
    TIP_COUNTS
        .iter()
        .filter_map(|&tips| {
            let tree = random_binary_tree(tips, &mut rng).ok()?;
            Some((tips, tree.newick()))
        })
        .collect()
}

fn bench_newick_parser(c: &mut Criterion) {
    let test_data = prepare_test_data();

    let mut group = c.benchmark_group("newick_parser");
    let _ = group.sample_size(30);

    for (tips, newick_string) in &test_data {
        let _ = group.throughput(Throughput::Bytes(newick_string.len() as u64));

        let _ = group.bench_with_input(
            BenchmarkId::new("parse_newick", tips),
            newick_string,
            |b, newick| {
                b.iter(|| {
                    let _ = black_box(parse_newick(newick));
                });
            },
        );
    }

    group.finish();
}

fn bench_parsimony(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let Ok(tree) = random_binary_tree(500, &mut rng) else {
        return;
    };
    let mut alignment = Alignment::new(Alphabet::nucleotides());
    for name in tree.tip_names() {
        let sequence: Vec<u8> =
            (0..300).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
        let _ = alignment.add_sequence(&name, sequence);
    }

    let mut group = c.benchmark_group("parsimony_asr");
    let _ = group.sample_size(20);

    for algorithm in [
        ParsimonyAlgorithm::None,
        ParsimonyAlgorithm::Downpass,
        ParsimonyAlgorithm::Deltran,
        ParsimonyAlgorithm::Acctran,
    ] {
        let _ = group.bench_with_input(
            BenchmarkId::new("algorithm", algorithm),
            &algorithm,
            |b, &algorithm| {
                b.iter(|| {
                    let mut tree = tree.clone();
                    let _ = black_box(parsimony_asr(
                        &mut tree, &alignment, algorithm, true, &mut rng,
                    ));
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    name = benches;
    config = {
        let mut criterion = Criterion::default();
        let benchmark_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("benchmark_results");
        criterion = criterion.output_directory(&benchmark_dir);
        criterion = criterion.warm_up_time(std::time::Duration::from_millis(500));
        criterion = criterion.measurement_time(std::time::Duration::from_secs(5));
        criterion
    };
    targets = bench_newick_parser, bench_parsimony
);
criterion_main!(benches);
