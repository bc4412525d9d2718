use astc_block_decode::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::*;
use rand_pcg::*;

fn benchmark_fp<const W: usize, const H: usize>(c: &mut Criterion) {
    let mut rng = Pcg64::seed_from_u64(42);
    let footprint = Footprint::new(W as u32, H as u32).unwrap();

    const INPUT_SET_SIZE: usize = 10000;

    // Random blocks that decode without error.
    let mut inputs = vec![];
    while inputs.len() < INPUT_SET_SIZE {
        let block = rng.sample(distributions::Standard);
        if try_decode_block(&block, footprint, |_, _, _| ()).is_ok() {
            inputs.push(block);
        }
    }

    c.bench_function(&format!("astc {}x{}", W, H), |b| {
        b.iter(|| {
            let mut sink = [[[0; 4]; H]; W];
            let block = inputs[rng.sample(distributions::Uniform::new(0, INPUT_SET_SIZE))];
            astc_decode_block(&black_box(block), footprint, |x, y, v| {
                sink[x as usize][y as usize] = v
            });
            sink
        })
    });

    c.bench_function(&format!("astc {}x{} packed", W, H), |b| {
        b.iter(|| {
            let block = inputs[rng.sample(distributions::Uniform::new(0, INPUT_SET_SIZE))];
            decode_block(&black_box(block), footprint)
        })
    });
}

fn benchmark_image(c: &mut Criterion) {
    let mut rng = Pcg64::seed_from_u64(7);
    let (width, height) = (256, 256);
    let footprint = AstcFormat::Astc8x8.footprint();
    let data: Vec<u8> = (0..compressed_size(width, height, footprint))
        .map(|_| rng.gen())
        .collect();
    let mut output = vec![0; (width * height * 4) as usize];

    c.bench_function("astc image 256x256 8x8", |b| {
        b.iter(|| {
            decode_image_into(black_box(&data), width, height, footprint, &mut output).unwrap();
        })
    });
}

fn benchmark(c: &mut Criterion) {
    benchmark_fp::<4, 4>(c);
    benchmark_fp::<10, 5>(c);
    benchmark_fp::<12, 12>(c);
    benchmark_image(c);
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
