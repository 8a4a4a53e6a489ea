use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use il2p_core::fec::{correct_block, BlockCodec, CodecBank};

fn codeword(bank: &CodecBank, data_len: usize, nroots: usize) -> Vec<u8> {
    let codec = bank.get(nroots).unwrap();
    let mut block: Vec<u8> = (0..data_len).map(|i| (i * 31) as u8).collect();
    block.resize(data_len + nroots, 0);
    let (data, parity) = block.split_at_mut(data_len);
    codec.encode(data, parity);
    block
}

fn bench_rs_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("fec_rs_encode");
    let bank = CodecBank::new();
    for (data_len, nroots) in [(13usize, 2usize), (247, 9), (239, 16)] {
        let codec = bank.get(nroots).unwrap();
        let data = vec![0x5Au8; data_len];
        let mut parity = vec![0u8; nroots];
        group.throughput(Throughput::Bytes(data_len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(nroots), &data, |b, data| {
            b.iter(|| codec.encode(black_box(data), &mut parity))
        });
    }
    group.finish();
}

fn bench_rs_correct(c: &mut Criterion) {
    let mut group = c.benchmark_group("fec_rs_correct");
    let bank = CodecBank::new();
    for (data_len, nroots) in [(13usize, 2usize), (247, 8), (239, 16)] {
        let codec = bank.get(nroots).unwrap();
        let clean = codeword(&bank, data_len, nroots);
        let mut damaged = clean.clone();
        for i in 0..nroots / 2 {
            damaged[i * 11] ^= 0xA5;
        }

        group.throughput(Throughput::Bytes(clean.len() as u64));
        for (name, input) in [("clean", &clean), ("max_errors", &damaged)] {
            group.bench_with_input(BenchmarkId::new(name, nroots), input, |b, input| {
                b.iter_batched(
                    || input.clone(),
                    |mut block| correct_block(codec, &mut block).unwrap(),
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_rs_encode, bench_rs_correct);
criterion_main!(benches);
