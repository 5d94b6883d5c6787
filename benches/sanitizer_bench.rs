use criterion::{black_box, criterion_group, criterion_main, Criterion};
use linksan::{extract_urls, Sanitizer};

const TEXT: &str = "Look at https://news.example/story?utm_source=tw&utm_medium=social&id=7 \
                    and www.example.com/page?fbclid=abc or https://youtu.be/dQw4w9WgXcQ?si=x";

fn bench_process_url(c: &mut Criterion) {
    let sanitizer = Sanitizer::bundled().expect("bundled rules");
    c.bench_function("process_url", |b| {
        b.iter(|| {
            sanitizer.process_url(black_box(
                "https://www.amazon.com/dp/B0?tag=x&k=shoes&pd_rd_w=1&utm_campaign=y&psc=1",
            ))
        })
    });
}

fn bench_process_text(c: &mut Criterion) {
    let sanitizer = Sanitizer::bundled().expect("bundled rules");
    c.bench_function("process_text", |b| b.iter(|| sanitizer.process_text(black_box(TEXT))));
}

fn bench_extract_urls(c: &mut Criterion) {
    c.bench_function("extract_urls", |b| b.iter(|| extract_urls(black_box(TEXT))));
}

criterion_group!(benches, bench_process_url, bench_process_text, bench_extract_urls);
criterion_main!(benches);
