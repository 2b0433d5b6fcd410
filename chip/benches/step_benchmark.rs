use chip::{
    chip8::ChipSet,
    devices::{Display, Keyboard},
    resources::Rom,
};
use criterion::{criterion_group, criterion_main, Criterion};

/// Counts V0 up to 255 through a subroutine, draws the glyph of V0 and starts over.
const PROGRAM: &[u8] = &[
    0x60, 0x00, // 0x200: V0 = 0
    0x22, 0x0C, // 0x202: call 0x20C
    0x30, 0xFF, // 0x204: skip if V0 == 0xFF
    0x12, 0x02, // 0x206: jump 0x202
    0x12, 0x00, // 0x208: jump 0x200
    0x00, 0x00, // 0x20A
    0x70, 0x01, // 0x20C: V0 += 1
    0xF0, 0x29, // 0x20E: I = glyph(V0)
    0xD1, 0x15, // 0x210: draw glyph at (V1, V1)
    0x00, 0xEE, // 0x212: return
];

static BASE_ROM: once_cell::sync::Lazy<Rom> = once_cell::sync::Lazy::new(|| {
    Rom::new("COUNTER", PROGRAM).expect("The bench program has to fit into memory.")
});

/// will setup the default configured chip
fn get_default_chip() -> ChipSet<Display, Keyboard> {
    ChipSet::with_rom(&BASE_ROM, Display::new(), Keyboard::new())
}

pub fn step_bench(c: &mut Criterion) {
    let mut chip = get_default_chip();
    c.bench_function("step_bench", |b| {
        b.iter(|| {
            let _ = chip.step();
        });
    });
}

pub fn print_bench(c: &mut Criterion) {
    let chip = get_default_chip();
    c.bench_function("print_bench", |b| {
        b.iter(|| {
            let _ = format!("{}", chip);
        });
    });
}

criterion_group!(benches, step_bench, print_bench);
criterion_main!(benches);
