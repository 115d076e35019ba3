use chip::{chip8::Machine, definitions::Config, timer::Worker};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A small program that keeps all the common instruction groups busy, it counts `V0` up,
/// draws the matching glyph, stores the digits and loops forever.
const LOOP_ROM: [u8; 18] = [
    0x70, 0x01, // 7001 - V0 += 1
    0xF0, 0x29, // F029 - I = glyph of V0
    0x61, 0x10, // 6110 - V1 = 0x10
    0xD1, 0x15, // D115 - draw the glyph at (V1, V1)
    0xA3, 0x00, // A300 - I = 0x300
    0xF0, 0x33, // F033 - BCD of V0
    0x81, 0x04, // 8104 - V1 += V0
    0xF1, 0x55, // F155 - store V0 and V1
    0x12, 0x00, // 1200 - jump to the start
];

/// will setup the default configured chip
fn get_default_chip() -> Machine<Worker> {
    let mut chip: Machine<Worker> = Machine::new(Config::default());
    chip.timers_mut().stop();
    chip.load_rom(&LOOP_ROM)
        .expect("The benchmark rom fits into memory.");
    chip
}

pub fn step_bench(c: &mut Criterion) {
    let mut chip = get_default_chip();
    c.bench_function("step_bench", |b| {
        b.iter(|| {
            let _ = black_box(chip.next());
        });
    });
}

pub fn print_bench(c: &mut Criterion) {
    let mut chip = get_default_chip();
    for _ in 0..LOOP_ROM.len() {
        let _ = chip.next();
    }
    c.bench_function("print_bench", |b| {
        b.iter(|| {
            let _ = format!("{}", chip);
        });
    });
}

criterion_group!(benches, step_bench, print_bench);
criterion_main!(benches);
