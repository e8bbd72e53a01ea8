// Pulse reader simulation on the host

use rc_reader_core::test_utils::PulseBench;
use rc_reader_core::*;

const FRAME_MICROS: u32 = 20_000;

fn main() {
    println!("🧪 RC Reader Host Simulation v{}", VERSION);

    let bench: PulseBench = PulseBench::new(u32::MAX - 30_000);
    let config = ChannelConfig::new()
        .with_timeout(100)
        .with_valid_range(900, 2100, true);

    let pins = [RcPin::D53, RcPin::D15, RcPin::A8];
    let mut channels = pins.map(|pin| bench.attach(pin, config));
    println!(
        "🔌 {} channels attached ({} slots)",
        bench.readers().registry().len(),
        bench.readers().registry().capacity()
    );

    // Sweep, a glitch on channel 1 in frame 3, then silence
    for frame in 0..6u32 {
        let mut widths = [1_000 + frame * 150, 1_500, 2_000 - frame * 150];
        if frame == 3 {
            widths[1] = 120;
        }
        for (pin, width) in pins.iter().zip(widths) {
            bench.pulse(*pin, width);
        }
        bench.advance_micros(FRAME_MICROS - widths.iter().sum::<u32>());
        report(frame, &mut channels);
    }

    bench.advance_millis(250);
    println!("📴 Receiver off");
    report(6, &mut channels);

    println!("✅ Simulation finished, counter now at {}", bench.now());
}

fn report<C: MicrosClock, const N: usize>(frame: u32, channels: &mut [RcReader<'_, C, N>]) {
    print!("  frame {frame}:");
    for channel in channels.iter_mut() {
        match channel.read() {
            Ok(micros) => print!("  {micros:>5} us"),
            Err(err) => print!("  {:>5} ({:?})", channel.micros(), err),
        }
    }
    println!();
}
