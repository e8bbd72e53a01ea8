//! Property tests for counter wraparound and registry compaction

use proptest::prelude::*;
use rc_reader_core::test_utils::PulseBench;
use rc_reader_core::*;

proptest! {
    #[test]
    fn prop_pulse_width_exact_anywhere_on_counter(start in any::<u32>(), width in 1u32..=60_000) {
        let bench: PulseBench = PulseBench::new(start);
        let mut reader = bench.attach(RcPin::A9, ChannelConfig::default());

        bench.pulse(RcPin::A9, width);
        prop_assert_eq!(reader.read(), Ok(width));
    }

    #[test]
    fn prop_elapsed_inverts_wrapping_add(earlier in any::<u32>(), delta in any::<u32>()) {
        prop_assert_eq!(elapsed_micros(earlier.wrapping_add(delta), earlier), delta);
    }

    #[test]
    fn prop_removal_order_keeps_survivors_measuring(
        order in Just((0..MAX_CHANNELS).collect::<Vec<_>>()).prop_shuffle(),
        removed in 0..MAX_CHANNELS,
    ) {
        let bench: PulseBench = PulseBench::new(0);
        let mut readers: Vec<_> = RcPin::ALL[..MAX_CHANNELS]
            .iter()
            .map(|&pin| (pin, Some(bench.attach(pin, ChannelConfig::default()))))
            .collect();
        prop_assert!(bench.readers().registry().is_full());

        for &index in &order[..removed] {
            drop(readers[index].1.take());
        }

        let registry = bench.readers().registry();
        prop_assert_eq!(registry.len(), MAX_CHANNELS - removed);
        for index in registry.len()..MAX_CHANNELS {
            prop_assert_eq!(registry.record(index), None);
        }

        let survivors = readers
            .iter_mut()
            .filter_map(|(pin, reader)| reader.as_mut().map(|reader| (*pin, reader)));
        for (offset, (pin, reader)) in survivors.enumerate() {
            let width = 1_000 + offset as u32 * 10;
            bench.pulse(pin, width);
            prop_assert_eq!(reader.read(), Ok(width));
        }
    }
}
