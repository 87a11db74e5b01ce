//! Drives a `CompressorProcessor` the way a host would: configure, start
//! playback, push parameter changes from another thread, process buffers,
//! and save/restore state.

use dyncomp::prelude::*;
use dyncomp::{
    update_channel, CompressorConfig, CompressorParams, CompressorProcessor,
    Effect, ParamId, ParameterSnapshot, ParameterUpdate,
};
use std::sync::Arc;

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZE: usize = 512;

fn sine_block(amplitude: f64, start: usize) -> Vec<f64> {
    (start..start + BLOCK_SIZE)
        .map(|i| amplitude * (i as f64 * 0.05).sin())
        .collect()
}

fn run(comp: &mut CompressorProcessor, amplitude: f64, blocks: usize) -> Vec<f64> {
    let mut output = Vec::with_capacity(blocks * BLOCK_SIZE);

    for b in 0..blocks {
        let mut left = sine_block(amplitude, b * BLOCK_SIZE);
        let mut right = left.clone();
        comp.process_buffer(
            &mut [left.as_mut_slice(), right.as_mut_slice()],
            BLOCK_SIZE,
        );
        assert_eq!(left, right);
        output.extend(left);
    }

    output
}

#[test]
fn pushed_changes_reach_the_audio_thread() {
    let params = CompressorParams::shared();
    let (tx, rx) = update_channel();
    let mut comp =
        CompressorProcessor::new(CompressorConfig::default(), Arc::clone(&params))
            .with_update_receiver(rx);

    comp.configure(SAMPLE_RATE).unwrap();
    comp.set_playing(true);

    // defaults are transparent
    let dry = run(&mut comp, 0.9, 4);
    let expected: Vec<f64> = (0..4).flat_map(|b| sine_block(0.9, b * BLOCK_SIZE)).collect();
    assert_eq!(dry, expected);

    std::thread::spawn(move || {
        tx.send(ParameterUpdate::Threshold(-20.0)).unwrap();
        tx.send(ParameterUpdate::Ratio(10.0)).unwrap();
        tx.send(ParameterUpdate::Attack(1.0)).unwrap();
        tx.send(ParameterUpdate::Release(50.0)).unwrap();
    })
    .join()
    .unwrap();

    let wet = run(&mut comp, 0.9, 40);
    let settled_peak = wet[wet.len() - BLOCK_SIZE..]
        .iter()
        .fold(0.0f64, |m, x| m.max(x.abs()));

    assert!(settled_peak < 0.9 * db_to_level(-6.0));
    assert!(comp.gain_reduction_db(0) < -6.0);
    assert_eq!(params.get(ParamId::Ratio), 10.0);
}

#[test]
fn restored_state_reproduces_output() {
    let snapshot = ParameterSnapshot {
        threshold_db: -18.0,
        ratio: 6.0,
        attack_ms: 3.0,
        release_ms: 80.0,
    };
    let original = Arc::new(CompressorParams::from_snapshot(snapshot));
    let json = original.to_json();
    let bytes = original.to_bytes();

    let from_json = CompressorParams::shared();
    from_json.load_json(&json);
    let from_bytes = CompressorParams::shared();
    from_bytes.load_bytes(&bytes);

    let mut outputs = Vec::new();
    for params in [original, from_json, from_bytes] {
        let mut comp = CompressorProcessor::new(CompressorConfig::default(), params);
        comp.configure(SAMPLE_RATE).unwrap();
        outputs.push(run(&mut comp, 1.0, 8));
    }

    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0], outputs[2]);
}

#[test]
fn corrupt_state_falls_back_to_defaults() {
    let params = CompressorParams::shared();
    params.set(ParamId::Threshold, -24.0);

    params.load_bytes(&[1, 2, 3]);
    assert_eq!(params.snapshot(), ParameterSnapshot::default());

    params.set(ParamId::Threshold, -24.0);
    params.load_json("<PARAMETERS/>");
    assert_eq!(params.snapshot(), ParameterSnapshot::default());
}

#[test]
fn stopping_playback_clears_gain_reduction() {
    let params = Arc::new(CompressorParams::from_snapshot(ParameterSnapshot {
        threshold_db: -12.0,
        ratio: 4.0,
        attack_ms: 0.0,
        release_ms: 500.0,
    }));
    let mut comp = CompressorProcessor::new(CompressorConfig::default(), params);
    comp.configure(SAMPLE_RATE).unwrap();
    comp.set_playing(true);

    run(&mut comp, 1.0, 2);
    assert!(comp.gain_reduction_db(0) < -1.0);

    comp.set_playing(false);
    comp.set_playing(true);

    let mut fresh = comp.clone();
    fresh.reset();
    assert_eq!(run(&mut comp, 0.5, 2), run(&mut fresh, 0.5, 2));
    assert_eq!(comp.tail_length_secs(), 0.0);
}
