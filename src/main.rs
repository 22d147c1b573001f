// src/main.rs
//
// Offline sanity run: pushes a test tone through the pitch shifter and
// prints output levels.

use phasorshift::{AudioBuffer, HarmonyPreset, PitchShifter, create_bridge};

fn main() {
    let sample_rate = 48_000.0;
    let block_frames = 256;
    let channels = 2;
    let seconds = 2.0;
    let tone_hz = 440.0;

    // --------------------------------
    // Engine
    // --------------------------------

    let (control, mut engine) = create_bridge(PitchShifter::new(channels));
    if let Err(e) = engine.prepare(sample_rate, block_frames) {
        eprintln!("prepare failed: {}", e);
        return;
    }

    control.apply_preset(HarmonyPreset::MajorThird);
    control.set_window_size_ms(50.0);

    println!(
        "Rendering {:.1}s of {} Hz through \"{}\" ({} Hz, block {})",
        seconds,
        tone_hz,
        HarmonyPreset::MajorThird,
        sample_rate,
        block_frames
    );

    // --------------------------------
    // Render
    // --------------------------------

    let total_blocks = (seconds * sample_rate) as usize / block_frames;
    let report_every = (0.25 * sample_rate) as usize / block_frames;
    let mut block = vec![0.0_f32; channels * block_frames];
    let mut frame = 0usize;
    let mut sum_sq = 0.0_f64;
    let mut peak = 0.0_f32;

    for index in 0..total_blocks {
        for ch in 0..channels {
            for i in 0..block_frames {
                let t = (frame + i) as f64 / sample_rate;
                block[ch * block_frames + i] =
                    (0.5 * (2.0 * std::f64::consts::PI * tone_hz * t).sin()) as f32;
            }
        }
        frame += block_frames;

        engine.process_block(&mut AudioBuffer::new(&mut block, channels));

        sum_sq += block.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>();
        peak = peak.max(control.readback().output_peak);

        if (index + 1) % report_every == 0 {
            let rms = (sum_sq / (report_every * block_frames * channels) as f64).sqrt();
            println!(
                "{:>6.2}s  rms {:.4}  peak {:.4}",
                frame as f64 / sample_rate,
                rms,
                peak
            );
            sum_sq = 0.0;
            peak = 0.0;
        }
    }

    println!(
        "Done: {} frames processed",
        control.readback().sample_position
    );
}
