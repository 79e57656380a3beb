//! Programmatic parameter mapping: create an engine, add training pairs,
//! train by switching modes, then run inference.
//!
//! Run with: `cargo run --example simple_mapping`

use neuromap::{Iml, ImlConfig, Mode};

fn main() -> neuromap::Result<()> {
    // 2 inputs (x, y) -> 2 outputs, small network.
    let config = ImlConfig {
        hidden_layers: vec![8, 8],
        max_iterations: 3000,
        learning_rate: 1.0,
        convergence_threshold: 1e-5,
    };
    let mut iml: Iml<f32> = Iml::with_config(2, 2, config)?;
    iml.set_logger(Box::new(|msg| println!("  [neuromap] {msg}")));

    // Teach a cross-mapping:
    //   (low,  low)  -> (low,  high)
    //   (high, high) -> (high, low)
    iml.set_mode(Mode::Training);
    iml.add_example(&[0.1, 0.1], &[0.1, 0.9])?;
    iml.add_example(&[0.9, 0.9], &[0.9, 0.1])?;
    iml.add_example(&[0.5, 0.5], &[0.5, 0.5])?;
    iml.add_example(&[0.1, 0.9], &[0.3, 0.7])?;
    iml.add_example(&[0.9, 0.1], &[0.7, 0.3])?;
    println!("Added {} training examples.", iml.dataset().len());

    // Switching to inference triggers training.
    iml.set_mode(Mode::Inference);

    println!("\nResults after training:");
    let probes: [([f32; 2], &str); 4] = [
        ([0.1, 0.1], "trained"),
        ([0.9, 0.9], "trained"),
        ([0.5, 0.5], "trained"),
        ([0.3, 0.3], "interpolated"),
    ];
    for (input, kind) in probes {
        iml.set_inputs(&input);
        iml.process();
        let out = iml.get_outputs();
        println!(
            "  ({:.1}, {:.1}) -> ({:.3}, {:.3})  [{kind}]",
            input[0], input[1], out[0], out[1]
        );
    }

    Ok(())
}
