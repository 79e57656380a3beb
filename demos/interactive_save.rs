//! The two-step save protocol, as driven from a hardware controller:
//! position the input, call `save_example` to freeze inference, position the
//! desired output, call `save_example` again to commit the pair.
//!
//! Run with: `cargo run --example interactive_save`

use neuromap::{Iml, ImlConfig, Mode};

fn main() -> neuromap::Result<()> {
    let config = ImlConfig {
        hidden_layers: vec![4],
        max_iterations: 2000,
        learning_rate: 1.0,
        convergence_threshold: 1e-3,
    };
    let mut iml: Iml<f32> = Iml::with_config(1, 1, config)?;
    iml.set_logger(Box::new(|msg| println!("  [neuromap] {msg}")));

    iml.set_mode(Mode::Training);

    for (x, y) in [(0.2, 0.2), (0.5, 0.5), (0.8, 0.8)] {
        iml.set_input(0, x);
        iml.save_example(); // freeze inference
        iml.set_output(0, y); // user positions the desired output
        iml.save_example(); // commit the pair
        println!("  saved {x:.1} -> {y:.1}");
    }

    println!("\nSwitching to inference (triggers training)...");
    iml.set_mode(Mode::Inference);

    for i in 0..=4 {
        let x = i as f32 * 0.25;
        iml.set_input(0, x);
        iml.process();
        println!("  {x:.2} -> {:.3}", iml.get_outputs()[0]);
    }

    Ok(())
}
