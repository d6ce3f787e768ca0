//! Color animations: pulse and every shimmer direction.

use std::time::Duration;

use tally_spin::*;

fn pause(ms: u64) -> impl FnOnce(Update) -> std::result::Result<(), std::io::Error> {
    move |_| {
        std::thread::sleep(Duration::from_millis(ms));
        Ok(())
    }
}

fn main() -> Result<()> {
    let logger = Logger::stderr(Config::default().timestamp(true));

    Animation::pulse("Warming caches").speed(0.8).run(&logger, pause(2000))?;

    let ember = [
        ColorStop::new(0.0, Color::from_hex("#5f0000").unwrap_or(Color::WHITE)),
        ColorStop::new(0.5, Color::rgb(255, 175, 0)),
        ColorStop::new(1.0, Color::from_hex("#5f0000").unwrap_or(Color::WHITE)),
    ];
    for direction in [Direction::Right, Direction::Left, Direction::MiddleIn, Direction::MiddleOut] {
        Animation::shimmer(format!("Shimmering {direction:?}"))
            .gradient(ember.to_vec())
            .direction(direction)
            .run(&logger, pause(1500))?;
    }

    logger.log(Level::Info, "Done", &[]);
    Ok(())
}
