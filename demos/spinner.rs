//! One task, one animated line.
//!
//! A spinner with a live elapsed field, then a bar fed through the
//! [`Update`] handle. Each outcome is logged as a static line afterwards.

use std::time::Duration;

use tally_spin::*;

fn main() -> Result<()> {
    let logger = Logger::default();

    let bytes = Animation::spinner("Resolving dependencies")
        .field("registry", "crates.io")
        .elapsed("took")
        .delay(Duration::from_millis(150))
        .run(&logger, |update| {
            for step in ["index", "lockfile", "features"] {
                update.set_fields([("registry", "crates.io"), ("step", step)]);
                std::thread::sleep(Duration::from_millis(600));
            }
            Ok::<_, std::io::Error>(48_213)
        })?;
    logger.log(Level::Info, "Resolved", &[Field::new("bytes", bytes)]);

    let files = 40;
    Animation::bar("Unpacking", files)
        .bar_style(BarStyle::smooth().percent(PercentDisplay::Before))
        .percent("pct")
        .run(&logger, move |update| {
            for n in 0..files {
                update.set_message(format!("Unpacking file {}", n + 1));
                update.increment(1);
                std::thread::sleep(Duration::from_millis(60));
            }
            Ok::<_, std::io::Error>(())
        })?;
    logger.log(Level::Info, "Unpacked", &[Field::new("files", files)]);

    let token = CancelToken::new();
    token.cancel_after(Duration::from_secs(2));
    let outcome = Animation::spinner("Waiting for lock")
        .spinner_style(Spinner::circle())
        .level(Level::Warn)
        .cancel_on(&token)
        .run(&logger, |update| {
            while !update.is_cancelled() {
                std::thread::sleep(Duration::from_millis(20));
            }
            Ok::<_, std::io::Error>(())
        });
    if let Err(err) = outcome {
        logger.log(Level::Warn, "Gave up", &[Field::new("reason", err)]);
    }
    Ok(())
}
