//! Several tasks redrawn as one block.
//!
//! The fastest slot sets the redraw pace; finished slots freeze with their
//! level icon until the whole group is done.

use std::time::Duration;

use tally_spin::*;

fn download(update: Update, chunks: i64, pause: u64) -> std::result::Result<(), std::io::Error> {
    update.set_total(chunks);
    for _ in 0..chunks {
        if update.is_cancelled() {
            return Ok(());
        }
        update.increment(1);
        std::thread::sleep(Duration::from_millis(pause));
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let logger = Logger::default();
    let mut group = Group::new(&logger);
    group.token().cancel_after(Duration::from_secs(20));

    let _ = group
        .add(Animation::spinner("Fetching index").elapsed("took"))
        .run(|| {
            std::thread::sleep(Duration::from_millis(1800));
            Ok::<_, std::io::Error>(())
        });
    let _ = group
        .add(Animation::bar("serde", 0).percent("pct"))
        .progress(|update| download(update, 30, 70));
    let _ = group
        .add(Animation::bar("tokio", 0).bar_style(BarStyle::block()))
        .progress(|update| download(update, 50, 60));
    let _ = group
        .add(Animation::pulse("Checking signatures"))
        .run(|| {
            std::thread::sleep(Duration::from_millis(2500));
            Err::<(), _>(std::io::Error::other("signature mismatch"))
        });

    let result = group.wait();
    result.log_each();
    result.log("Downloads finished");
}
