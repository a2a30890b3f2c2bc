use clap::Parser;
use roomcrate_cli::{display_path, init_logging, run_room, RoomArgs};

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = RoomArgs::parse();
    let output = run_room(&args)?;
    println!("✓ {}", display_path(&output));
    Ok(())
}
