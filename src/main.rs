// ── Safety policy ────────────────────────────────────────────────────────────
// The binary only calls the safe wrappers exported by the library.
#![deny(unsafe_code)]

//! `winprobe`: print a JSON snapshot of the state this process can observe
//! through `winlayer` (working directory, error modes, console, clipboard).

use clap::Parser;

use winlayer::report::{self, Section};

#[derive(Parser, Debug)]
#[command(
    name = "winprobe",
    version,
    about = "Print a JSON report of process, console and clipboard state"
)]
struct Args {
    /// Section to include; repeat for several.  All sections when omitted.
    #[arg(short, long = "section", value_enum)]
    sections: Vec<Section>,

    /// Emit single-line JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,
}

fn run(args: Args) -> winlayer::Result<()> {
    let sections = if args.sections.is_empty() { Section::ALL.to_vec() } else { args.sections };
    let report = report::collect(&sections);
    println!("{}", report.to_json(args.compact)?);
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::debug!("{args:?}");

    if let Err(e) = run(args) {
        eprintln!("winprobe: {e}");
        std::process::exit(1);
    }
}
