use std::io;
use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;
use offset_log::Config;
use offset_log::Wal;

#[derive(Clone, Debug, PartialEq, Eq, clap::Parser)]
#[clap(about = "dump a WAL log/index file pair", author)]
pub struct Args {
    /// Path of the log file.
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Path of the index file; defaults to `<PATH>.lix`.
    #[arg(long, value_name = "INDEX")]
    index: Option<PathBuf>,
}

fn main() -> Result<(), io::Error> {
    let args = Args::parse();

    let config = Config {
        path: args.path.to_string_lossy().to_string(),
        index_path: args.index.map(|p| p.to_string_lossy().to_string()),
        writable: Some(false),
    };

    let wal = Wal::open(config)?;
    println!("{}", wal.name());
    wal.dump().write(stdout())?;

    Ok(())
}
