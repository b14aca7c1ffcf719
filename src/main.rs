use clap::Parser;
use crossfill::{
    find_fill, generate_grid_config_from_template_string, render_grid, Dictionary, FillOptions,
};
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// crossfill: fill a crossword grid from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the grid structure file, with # representing blocks, _ or . representing empty
    /// squares, and letters representing themselves
    structure: PathBuf,

    /// Path to the word list, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Don't propagate constraints after each choice during the search
    #[arg(long)]
    no_inference: bool,

    /// Print fill statistics to stderr
    #[arg(long)]
    stats: bool,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn read_file(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path)
        .map_err(|err| Error(format!("Couldn't read file '{}': {err}", path.display())))
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    let config = generate_grid_config_from_template_string(&read_file(&args.structure)?)
        .map_err(|err| Error(format!("Invalid grid: {err}")))?;

    let dictionary = Dictionary::from_word_list_string(&read_file(&args.words)?);

    let options = FillOptions {
        inference: !args.no_inference,
    };

    match find_fill(&config, &dictionary, &options) {
        Ok(result) => {
            if args.stats {
                eprintln!("{:?}", result.statistics);
            }

            let display_grid = render_grid(&config, &dictionary, &result.assignment);
            println!("{}", display_grid);

            if let Some(output) = &args.output {
                fs::write(output, display_grid + "\n").map_err(|err| {
                    Error(format!("Couldn't write file '{}': {err}", output.display()))
                })?;
            }
        }
        Err(failure) => {
            if args.stats {
                eprintln!("{:?}", failure.statistics);
            }
            println!("No solution.");
        }
    }

    Ok(())
}
