use clap::Parser;

use vector_vm::cli::{self, Opts};

fn main() {
    let opts = Opts::parse();
    std::process::exit(cli::main(opts));
}
