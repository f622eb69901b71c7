extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;
extern crate tasm;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs;
use std::path::Path;

use tasm::assembler;
use tasm::assembler::isa::InstructionSet;
use tasm::assembler::lexer::Token;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tPrint Tokens: {}\n\tPrint AST: {}\n\tInfile: {}",
        verbosity_filter(args.occurrences_of("verbose")),
        args.is_present("print-tokens"),
        args.is_present("print-debug"),
        args.value_of("INPUT").unwrap_or("None")
    );

    // INPUT is a required argument, clap exits before we get here without it.
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());

    let source = match fs::read_to_string(ipath) {
        Err(err) => {
            error!("fatal: unable to read input file `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(source) => source,
    };

    let isa = InstructionSet::default();
    debug!("Instruction set: {}", isa.mnemonics().collect::<Vec<_>>().join(", "));

    let tokens = match assembler::lexer::tokenize(&source, &isa) {
        Err(err) => {
            error!("fatal: {}: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(tokens) => tokens,
    };

    if args.is_present("print-tokens") {
        println!("{}", token_grid(&tokens));
    }

    let ast = match assembler::parser::parse(tokens, &isa) {
        Err(err) => {
            error!("fatal: {}: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(ast) => ast,
    };

    info!("{}: parsed {} top-level item(s).",
        ipath.display(),
        ast.children.iter().map(|section| section.children.len()).sum::<usize>()
    );

    if args.is_present("print-debug") {
        print!("{}", ast);
    }
}

/// Lays out one row per token: index, position, kind and lexeme.
fn token_grid(tokens: &[Token]) -> String {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (idx, tok) in tokens.iter().enumerate() {
        grid.add(Cell::from(format!("0x{:04X}:", idx)));
        grid.add(Cell::from(format!("{}", tok.position)));
        grid.add(Cell::from(format!("{:?}", tok.kind)));
        grid.add(Cell::from(tok.lexeme.clone()));
    }

    grid.fit_into_columns(4).to_string()
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("print-tokens")
            .short("t")
            .takes_value(false)
            .help("prints the token stream to STDOUT"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .alias("show")
            .alias("s")
            .takes_value(false)
            .help("prints the parsed syntax tree to STDOUT"))
        .get_matches()
}

fn verbosity_filter(verbosity: u64) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(verbosity_filter(verbosity))
        .chain(std::io::stdout())
        .apply().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(verbosity_filter(0), log::LevelFilter::Error);
        assert_eq!(verbosity_filter(2), log::LevelFilter::Info);
        assert_eq!(verbosity_filter(9), log::LevelFilter::Trace);
    }

    #[test]
    fn test_token_grid() {
        let isa = InstructionSet::default();
        let tokens = assembler::lexer::tokenize(".text\n_x: sub &3, $9, $10", &isa).unwrap();
        let table = token_grid(&tokens);
        assert_eq!(table.lines().count(), tokens.len());
        assert!(table.contains("_x"));
        assert!(table.contains("RegisterFileRegister"));
        assert!(table.contains("2:13"));
    }
}
