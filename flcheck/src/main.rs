use std::{
    env,
    fs::File,
    io::{stderr, Read, Write},
    path::Path,
    process,
};

use flautomata::Automaton;
use flgrammar::{classify, ChomskyLevel, Grammar};
use getopts::Options;

fn usage(prog: &str, msg: &str) -> ! {
    let path = Path::new(prog);
    let leaf = match path.file_name() {
        Some(m) => m.to_str().unwrap(),
        None => "flcheck",
    };
    if !msg.is_empty() {
        writeln!(&mut stderr(), "{}", msg).ok();
    }
    writeln!(
        &mut stderr(),
        "Usage: {} [-q] [-c] [-d] <grammar file> [test string ...]",
        leaf
    )
    .ok();
    process::exit(1);
}

fn read_file(path: &str) -> String {
    let mut f = match File::open(path) {
        Ok(r) => r,
        Err(e) => {
            writeln!(&mut stderr(), "Can't open file {}: {}", path, e).ok();
            process::exit(1);
        }
    };
    let mut s = String::new();
    f.read_to_string(&mut s).unwrap();
    s
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let prog = &args[0];
    let matches = match Options::new()
        .optflag("h", "help", "")
        .optflag("q", "quiet", "Don't print the grammar or transition tables")
        .optflag("c", "cnf", "Convert the grammar to Chomsky Normal Form")
        .optflag(
            "d",
            "determinize",
            "Also determinize the automaton and print its transition table",
        )
        .parse(&args[1..])
    {
        Ok(m) => m,
        Err(f) => usage(prog, f.to_string().as_str()),
    };

    if matches.opt_present("h") {
        usage(prog, "");
    }
    if matches.free.is_empty() {
        usage(prog, "Too few arguments given.");
    }

    let quiet = matches.opt_present("q");
    let grm_path = &matches.free[0];
    let grm = match Grammar::new(&read_file(grm_path)) {
        Ok(x) => x,
        Err(e) => {
            writeln!(&mut stderr(), "{}: {}", grm_path, &e).ok();
            process::exit(1);
        }
    };

    if !quiet {
        print!("{}", grm.pp());
    }
    let level = classify(&grm);
    println!("Classification: {}", level);

    if matches.opt_present("c") {
        match grm.to_cnf() {
            Ok(conv) => {
                if conv.lost_empty_string {
                    writeln!(
                        &mut stderr(),
                        "Warning: the start symbol derives the empty string, which \
                         Chomsky Normal Form cannot express; it has been dropped."
                    )
                    .ok();
                }
                if !quiet {
                    println!("CNF:");
                    print!("{}", conv.grammar.pp());
                }
            }
            Err(e) => {
                writeln!(&mut stderr(), "{}: {}", grm_path, &e).ok();
                process::exit(1);
            }
        }
    }

    if level == ChomskyLevel::Regular {
        let nfa = match Automaton::from_right_linear(&grm) {
            Ok(x) => x,
            Err(e) => {
                writeln!(&mut stderr(), "{}: {}", grm_path, &e).ok();
                process::exit(1);
            }
        };
        if !quiet {
            println!("Transitions:");
            print!("{}", nfa.pp_transitions());
        }
        if matches.opt_present("d") {
            let dfa = nfa.determinize();
            if !quiet {
                println!("Determinized transitions:");
                print!("{}", dfa.pp_transitions());
            }
        }
        for s in &matches.free[1..] {
            let verdict = if nfa.accepts_str(s) { "accept" } else { "reject" };
            println!("{}: {}", s, verdict);
        }
    } else if matches.free.len() > 1 {
        writeln!(
            &mut stderr(),
            "Test strings can only be checked against a regular grammar."
        )
        .ok();
        process::exit(1);
    }
}
